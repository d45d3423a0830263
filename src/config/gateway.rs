//! Cluster gateway connection settings

use serde::{Deserialize, Serialize};

/// Where the cluster gateway lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway's HTTP API, e.g. `http://localhost:8000`.
    pub url: String,
    /// Path of the workload WebSocket, relative to `url`.
    pub websocket_path: String,
    pub request_timeout_seconds: u64,
    /// Name of the environment variable holding a bearer token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            websocket_path: "websocket/workload".to_string(),
            request_timeout_seconds: 10,
            token_env: None,
        }
    }
}

impl GatewayConfig {
    /// WebSocket URL of the workload subscription endpoint.
    ///
    /// `http` becomes `ws` and `https` becomes `wss`.
    pub fn websocket_url(&self) -> Result<url::Url, url::ParseError> {
        let mut base = url::Url::parse(&self.url)?;
        let scheme = match base.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        // Only fails for cannot-be-a-base URLs, which join rejects below anyway
        let _ = base.set_scheme(scheme);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(self.websocket_path.trim_start_matches('/'))
    }

    /// Bearer token read from `token_env`, if configured and set.
    pub fn token(&self) -> Option<String> {
        let name = self.token_env.as_deref()?;
        std::env::var(name).ok().filter(|t| !t.is_empty())
    }
}
