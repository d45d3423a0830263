//! HTTP client for the cluster gateway.
//!
//! Currently covers the kernel ping flow: the gateway forwards a ping to
//! every replica of a kernel and answers with one [`RequestTrace`] per
//! replica, which [`PingOutcome::breakdowns`] turns into latency tables.

mod error;

pub use error::ClientError;

use crate::config::GatewayConfig;
use crate::trace::{self, PongResponse, RequestTrace, Timestamp, TraceBreakdown};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kernel socket a ping travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    #[default]
    Control,
    Shell,
}

impl std::fmt::Display for SocketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocketType::Control => f.write_str("control"),
            SocketType::Shell => f.write_str("shell"),
        }
    }
}

impl std::str::FromStr for SocketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "control" => Ok(SocketType::Control),
            "shell" => Ok(SocketType::Shell),
            _ => Err(format!("Invalid socket type: {}", s)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PingKernelRequest<'a> {
    socket_type: SocketType,
    kernel_id: &'a str,
}

/// Result of a kernel ping, with client-side timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct PingOutcome {
    pub kernel_id: String,
    pub socket_type: SocketType,
    /// Client clock (unix ms) just before the request was sent.
    pub initial_request_sent_at: Timestamp,
    /// Client clock (unix ms) when the response arrived.
    pub reply_received_at: Timestamp,
    pub response: PongResponse,
}

impl PingOutcome {
    pub fn traces(&self) -> &[RequestTrace] {
        &self.response.request_traces
    }

    /// Round trip as measured by the client.
    pub fn round_trip_ms(&self) -> f64 {
        self.reply_received_at - self.initial_request_sent_at
    }

    /// Per-replica breakdowns, plus an averaged one for multiple replicas.
    pub fn breakdowns(&self) -> Vec<TraceBreakdown> {
        trace::breakdowns(
            self.traces(),
            self.reply_received_at,
            Some(self.initial_request_sent_at),
        )
    }
}

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis() as Timestamp
}

/// Gateway HTTP client.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout_ms: u64,
}

impl ClusterClient {
    /// Create a client from gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self::with_client(config, client))
    }

    /// Create a client with a custom HTTP client (for testing).
    pub fn with_client(config: &GatewayConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token(),
            timeout_ms: config.request_timeout_seconds * 1000,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ping every replica of a kernel and collect their request traces.
    pub async fn ping_kernel(
        &self,
        kernel_id: &str,
        socket_type: SocketType,
    ) -> Result<PingOutcome, ClientError> {
        let url = format!("{}/api/ping-kernel", self.base_url);
        let body = PingKernelRequest {
            socket_type,
            kernel_id,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(kernel_id, socket_type = %socket_type, "Pinging kernel");

        let initial_request_sent_at = now_millis();
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_ms)
            } else {
                ClientError::Network(e.to_string())
            }
        })?;
        let reply_received_at = now_millis();

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(kernel_id, status = status.as_u16(), "Kernel ping failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Decode(format!("Failed to read response body: {}", e)))?;
        let pong: PongResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::Decode(format!("Failed to parse ping response: {}", e)))?;

        tracing::info!(
            kernel_id,
            replicas = pong.request_traces.len(),
            round_trip_ms = reply_received_at - initial_request_sent_at,
            "Kernel ping answered"
        );

        Ok(PingOutcome {
            kernel_id: kernel_id.to_string(),
            socket_type,
            initial_request_sent_at,
            reply_received_at,
            response: pong,
        })
    }
}
