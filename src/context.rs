//! Shared application context built once at startup.

use crate::api::{ClientError, ClusterClient};
use crate::config::ClusterviewConfig;
use crate::subscription::{SubscriptionHandle, WorkloadSubscriber};
use crate::workload::WorkloadStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Configuration, gateway client, workload cache and shutdown token.
///
/// Constructed in `main` and handed to command handlers; nothing here is
/// global.
pub struct AppContext {
    pub config: Arc<ClusterviewConfig>,
    pub client: ClusterClient,
    pub store: Arc<WorkloadStore>,
    pub cancel: CancellationToken,
}

impl AppContext {
    pub fn new(config: ClusterviewConfig) -> Result<Self, ClientError> {
        let client = ClusterClient::new(&config.gateway)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            store: Arc::new(WorkloadStore::new()),
            cancel: CancellationToken::new(),
        })
    }

    /// Start the workload subscription bound to this context's store and token.
    pub fn start_subscription(
        &self,
    ) -> Result<(SubscriptionHandle, JoinHandle<()>), Box<dyn std::error::Error>> {
        let url = self.config.gateway.websocket_url()?;
        let subscriber = WorkloadSubscriber::new(
            url,
            self.config.subscription.reconnect_delay(),
            Arc::clone(&self.store),
        );
        Ok(subscriber.start(self.cancel.child_token()))
    }

    /// Cancel background work and wait for the given tasks to finish.
    pub async fn shutdown(&self, tasks: Vec<JoinHandle<()>>) {
        self.cancel.cancel();
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
    }
}
