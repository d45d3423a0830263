//! Error types for the workload subscription.

use crate::workload::ErrorResponse;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubscriptionError {
    /// A command was issued while the subscription was not established.
    #[error("Not connected to the workload driver")]
    NotConnected,

    /// The subscription task has stopped, or dropped the command on disconnect.
    #[error("Subscription closed before a reply arrived")]
    Closed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The driver answered with an error response.
    #[error("Request rejected: {0}")]
    Rejected(ErrorResponse),

    #[error("WebSocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}
