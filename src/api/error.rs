//! Error types for gateway HTTP calls.

use thiserror::Error;

/// Errors that can occur when talking to the cluster gateway.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Gateway returned an error response (4xx, 5xx).
    #[error("Gateway error {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body doesn't match the expected format.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Client could not be built from configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
