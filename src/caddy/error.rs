//! Admin API error definitions.

use thiserror::Error;

/// Errors returned by a proxy config gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The proxy has no config loaded yet.
    #[error("no caddy config found")]
    NotFound,

    /// The admin API could not be reached.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The admin API answered with a document that could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The admin API answered with a non-2xx status.
    #[error("request to {url} failed with status code {status}")]
    Rejected { url: String, status: u16 },

    /// The configured admin URL is unusable.
    #[error("Invalid admin URL: {0}")]
    InvalidUrl(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
