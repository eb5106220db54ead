//! Reconcile engine error definitions.

use thiserror::Error;

use crate::caddy::GatewayError;
use crate::discovery::{LifecycleEvent, ProviderError};

/// Errors that end reconciliation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Talking to the proxy failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The discovery provider failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A stop event named an endpoint with no route.
    #[error("route not found for event {0}")]
    RouteNotFound(LifecycleEvent),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
