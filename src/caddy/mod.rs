//! Caddy integration subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint
//!     → routes.rs (translate to Caddy route JSON)
//!     → reconcile engine (RouteSet)
//!     → client.rs (admin API: read / load / patch routes)
//!     → running Caddy instance
//! ```
//!
//! # Design Decisions
//! - The engine only sees the `ConfigGateway` trait; `AdminClient` is the
//!   production implementation
//! - The JSON model is partial: unknown fields are ignored on read

pub mod client;
pub mod error;
pub mod routes;
pub mod types;

use std::future::Future;

pub use client::AdminClient;
pub use error::{GatewayError, GatewayResult};
pub use routes::{fallback_route, to_route};
pub use types::{Config, LoadFile, Route};

/// Operations the reconcile engine needs from the downstream proxy.
pub trait ConfigGateway {
    /// Read the running config. `GatewayError::NotFound` when none is loaded.
    fn read_config(&self) -> impl Future<Output = GatewayResult<Config>> + Send;

    /// Install the minimal config, optionally loading a certificate pair.
    fn bootstrap_config(
        &self,
        tls: Option<&LoadFile>,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Replace the managed server's route list with `routes`.
    fn replace_routes(&self, routes: &[Route]) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Diagnostic dump of the running config. Never fails.
    fn log_current_config(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}
