//! Service-discovery bridge for the Caddy reverse proxy.
//!
//! Watches a discovery provider for endpoints appearing and disappearing and
//! keeps the routes of one Caddy server in step through its admin API.

pub mod caddy;
pub mod config;
pub mod discovery;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;

pub use caddy::{AdminClient, ConfigGateway};
pub use config::schema::DiscoveryConfig;
pub use discovery::{DiscoveryProvider, Endpoint, LifecycleEvent};
pub use lifecycle::Shutdown;
pub use reconcile::{Engine, EngineOptions};
