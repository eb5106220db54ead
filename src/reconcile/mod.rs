//! Route reconciliation.
//!
//! # Data Flow
//! ```text
//! provider snapshot + manual routes
//!     → RouteSet (fallback appended, kept last)
//!     → ConfigGateway::replace_routes
//! lifecycle events
//!     → Engine::apply
//!     → ConfigGateway::replace_routes (full set, once per event)
//! ```

pub mod engine;
pub mod error;
pub mod route_set;

pub use engine::{Applied, Engine, EngineOptions};
pub use error::{EngineError, EngineResult};
pub use route_set::RouteSet;
