//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (event counters, push outcomes, route gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (domain, upstream, kind)
//! - `RUST_LOG` wins over the configured level when set
//! - Metrics are no-ops unless the exporter is enabled

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
