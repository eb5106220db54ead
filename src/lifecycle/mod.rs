//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Provider + client → Engine
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Provider watcher stops → event stream ends → engine returns Ok
//! ```
//!
//! # Design Decisions
//! - Shutdown flows through the event stream, so the engine never
//!   observes a half-applied event
//! - No forced deadline: the engine finishes its current push first

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
