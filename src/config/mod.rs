//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! configuration.toml (optional)
//!     → loader.rs (read & deserialize, defaults when absent)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → DiscoveryConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no hot reload
//! - All fields have defaults to allow an empty or missing file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::DiscoveryConfig;
pub use schema::ManualRoute;
pub use schema::UnknownStopPolicy;
