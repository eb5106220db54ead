//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts and intervals > 0, ports present)
//! - Detect duplicate manual routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DiscoveryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::DiscoveryConfig;
use crate::discovery::{check_domain, check_upstream};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a config, collecting every problem found.
pub fn validate_config(config: &DiscoveryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.caddy.admin_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "caddy.admin_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "caddy.admin_url",
            format!("invalid url '{}': {}", config.caddy.admin_url, e),
        )),
    }
    if config.caddy.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "caddy.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.tls.manual {
        if config.tls.cert_file_path.trim().is_empty() {
            errors.push(ValidationError::new("tls.cert_file_path", "must not be empty"));
        }
        if config.tls.key_file_path.trim().is_empty() {
            errors.push(ValidationError::new("tls.key_file_path", "must not be empty"));
        }
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{}]", i);
        if check_domain(&route.domain).is_err() {
            errors.push(ValidationError::new(
                format!("{}.domain", field),
                "must not be empty",
            ));
        }
        if let Err(message) = check_upstream(&route.upstream) {
            errors.push(ValidationError::new(format!("{}.upstream", field), message));
        }
        if !seen.insert((route.domain.as_str(), route.upstream.as_str())) {
            errors.push(ValidationError::new(
                field,
                format!("duplicate route {} -> {}", route.domain, route.upstream),
            ));
        }
    }

    if config.provider.poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "provider.poll_interval_secs",
            "must be greater than 0",
        ));
    }
    if config.provider.endpoints_file.trim().is_empty() {
        errors.push(ValidationError::new("provider.endpoints_file", "must not be empty"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
