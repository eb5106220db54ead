//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::caddy::LoadFile;
use crate::discovery::Endpoint;

/// Root configuration for the discovery daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Caddy admin API settings.
    pub caddy: CaddyConfig,

    /// Operator-supplied certificate for the listener.
    pub tls: TlsConfig,

    /// Static routes merged once during initial sync.
    pub routes: Vec<ManualRoute>,

    /// Endpoint provider settings.
    pub provider: ProviderConfig,

    /// Event loop policies.
    pub reconcile: ReconcileConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Caddy admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaddyConfig {
    /// Admin endpoint (e.g., "http://localhost:2019").
    pub admin_url: String,

    /// Timeout for each admin API request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CaddyConfig {
    fn default() -> Self {
        Self {
            admin_url: "http://localhost:2019".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Manual TLS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Load the certificate pair below instead of relying on automatic HTTPS.
    pub manual: bool,

    /// Path to certificate file (PEM), as seen by Caddy.
    pub cert_file_path: String,

    /// Path to private key file (PEM), as seen by Caddy.
    pub key_file_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            manual: false,
            cert_file_path: "/etc/certs/tls.crt".to_string(),
            key_file_path: "/etc/certs/tls.key".to_string(),
        }
    }
}

impl TlsConfig {
    /// The certificate pair to load, when manual TLS is on.
    pub fn load_file(&self) -> Option<LoadFile> {
        self.manual.then(|| LoadFile {
            certificate: self.cert_file_path.clone(),
            key: self.key_file_path.clone(),
        })
    }
}

/// Operator-declared static route.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ManualRoute {
    /// Host to match.
    pub domain: String,

    /// Upstream dial address ("host:port").
    #[serde(alias = "upstream_url")]
    pub upstream: String,

    /// Talk TLS to the upstream.
    #[serde(default)]
    pub tls: bool,
}

impl From<&ManualRoute> for Endpoint {
    fn from(route: &ManualRoute) -> Self {
        Endpoint::new(route.domain.clone(), route.upstream.clone()).with_tls(route.tls)
    }
}

/// Endpoint provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// TOML file listing `[[endpoints]]`.
    pub endpoints_file: String,

    /// Poll interval for watcher backends that poll, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoints_file: "endpoints.toml".to_string(),
            poll_interval_secs: 2,
        }
    }
}

/// What to do with a stop event that matches no route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStopPolicy {
    /// Terminate the event loop with an error.
    #[default]
    Fail,
    /// Log and keep processing.
    Ignore,
}

/// Event loop configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub unknown_stop: UnknownStopPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.caddy.admin_url, "http://localhost:2019");
        assert!(!config.tls.manual);
        assert!(config.tls.load_file().is_none());
        assert!(config.routes.is_empty());
        assert_eq!(config.reconcile.unknown_stop, UnknownStopPolicy::Fail);
    }

    #[test]
    fn test_parse_full_document() {
        let raw = r#"
[caddy]
admin_url = "http://caddy:2019"

[tls]
manual = true
cert_file_path = "/certs/site.crt"
key_file_path = "/certs/site.key"

[[routes]]
domain = "a.example"
upstream = "10.0.0.1:9000"

[[routes]]
domain = "legacy.example"
upstream_url = "legacy.internal:443"
tls = true

[reconcile]
unknown_stop = "ignore"

[observability]
log_format = "json"
"#;
        let config: DiscoveryConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.caddy.admin_url, "http://caddy:2019");
        assert_eq!(config.caddy.request_timeout_secs, 10);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].upstream, "legacy.internal:443");
        assert!(config.routes[1].tls);
        assert_eq!(config.reconcile.unknown_stop, UnknownStopPolicy::Ignore);
        assert_eq!(config.observability.log_format, LogFormat::Json);

        let files = config.tls.load_file().unwrap();
        assert_eq!(files.certificate, "/certs/site.crt");
        assert_eq!(files.key, "/certs/site.key");
    }

    #[test]
    fn test_manual_route_to_endpoint() {
        let route = ManualRoute {
            domain: "a.example".to_string(),
            upstream: "10.0.0.1:9000".to_string(),
            tls: true,
        };
        let endpoint = Endpoint::from(&route);
        assert_eq!(endpoint.domain, "a.example");
        assert!(endpoint.tls);
    }
}
