//! Endpoint discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Platform (container runtime, orchestrator, endpoints file)
//!     → provider snapshot (list_active_endpoints)
//!     → provider watch (background task)
//!     → mpsc::UnboundedReceiver<LifecycleEvent>
//!     → reconcile engine (single consumer)
//! ```
//!
//! # Design Decisions
//! - Providers are chosen at build/deploy time; the engine is generic over them
//! - Events are delivered in emission order, never batched or coalesced
//! - Closing the event channel is the only clean shutdown signal

pub mod channel;
pub mod file;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

pub use channel::{ChannelProvider, ChannelProviderHandle};
pub use file::FileProvider;

/// A routable backend discovered on the platform or declared by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Endpoint {
    /// Host name the proxy matches on (e.g. "svc.example").
    pub domain: String,

    /// Upstream dial address ("host:port" or ":port").
    pub upstream: String,

    /// Use an encrypted transport towards the upstream.
    #[serde(default)]
    pub tls: bool,
}

impl Endpoint {
    pub fn new(domain: impl Into<String>, upstream: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            upstream: upstream.into(),
            tls: false,
        }
    }

    /// Builder-style toggle for the upstream TLS transport.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// The (domain, upstream) pair used to match routes.
    pub fn identity(&self) -> RouteIdentity {
        RouteIdentity {
            domain: self.domain.clone(),
            upstream: self.upstream.clone(),
        }
    }

    /// Check the endpoint can be turned into a route Caddy accepts.
    pub fn validate(&self) -> Result<(), String> {
        check_domain(&self.domain)?;
        check_upstream(&self.upstream)
    }
}

/// Domains must carry at least one non-blank character.
pub fn check_domain(domain: &str) -> Result<(), String> {
    if domain.trim().is_empty() {
        return Err("domain must not be empty".to_string());
    }
    Ok(())
}

/// Upstreams are dial addresses: `host:port` or `:port`.
pub fn check_upstream(upstream: &str) -> Result<(), String> {
    let Some((_, port)) = upstream.rsplit_once(':') else {
        return Err(format!("'{}' has no port", upstream));
    };
    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => Err(format!("'{}' has an invalid port", upstream)),
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.domain, self.upstream)?;
        if self.tls {
            write!(f, " (tls)")?;
        }
        Ok(())
    }
}

/// Identity of a route. Two endpoints with the same pair are the same route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteIdentity {
    pub domain: String,
    pub upstream: String,
}

impl fmt::Display for RouteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.domain, self.upstream)
    }
}

/// What happened to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Started,
    Stopped,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Stopped => "stopped",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification that an endpoint appeared or disappeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub endpoint: Endpoint,
    pub kind: EventKind,
}

impl LifecycleEvent {
    pub fn started(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            kind: EventKind::Started,
        }
    }

    pub fn stopped(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            kind: EventKind::Stopped,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.endpoint)
    }
}

/// Errors raised by discovery providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Reading the platform state failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform state could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The background watch could not be started.
    #[error("Watch error: {0}")]
    Watch(String),

    /// The event sequence was already taken.
    #[error("Event stream already taken")]
    AlreadyTaken,
}

/// Capability interface every discovery platform implements.
pub trait DiscoveryProvider {
    /// Point-in-time snapshot of the currently active endpoints.
    fn list_active_endpoints(
        &self,
    ) -> impl Future<Output = Result<Vec<Endpoint>, ProviderError>> + Send;

    /// Start background production and hand out the ordered event sequence.
    ///
    /// The sequence ends when the provider's watch ends or is cancelled.
    fn events(&mut self) -> Result<mpsc::UnboundedReceiver<LifecycleEvent>, ProviderError>;
}
