//! Route reconciliation engine.
//!
//! # Responsibilities
//! - Make sure Caddy has a config to patch (bootstrap when missing)
//! - Build the first route set from the provider snapshot, manual routes
//!   and the fallback, and push it
//! - Fold lifecycle events into the route set one at a time, pushing the
//!   full set after each
//!
//! # Design Decisions
//! - Single writer: the engine owns the `RouteSet`, no locking
//! - Events are applied strictly in order, no batching or debouncing
//! - Every error is returned to the caller; there is no retry or rollback,
//!   so a failed push can leave Caddy behind the in-memory set until the
//!   next restart resyncs it

use tokio::sync::mpsc;

use crate::caddy::{ConfigGateway, GatewayError, LoadFile};
use crate::config::schema::{DiscoveryConfig, UnknownStopPolicy};
use crate::discovery::{DiscoveryProvider, Endpoint, EventKind, LifecycleEvent};
use crate::observability::metrics;
use crate::reconcile::error::{EngineError, EngineResult};
use crate::reconcile::route_set::RouteSet;

/// Static inputs of the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Certificate pair attached when bootstrapping a config.
    pub tls: Option<LoadFile>,

    /// Operator routes merged during initial sync.
    pub manual_routes: Vec<Endpoint>,

    /// Handling of stop events with no matching route.
    pub unknown_stop: UnknownStopPolicy,
}

impl EngineOptions {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            tls: config.tls.load_file(),
            manual_routes: config.routes.iter().map(Endpoint::from).collect(),
            unknown_stop: config.reconcile.unknown_stop,
        }
    }
}

/// Effect of one lifecycle event on the route set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Added,
    AlreadyPresent,
    Removed,
    IgnoredUnknownStop,
}

/// Keeps Caddy's route list in step with the discovery provider.
pub struct Engine<G, P> {
    gateway: G,
    provider: P,
    options: EngineOptions,
    routes: RouteSet,
}

impl<G, P> Engine<G, P>
where
    G: ConfigGateway,
    P: DiscoveryProvider,
{
    pub fn new(gateway: G, provider: P, options: EngineOptions) -> Self {
        Self {
            gateway,
            provider,
            options,
            routes: RouteSet::new(),
        }
    }

    /// Current in-memory route set.
    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }

    /// Bootstrap, initial sync, then the event loop until the provider's
    /// event sequence ends.
    pub async fn run(mut self) -> EngineResult<()> {
        self.ensure_config().await?;
        self.configure_initial_routes().await?;

        let events = self.provider.events()?;
        self.handle_lifecycle_events(events).await
    }

    /// Install a minimal config if Caddy has none. Idempotent.
    pub async fn ensure_config(&self) -> EngineResult<()> {
        match self.gateway.read_config().await {
            Ok(_) => {
                tracing::debug!("Caddy config present");
                Ok(())
            }
            Err(GatewayError::NotFound) => {
                tracing::info!("No caddy config found, creating one");
                self.gateway
                    .bootstrap_config(self.options.tls.as_ref())
                    .await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Seed the route set from the provider snapshot and push it.
    pub async fn configure_initial_routes(&mut self) -> EngineResult<()> {
        let endpoints = self.provider.list_active_endpoints().await?;
        tracing::info!(
            endpoints = endpoints.len(),
            "Initial endpoint snapshot retrieved, updating caddy configuration"
        );

        let mut routes = RouteSet::from_endpoints(&endpoints);

        for manual in &self.options.manual_routes {
            if routes.insert_endpoint(manual) {
                tracing::info!(route = %manual, "Added manual route");
            } else {
                tracing::debug!(route = %manual, "Manual route already discovered");
            }
        }

        if routes.ensure_fallback() {
            tracing::debug!("Appended fallback route");
        }
        routes.ensure_fallback_last();

        self.gateway.log_current_config().await;

        self.routes = routes;
        self.push().await
    }

    /// Apply events until the sequence ends or an error occurs.
    pub async fn handle_lifecycle_events(
        &mut self,
        mut events: mpsc::UnboundedReceiver<LifecycleEvent>,
    ) -> EngineResult<()> {
        while let Some(event) = events.recv().await {
            tracing::info!(
                kind = %event.kind,
                domain = %event.endpoint.domain,
                upstream = %event.endpoint.upstream,
                "Received lifecycle event"
            );
            metrics::record_event(event.kind.as_str());

            let applied = self.apply(&event)?;
            tracing::debug!(?applied, routes = self.routes.len(), "Event applied");

            self.routes.ensure_fallback_last();
            self.push().await?;
        }

        tracing::info!("Lifecycle event stream closed");
        Ok(())
    }

    /// Fold one event into the route set without pushing.
    pub fn apply(&mut self, event: &LifecycleEvent) -> EngineResult<Applied> {
        let identity = event.endpoint.identity();

        match event.kind {
            EventKind::Started => {
                if self.routes.insert_endpoint(&event.endpoint) {
                    tracing::info!(route = %event.endpoint, "Adding route");
                    Ok(Applied::Added)
                } else {
                    tracing::debug!(route = %identity, "Route already present");
                    Ok(Applied::AlreadyPresent)
                }
            }
            EventKind::Stopped => {
                if self.routes.remove(&identity) > 0 {
                    tracing::info!(route = %identity, "Removing route");
                    return Ok(Applied::Removed);
                }

                match self.options.unknown_stop {
                    UnknownStopPolicy::Fail => {
                        tracing::error!(route = %identity, "Route not found for stop event");
                        Err(EngineError::RouteNotFound(event.clone()))
                    }
                    UnknownStopPolicy::Ignore => {
                        tracing::warn!(route = %identity, "Route not found for stop event, ignoring");
                        Ok(Applied::IgnoredUnknownStop)
                    }
                }
            }
        }
    }

    async fn push(&self) -> EngineResult<()> {
        match self.gateway.replace_routes(self.routes.routes()).await {
            Ok(()) => {
                metrics::record_push(true);
                metrics::set_route_count(self.routes.len());
                Ok(())
            }
            Err(e) => {
                metrics::record_push(false);
                tracing::error!(error = %e, "Failed to push routes to caddy");
                Err(e.into())
            }
        }
    }
}
