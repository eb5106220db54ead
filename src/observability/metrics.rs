//! Metrics collection and exposition.
//!
//! # Metrics
//! - `discovery_events_total` (counter): lifecycle events received, by kind
//! - `discovery_route_pushes_total` (counter): route replacements, by outcome
//! - `discovery_routes` (gauge): routes in the last pushed set
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter serves its own HTTP listener

use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

static DESCRIBED: OnceLock<()> = OnceLock::new();

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;

    describe_metrics();
    tracing::info!(address = %addr, "Prometheus metrics exporter started");
    Ok(())
}

/// Register metric descriptions once.
pub fn describe_metrics() {
    DESCRIBED.get_or_init(|| {
        describe_counter!(
            "discovery_events_total",
            "Lifecycle events received from the discovery provider"
        );
        describe_counter!(
            "discovery_route_pushes_total",
            "Route set replacements sent to the caddy admin API"
        );
        describe_gauge!("discovery_routes", "Routes in the last pushed route set");
    });
}

/// Count a received lifecycle event.
pub fn record_event(kind: &'static str) {
    counter!("discovery_events_total", "kind" => kind).increment(1);
}

/// Count a route push attempt.
pub fn record_push(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("discovery_route_pushes_total", "outcome" => outcome).increment(1);
}

/// Publish the size of the route set just pushed.
pub fn set_route_count(count: usize) {
    gauge!("discovery_routes").set(count as f64);
}
