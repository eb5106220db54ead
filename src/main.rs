//! caddy-discovery daemon
//!
//! # Architecture Overview
//!
//! ```text
//!   endpoints.toml ──▶ FileProvider ──▶ LifecycleEvent stream
//!                          │                     │
//!                     snapshot                   ▼
//!                          │              ┌─────────────┐      PATCH routes
//!                          └────────────▶ │   Engine    │ ───────────────────▶ Caddy admin API
//!                                         │  RouteSet   │      POST /load
//!   configuration.toml ──▶ manual routes ▶│             │ ◀── GET /config/
//!                                         └─────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use caddy_discovery::caddy::AdminClient;
use caddy_discovery::config::{self, validation::validate_config, ConfigError};
use caddy_discovery::discovery::FileProvider;
use caddy_discovery::lifecycle::{wait_for_signal, Shutdown};
use caddy_discovery::observability::{init_logging, metrics};
use caddy_discovery::reconcile::{Engine, EngineOptions};

#[derive(Parser, Debug)]
#[command(name = "caddy-discovery", version, about = "Keep Caddy routes in sync with discovered endpoints")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "configuration.toml")]
    config: PathBuf,

    /// Override `caddy.admin_url`.
    #[arg(long)]
    admin_url: Option<String>,

    /// Override `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,

    /// Override `provider.endpoints_file`.
    #[arg(long)]
    endpoints_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, found) = config::read_config(&cli.config)?;
    if let Some(url) = cli.admin_url {
        config.caddy.admin_url = url;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if let Some(path) = cli.endpoints_file {
        config.provider.endpoints_file = path;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability.log_level, config.observability.log_format)?;

    tracing::info!("caddy-discovery v{} starting", env!("CARGO_PKG_VERSION"));
    if !found {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    tracing::info!(
        admin_url = %config.caddy.admin_url,
        endpoints_file = %config.provider.endpoints_file,
        manual_routes = config.routes.len(),
        manual_tls = config.tls.manual,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation already checked the address.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics exporter");
            }
        }
    }

    let shutdown = Shutdown::new();
    let provider = FileProvider::new(
        &config.provider.endpoints_file,
        Duration::from_secs(config.provider.poll_interval_secs),
    )
    .with_shutdown(shutdown.subscribe());

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Shutdown signal received");
        signal_shutdown.trigger();
    });

    let gateway = AdminClient::new(
        &config.caddy.admin_url,
        Duration::from_secs(config.caddy.request_timeout_secs),
    )?;
    let engine = Engine::new(gateway, provider, EngineOptions::from_config(&config));

    if let Err(e) = engine.run().await {
        tracing::error!(error = %e, "Reconciliation stopped");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
