//! Caddy admin API client.
//!
//! # Responsibilities
//! - Read the running config (`GET /config/`)
//! - Install a minimal config when none exists (`POST /load`)
//! - Replace the managed server's route list (`PATCH .../routes/`)
//!
//! # Design Decisions
//! - Replacement is unconditional (last writer wins, no ETag check)
//! - Any non-2xx answer is surfaced as `Rejected`, never retried here
//! - A `null` or empty config document means "no config"

use std::time::Duration;

use reqwest::Method;
use url::Url;

use crate::caddy::error::{GatewayError, GatewayResult};
use crate::caddy::types::{Config, LoadFile, Route, SERVER_NAME};
use crate::caddy::ConfigGateway;

/// HTTP client for one Caddy admin endpoint.
#[derive(Clone)]
pub struct AdminClient {
    base: Url,
    http: reqwest::Client,
}

impl AdminClient {
    /// Create a client for the admin API at `admin_url`.
    pub fn new(admin_url: &str, request_timeout: Duration) -> GatewayResult<Self> {
        let mut base: Url = admin_url
            .parse()
            .map_err(|e| GatewayError::InvalidUrl(format!("'{}': {}", admin_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(admin_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self { base, http })
    }

    fn url(&self, path: &str) -> GatewayResult<Url> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(format!("'{}': {}", path, e)))
    }

    fn routes_url(&self) -> GatewayResult<Url> {
        self.url(&format!("config/apps/http/servers/{}/routes/", SERVER_NAME))
    }

    async fn send_json<T: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &T,
    ) -> GatewayResult<()> {
        let response = self
            .http
            .request(method.clone(), url.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                detail = %detail.trim(),
                "Admin API rejected request"
            );
            return Err(GatewayError::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl ConfigGateway for AdminClient {
    async fn read_config(&self) -> GatewayResult<Config> {
        let url = self.url("config/")?;
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Err(GatewayError::NotFound);
        }

        Ok(serde_json::from_str(body)?)
    }

    async fn bootstrap_config(&self, tls: Option<&LoadFile>) -> GatewayResult<()> {
        if let Some(files) = tls {
            tracing::info!(
                cert_file_path = %files.certificate,
                key_file_path = %files.key,
                "Using manual TLS configuration"
            );
        }

        let config = Config::bootstrap(tls);
        self.send_json(Method::POST, self.url("load")?, &config)
            .await?;

        tracing::info!("Created caddy config successfully");
        Ok(())
    }

    async fn replace_routes(&self, routes: &[Route]) -> GatewayResult<()> {
        self.send_json(Method::PATCH, self.routes_url()?, routes)
            .await?;
        tracing::debug!(routes = routes.len(), "Replaced caddy routes");
        Ok(())
    }

    async fn log_current_config(&self) {
        match self.read_config().await {
            Ok(config) => match serde_json::to_string(&config) {
                Ok(encoded) => tracing::debug!(config = %encoded, "Current caddy config"),
                Err(e) => tracing::debug!(error = %e, "Could not encode current caddy config"),
            },
            Err(e) => tracing::debug!(error = %e, "Could not read current caddy config"),
        }
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base", &self.base.as_str())
            .finish()
    }
}
