//! File-backed discovery provider.
//!
//! # Responsibilities
//! - Treat a TOML file of `[[endpoints]]` as the platform's source of truth
//! - Watch the file and turn content changes into lifecycle events
//!
//! # Design Decisions
//! - The parent directory is watched so atomic replace-by-rename is seen
//! - Removals are emitted before additions, each in file order
//! - A file that fails to parse keeps the previous state

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};

use crate::discovery::{DiscoveryProvider, Endpoint, LifecycleEvent, ProviderError};

#[derive(Debug, Default, Deserialize)]
struct EndpointsFile {
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

/// Parse the content of an endpoints file.
///
/// Invalid entries, and later entries sharing the (domain, upstream)
/// identity of an earlier one, are dropped.
pub fn parse_endpoints(content: &str) -> Result<Vec<Endpoint>, ProviderError> {
    let file: EndpointsFile =
        toml::from_str(content).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut endpoints = Vec::with_capacity(file.endpoints.len());
    for endpoint in file.endpoints {
        if let Err(reason) = endpoint.validate() {
            tracing::warn!(endpoint = %endpoint, %reason, "Invalid endpoint in file, ignoring");
            continue;
        }
        if seen.insert(endpoint.identity()) {
            endpoints.push(endpoint);
        } else {
            tracing::warn!(endpoint = %endpoint, "Duplicate endpoint in file, ignoring");
        }
    }
    Ok(endpoints)
}

/// Read and parse an endpoints file.
pub async fn load_endpoints(path: &Path) -> Result<Vec<Endpoint>, ProviderError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_endpoints(&content)
}

/// Compute the events that move `previous` to `current`.
pub fn diff_endpoints(previous: &[Endpoint], current: &[Endpoint]) -> Vec<LifecycleEvent> {
    let mut events: Vec<LifecycleEvent> = previous
        .iter()
        .filter(|e| !current.contains(e))
        .cloned()
        .map(LifecycleEvent::stopped)
        .collect();

    events.extend(
        current
            .iter()
            .filter(|e| !previous.contains(e))
            .cloned()
            .map(LifecycleEvent::started),
    );
    events
}

/// Discovery provider watching an endpoints file.
pub struct FileProvider {
    path: PathBuf,
    poll_interval: Duration,
    known: Arc<Mutex<Vec<Endpoint>>>,
    shutdown: Option<broadcast::Receiver<()>>,
    started: bool,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            path: path.into(),
            poll_interval,
            known: Arc::new(Mutex::new(Vec::new())),
            shutdown: None,
            started: false,
        }
    }

    /// End the event sequence when the shutdown signal fires.
    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn snapshot(&self) -> Vec<Endpoint> {
        self.known
            .lock()
            .map(|known| known.clone())
            .unwrap_or_default()
    }
}

impl DiscoveryProvider for FileProvider {
    fn list_active_endpoints(
        &self,
    ) -> impl Future<Output = Result<Vec<Endpoint>, ProviderError>> + Send {
        let path = self.path.clone();
        let known = self.known.clone();

        async move {
            let endpoints = match load_endpoints(&path).await {
                Err(ProviderError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = ?path, "Endpoints file not found, starting empty");
                    Vec::new()
                }
                other => other?,
            };

            if let Ok(mut known) = known.lock() {
                known.clone_from(&endpoints);
            }
            tracing::info!(
                path = ?path,
                count = endpoints.len(),
                "Loaded endpoints snapshot"
            );
            Ok::<_, ProviderError>(endpoints)
        }
    }

    fn events(&mut self) -> Result<mpsc::UnboundedReceiver<LifecycleEvent>, ProviderError> {
        if self.started {
            return Err(ProviderError::AlreadyTaken);
        }
        self.started = true;

        let (change_tx, mut change_rx) = mpsc::unbounded_channel::<()>();
        let initial_tx = change_tx.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify()
                        || event.kind.is_create()
                        || event.kind.is_remove();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        let _ = change_tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )
        .map_err(|e| ProviderError::Watch(e.to_string()))?;

        let watch_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| ProviderError::Watch(e.to_string()))?;

        // Edits made between the snapshot and the watch produced no notify event.
        let _ = initial_tx.send(());

        tracing::info!(path = ?self.path, "Endpoints file watcher started");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let known = self.known.clone();
        let mut previous = self.snapshot();
        let mut shutdown = self.shutdown.take();

        tokio::spawn(async move {
            // Dropping the watcher with this task stops the notify backend.
            let _watcher = watcher;

            loop {
                let changed = match shutdown.as_mut() {
                    Some(rx) => tokio::select! {
                        changed = change_rx.recv() => changed,
                        _ = rx.recv() => {
                            tracing::info!("Endpoints watcher received shutdown signal");
                            None
                        }
                    },
                    None => change_rx.recv().await,
                };
                if changed.is_none() {
                    break;
                }

                let current = match load_endpoints(&path).await {
                    Ok(current) => current,
                    Err(ProviderError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                        Vec::new()
                    }
                    Err(e) => {
                        tracing::error!(
                            path = ?path,
                            error = %e,
                            "Failed to reload endpoints file. Keeping previous state."
                        );
                        continue;
                    }
                };

                for event in diff_endpoints(&previous, &current) {
                    if events_tx.send(event).is_err() {
                        return;
                    }
                }
                if let Ok(mut known) = known.lock() {
                    *known = current.clone();
                }
                previous = current;
            }

            tracing::info!("Endpoints watcher stopped");
        });

        Ok(events_rx)
    }
}
