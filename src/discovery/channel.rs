//! In-process discovery provider.
//!
//! Endpoints are pushed through a [`ChannelProviderHandle`]. The event
//! sequence ends once every handle is closed or dropped.

use std::future::Future;

use tokio::sync::mpsc;

use crate::discovery::{DiscoveryProvider, Endpoint, LifecycleEvent, ProviderError};

/// Provider backed by a fixed snapshot and an in-memory event queue.
#[derive(Debug)]
pub struct ChannelProvider {
    snapshot: Vec<Endpoint>,
    events_rx: Option<mpsc::UnboundedReceiver<LifecycleEvent>>,
}

/// Producer side of a [`ChannelProvider`].
#[derive(Debug, Clone)]
pub struct ChannelProviderHandle {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ChannelProvider {
    /// Create a provider reporting `snapshot` as the active endpoints.
    pub fn new(snapshot: Vec<Endpoint>) -> (Self, ChannelProviderHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                snapshot,
                events_rx: Some(rx),
            },
            ChannelProviderHandle { tx },
        )
    }
}

impl DiscoveryProvider for ChannelProvider {
    fn list_active_endpoints(
        &self,
    ) -> impl Future<Output = Result<Vec<Endpoint>, ProviderError>> + Send {
        let snapshot = self.snapshot.clone();
        async move { Ok(snapshot) }
    }

    fn events(&mut self) -> Result<mpsc::UnboundedReceiver<LifecycleEvent>, ProviderError> {
        self.events_rx.take().ok_or(ProviderError::AlreadyTaken)
    }
}

impl ChannelProviderHandle {
    /// Emit a started event. Returns false once the consumer is gone.
    pub fn start(&self, endpoint: Endpoint) -> bool {
        self.send(LifecycleEvent::started(endpoint))
    }

    /// Emit a stopped event. Returns false once the consumer is gone.
    pub fn stop(&self, endpoint: Endpoint) -> bool {
        self.send(LifecycleEvent::stopped(endpoint))
    }

    pub fn send(&self, event: LifecycleEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Drop this producer. The sequence ends when the last one is closed.
    pub fn close(self) {}
}
