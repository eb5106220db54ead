//! The authoritative in-process route list.
//!
//! # Invariants
//! - No two forwarding routes share a (domain, upstream) identity
//! - At most one fallback route exists
//! - The fallback, when present, is the last element
//!
//! Caddy evaluates routes first-match-wins, so a fallback anywhere but the
//! tail would shadow every route after it.

use crate::caddy::routes::{fallback_route, to_route};
use crate::caddy::types::Route;
use crate::discovery::{Endpoint, RouteIdentity};

/// Ordered route list owned by the reconcile engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSet {
    routes: Vec<Route>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from translated endpoints, dropping repeated identities.
    pub fn from_endpoints<'a>(endpoints: impl IntoIterator<Item = &'a Endpoint>) -> Self {
        let mut set = Self::new();
        for endpoint in endpoints {
            if !set.insert_endpoint(endpoint) {
                tracing::warn!(endpoint = %endpoint, "Duplicate endpoint in snapshot, ignoring");
            }
        }
        set
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn contains(&self, identity: &RouteIdentity) -> bool {
        self.routes.iter().any(|r| r.matches(identity))
    }

    pub fn has_fallback(&self) -> bool {
        self.routes.iter().any(Route::is_fallback)
    }

    /// Insert `route` before the fallback.
    ///
    /// Returns false, leaving the set untouched, when a route with the same
    /// identity (or a second fallback) is already present.
    pub fn insert(&mut self, route: Route) -> bool {
        if route.is_fallback() {
            return self.ensure_fallback();
        }
        if let Some(identity) = route.identity() {
            if self.contains(&identity) {
                return false;
            }
        }

        let position = self
            .routes
            .iter()
            .position(Route::is_fallback)
            .unwrap_or(self.routes.len());
        self.routes.insert(position, route);
        true
    }

    pub fn insert_endpoint(&mut self, endpoint: &Endpoint) -> bool {
        self.insert(to_route(endpoint))
    }

    /// Remove every route carrying `identity`. Returns how many were removed.
    pub fn remove(&mut self, identity: &RouteIdentity) -> usize {
        let before = self.routes.len();
        self.routes.retain(|r| !r.matches(identity));
        before - self.routes.len()
    }

    /// Append a fallback if none exists. Returns true when one was added.
    pub fn ensure_fallback(&mut self) -> bool {
        if self.has_fallback() {
            return false;
        }
        self.routes.push(fallback_route());
        true
    }

    /// Move the fallback to the tail, collapsing duplicates into one.
    pub fn ensure_fallback_last(&mut self) {
        let mut fallback = None;
        self.routes.retain(|r| {
            if r.is_fallback() {
                fallback.get_or_insert_with(|| r.clone());
                false
            } else {
                true
            }
        });
        if let Some(route) = fallback {
            self.routes.push(route);
        }
    }

    /// Identities of the forwarding routes, in order.
    pub fn identities(&self) -> Vec<RouteIdentity> {
        self.routes.iter().filter_map(Route::identity).collect()
    }
}
