//! Translation between endpoints and Caddy routes.
//!
//! # Route Shapes
//! ```text
//! endpoint route:  match host=[domain]
//!                  → subroute → reverse_proxy dial=upstream [transport tls]
//! fallback route:  match {} (any host)
//!                  → static_response 404 "Not Found"
//! ```
//!
//! # Design Decisions
//! - Translation is pure and total
//! - A route's identity is read back from its own structure, so routes
//!   decoded from the admin API are matched the same way as fresh ones
//! - The fallback is recognised by shape, not by a marker field

use crate::caddy::types::{
    Handle, Match, Route, Transport, TransportTls, Upstream, HANDLER_REVERSE_PROXY,
    HANDLER_STATIC_RESPONSE, HANDLER_SUBROUTE,
};
use crate::discovery::{Endpoint, RouteIdentity};

/// Status code answered by the fallback route.
pub const FALLBACK_STATUS: u16 = 404;

/// Body answered by the fallback route.
pub const FALLBACK_BODY: &str = "Not Found";

/// Build a host-matched forwarding route for `endpoint`.
pub fn to_route(endpoint: &Endpoint) -> Route {
    let transport = endpoint.tls.then(|| Transport {
        protocol: Some("http".to_string()),
        tls: Some(TransportTls::default()),
    });

    let reverse_proxy = Handle {
        handler: HANDLER_REVERSE_PROXY.to_string(),
        upstreams: vec![Upstream {
            dial: endpoint.upstream.clone(),
        }],
        transport,
        ..Handle::default()
    };

    Route {
        matchers: vec![Match {
            host: vec![endpoint.domain.clone()],
        }],
        handle: vec![Handle {
            handler: HANDLER_SUBROUTE.to_string(),
            routes: vec![Route {
                matchers: Vec::new(),
                handle: vec![reverse_proxy],
            }],
            ..Handle::default()
        }],
    }
}

/// Build the catch-all route answering 404 for any host.
pub fn fallback_route() -> Route {
    Route {
        matchers: vec![Match::default()],
        handle: vec![Handle {
            handler: HANDLER_STATIC_RESPONSE.to_string(),
            status_code: Some(FALLBACK_STATUS),
            body: Some(FALLBACK_BODY.to_string()),
            ..Handle::default()
        }],
    }
}

impl Route {
    /// True when this is the catch-all 404 route.
    pub fn is_fallback(&self) -> bool {
        self.handle.first().is_some_and(|h| {
            h.handler == HANDLER_STATIC_RESPONSE && h.status_code == Some(FALLBACK_STATUS)
        })
    }

    /// Recover the (domain, upstream) pair of a forwarding route.
    pub fn identity(&self) -> Option<RouteIdentity> {
        let domain = self.matchers.first()?.host.first()?;

        let upstream = self
            .handle
            .first()?
            .routes
            .first()?
            .handle
            .iter()
            .find(|h| h.handler == HANDLER_REVERSE_PROXY)?
            .upstreams
            .first()?;

        Some(RouteIdentity {
            domain: domain.clone(),
            upstream: upstream.dial.clone(),
        })
    }

    /// True when this route forwards traffic for `identity`.
    pub fn matches(&self, identity: &RouteIdentity) -> bool {
        self.identity().as_ref() == Some(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_route_shape() {
        let route = to_route(&Endpoint::new("svc.example", ":8080"));
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({
                "match": [{"host": ["svc.example"]}],
                "handle": [{
                    "handler": "subroute",
                    "routes": [{
                        "handle": [{
                            "handler": "reverse_proxy",
                            "upstreams": [{"dial": ":8080"}]
                        }]
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_tls_route_uses_encrypted_transport() {
        let route = to_route(&Endpoint::new("ext.example", "10.0.0.9:443").with_tls(true));
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(
            value["handle"][0]["routes"][0]["handle"][0]["transport"],
            json!({"protocol": "http", "tls": {}})
        );
    }

    #[test]
    fn test_fallback_shape() {
        let route = fallback_route();
        assert!(route.is_fallback());
        assert_eq!(route.identity(), None);
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({
                "match": [{}],
                "handle": [{
                    "handler": "static_response",
                    "status_code": 404,
                    "body": "Not Found"
                }]
            })
        );
    }

    #[test]
    fn test_identity_round_trip() {
        for endpoint in [
            Endpoint::new("a.example", "10.0.0.1:9000"),
            Endpoint::new("svc.example", ":8080").with_tls(true),
            Endpoint::new("web.default.example", "web.default.svc.cluster.local:80"),
        ] {
            let route = to_route(&endpoint);
            assert!(!route.is_fallback());
            assert_eq!(route.identity(), Some(endpoint.identity()));
            assert!(route.matches(&endpoint.identity()));
        }
    }

    #[test]
    fn test_identity_survives_json_decode() {
        let endpoint = Endpoint::new("svc.example", ":8080");
        let encoded = serde_json::to_string(&to_route(&endpoint)).unwrap();
        let decoded: Route = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.identity(), Some(endpoint.identity()));
    }

    #[test]
    fn test_other_static_response_is_not_fallback() {
        let mut route = fallback_route();
        route.handle[0].status_code = Some(503);
        assert!(!route.is_fallback());
    }

    #[test]
    fn test_matches_requires_both_parts() {
        let route = to_route(&Endpoint::new("svc.example", ":8080"));
        assert!(!route.matches(&Endpoint::new("svc.example", ":9090").identity()));
        assert!(!route.matches(&Endpoint::new("other.example", ":8080").identity()));
    }
}
