//! Caddy JSON config model.
//!
//! Only the subset of the admin API document this daemon reads or writes is
//! modelled. Empty optional collections are skipped on output so the
//! documents match what Caddy itself emits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Name of the HTTP server whose routes are managed.
pub const SERVER_NAME: &str = "srv0";

/// Handler name of a nested route group.
pub const HANDLER_SUBROUTE: &str = "subroute";

/// Handler name forwarding to upstreams.
pub const HANDLER_REVERSE_PROXY: &str = "reverse_proxy";

/// Handler name returning a fixed response.
pub const HANDLER_STATIC_RESPONSE: &str = "static_response";

/// Root of a Caddy config document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub apps: Apps,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Apps {
    #[serde(default)]
    pub http: HttpApp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsApp>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HttpApp {
    #[serde(default)]
    pub servers: HashMap<String, Server>,
}

/// An HTTP server block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Server {
    #[serde(default)]
    pub listen: Vec<String>,

    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tls_connection_policies: Vec<TlsConnectionPolicy>,
}

/// A route entry: match predicates plus a handler chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Route {
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<Match>,

    #[serde(default)]
    pub handle: Vec<Handle>,
}

/// Request matcher. An empty matcher matches every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Match {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
}

/// A handler in a route's chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Handle {
    pub handler: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upstreams: Vec<Upstream>,

    /// static_response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// static_response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// reverse_proxy only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Upstream {
    pub dial: String,
}

/// Transport towards the upstreams of a reverse_proxy handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TransportTls>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransportTls {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TlsConnectionPolicy {}

/// The `tls` app, used to load operator-supplied certificates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TlsApp {
    #[serde(default)]
    pub certificates: Certificates,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Certificates {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_files: Vec<LoadFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoadFile {
    pub certificate: String,
    pub key: String,
}

impl Config {
    /// The minimal document installed when Caddy has no config yet.
    ///
    /// One server answering on :443 and :80 with no routes. When `tls` is
    /// given, the tls app loads that certificate/key pair.
    pub fn bootstrap(tls: Option<&LoadFile>) -> Self {
        let server = Server {
            listen: vec![":443".to_string(), ":80".to_string()],
            routes: Vec::new(),
            tls_connection_policies: Vec::new(),
        };

        let mut config = Config::default();
        config
            .apps
            .http
            .servers
            .insert(SERVER_NAME.to_string(), server);

        if let Some(files) = tls {
            config.apps.tls = Some(TlsApp {
                certificates: Certificates {
                    load_files: vec![files.clone()],
                },
            });
        }
        config
    }
}
