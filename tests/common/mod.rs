//! Shared utilities for integration testing.
//!
//! `MockCaddy` is a small axum app speaking the three admin API calls the
//! daemon uses, recording every request it sees.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

pub const ROUTES_PATH: &str = "/config/apps/http/servers/srv0/routes/";

/// A request observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: &'static str,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockState {
    pub config: Option<Value>,
    pub reject_patches: bool,
    pub reject_reads: bool,
    pub requests: Vec<Recorded>,
}

#[derive(Clone, Default)]
pub struct MockCaddy {
    pub state: Arc<Mutex<MockState>>,
}

impl MockCaddy {
    /// A Caddy with no config loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A Caddy already running `config`.
    pub fn with_config(config: Value) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().config = Some(config);
        mock
    }

    pub fn reject_patches(&self) {
        self.state.lock().unwrap().reject_patches = true;
    }

    pub fn reject_reads(&self) {
        self.state.lock().unwrap().reject_reads = true;
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Method and path of every request, in arrival order.
    pub fn calls(&self) -> Vec<(&'static str, &'static str)> {
        self.requests().iter().map(|r| (r.method, r.path)).collect()
    }

    /// Bodies of all accepted route replacements.
    pub fn pushes(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "PATCH")
            .filter_map(|r| r.body)
            .collect()
    }

    pub fn config(&self) -> Option<Value> {
        self.state.lock().unwrap().config.clone()
    }

    /// Serve on an ephemeral local port and return its base URL.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/config/", get(read_config))
            .route("/load", post(load_config))
            .route(ROUTES_PATH, patch(replace_routes))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }
}

async fn read_config(State(mock): State<MockCaddy>) -> (StatusCode, Json<Value>) {
    let mut state = mock.state.lock().unwrap();
    state.requests.push(Recorded {
        method: "GET",
        path: "/config/",
        body: None,
    });
    if state.reject_reads {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::Null));
    }
    (StatusCode::OK, Json(state.config.clone().unwrap_or(Value::Null)))
}

async fn load_config(State(mock): State<MockCaddy>, Json(body): Json<Value>) -> StatusCode {
    let mut state = mock.state.lock().unwrap();
    state.requests.push(Recorded {
        method: "POST",
        path: "/load",
        body: Some(body.clone()),
    });
    state.config = Some(body);
    StatusCode::OK
}

async fn replace_routes(State(mock): State<MockCaddy>, Json(body): Json<Value>) -> StatusCode {
    let mut state = mock.state.lock().unwrap();
    if state.reject_patches {
        state.requests.push(Recorded {
            method: "PATCH-REJECTED",
            path: ROUTES_PATH,
            body: Some(body),
        });
        return StatusCode::BAD_REQUEST;
    }

    state.requests.push(Recorded {
        method: "PATCH",
        path: ROUTES_PATH,
        body: Some(body.clone()),
    });
    if let Some(server) = state
        .config
        .as_mut()
        .and_then(|c| c.pointer_mut("/apps/http/servers/srv0"))
    {
        server["routes"] = body;
    }
    StatusCode::OK
}

/// Hosts of a pushed route list, `"*"` standing for the fallback.
pub fn hosts(routes: &Value) -> Vec<String> {
    routes
        .as_array()
        .map(|routes| {
            routes
                .iter()
                .map(|r| {
                    r.pointer("/match/0/host/0")
                        .and_then(Value::as_str)
                        .unwrap_or("*")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
