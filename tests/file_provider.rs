//! File-backed provider driven by real filesystem changes.

mod common;

use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use caddy_discovery::caddy::AdminClient;
use caddy_discovery::discovery::{DiscoveryProvider, Endpoint, FileProvider, LifecycleEvent};
use caddy_discovery::lifecycle::Shutdown;
use caddy_discovery::reconcile::{Engine, EngineOptions};

use common::{hosts, wait_until, MockCaddy};

const WAIT: Duration = Duration::from_secs(10);

fn write_endpoints(path: &Path, entries: &[(&str, &str)]) {
    let mut body = String::new();
    for (domain, upstream) in entries {
        body.push_str(&format!(
            "[[endpoints]]\ndomain = \"{}\"\nupstream = \"{}\"\n\n",
            domain, upstream
        ));
    }
    // Write then rename so the watcher never reads a partial file.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, body).unwrap();
    std::fs::rename(&tmp, path).unwrap();
}

async fn next_event(rx: &mut UnboundedReceiver<LifecycleEvent>) -> LifecycleEvent {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event stream closed")
}

#[tokio::test]
async fn test_file_changes_become_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.toml");
    write_endpoints(&path, &[("a.example", ":1"), ("b.example", ":2")]);

    let mut provider = FileProvider::new(&path, Duration::from_millis(100));
    let snapshot = provider.list_active_endpoints().await.unwrap();
    assert_eq!(snapshot.len(), 2);

    let mut events = provider.events().unwrap();
    write_endpoints(&path, &[("b.example", ":2"), ("c.example", ":3")]);

    assert_eq!(
        next_event(&mut events).await,
        LifecycleEvent::stopped(Endpoint::new("a.example", ":1"))
    );
    assert_eq!(
        next_event(&mut events).await,
        LifecycleEvent::started(Endpoint::new("c.example", ":3"))
    );
}

#[tokio::test]
async fn test_change_before_watch_is_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.toml");
    write_endpoints(&path, &[("a.example", ":1")]);

    let mut provider = FileProvider::new(&path, Duration::from_millis(100));
    let snapshot = provider.list_active_endpoints().await.unwrap();
    assert_eq!(snapshot, vec![Endpoint::new("a.example", ":1")]);

    write_endpoints(&path, &[("b.example", ":2")]);
    let mut events = provider.events().unwrap();

    assert_eq!(
        next_event(&mut events).await,
        LifecycleEvent::stopped(Endpoint::new("a.example", ":1"))
    );
    assert_eq!(
        next_event(&mut events).await,
        LifecycleEvent::started(Endpoint::new("b.example", ":2"))
    );
}

#[tokio::test]
async fn test_deleted_file_stops_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.toml");
    write_endpoints(&path, &[("a.example", ":1")]);

    let mut provider = FileProvider::new(&path, Duration::from_millis(100));
    provider.list_active_endpoints().await.unwrap();
    let mut events = provider.events().unwrap();

    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        next_event(&mut events).await,
        LifecycleEvent::stopped(Endpoint::new("a.example", ":1"))
    );
}

#[tokio::test]
async fn test_shutdown_closes_event_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.toml");
    write_endpoints(&path, &[]);

    let shutdown = Shutdown::new();
    let mut provider =
        FileProvider::new(&path, Duration::from_millis(100)).with_shutdown(shutdown.subscribe());
    let mut events = provider.events().unwrap();

    shutdown.trigger();
    let closed = timeout(WAIT, events.recv()).await.unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_events_can_only_be_taken_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.toml");
    write_endpoints(&path, &[]);

    let mut provider = FileProvider::new(&path, Duration::from_millis(100));
    let _events = provider.events().unwrap();
    assert!(provider.events().is_err());
}

#[tokio::test]
async fn test_engine_follows_endpoints_file() {
    let caddy = MockCaddy::empty();
    let base = caddy.start().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.toml");
    write_endpoints(&path, &[("first.example", "10.0.0.1:80")]);

    let shutdown = Shutdown::new();
    let provider =
        FileProvider::new(&path, Duration::from_millis(100)).with_shutdown(shutdown.subscribe());
    let gateway = AdminClient::new(&base, Duration::from_secs(2)).unwrap();
    let engine = Engine::new(gateway, provider, EngineOptions::default());
    let task = tokio::spawn(engine.run());

    assert!(wait_until(WAIT, || caddy.pushes().len() == 1).await);

    write_endpoints(
        &path,
        &[("first.example", "10.0.0.1:80"), ("second.example", "10.0.0.2:80")],
    );
    assert!(
        wait_until(WAIT, || {
            caddy
                .pushes()
                .last()
                .is_some_and(|p| hosts(p) == ["first.example", "second.example", "*"])
        })
        .await
    );

    shutdown.trigger();
    timeout(WAIT, task).await.unwrap().unwrap().unwrap();
}
