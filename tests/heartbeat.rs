//! Integration tests for the heartbeat broadcast pipeline: a spawned
//! scheduler, the connection set, and module-contributed providers working
//! together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;

use picontrol::domain::{HeartbeatSample, ModuleDescriptor, ProviderError};
use picontrol::realtime::{ConnectionSet, HeartbeatScheduler, ServerMessage};
use picontrol::registry::{LoadedModule, ModuleRegistry, ServerModule};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Provider that records how many times it ran.
struct CountingProvider {
    key: &'static str,
    value: i64,
    runs: AtomicU64,
}

impl CountingProvider {
    fn new(key: &'static str, value: i64) -> Arc<Self> {
        Arc::new(Self {
            key,
            value,
            runs: AtomicU64::new(0),
        })
    }
}

impl ServerModule for CountingProvider {
    fn has_heartbeat(&self) -> bool {
        true
    }

    fn heartbeat(&self, beat: &mut HeartbeatSample) -> Result<(), ProviderError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        beat.set(self.key, json!(self.value));
        Ok(())
    }
}

struct FailingProvider;

impl ServerModule for FailingProvider {
    fn has_heartbeat(&self) -> bool {
        true
    }

    fn heartbeat(&self, _beat: &mut HeartbeatSample) -> Result<(), ProviderError> {
        Err(ProviderError::new("sensor offline"))
    }
}

fn registry_with(units: Vec<(&str, Arc<dyn ServerModule>)>) -> Arc<ModuleRegistry> {
    let loaded = units
        .into_iter()
        .map(|(name, unit)| LoadedModule {
            descriptor: ModuleDescriptor {
                name: name.to_string(),
                label: None,
                icon: None,
                actions: Vec::new(),
            },
            server: Some(unit),
            client: None,
        })
        .collect();
    Arc::new(ModuleRegistry::from_modules(loaded).unwrap())
}

// =============================================================================
// Broadcast behavior
// =============================================================================

#[tokio::test]
async fn spawned_scheduler_broadcasts_provider_output() {
    let provider = CountingProvider::new("cpu", 42);
    let registry = registry_with(vec![("Stats", provider as Arc<dyn ServerModule>)]);
    let connections = Arc::new(ConnectionSet::new());
    let (_id, mut rx) = connections.join("test-client").await;

    HeartbeatScheduler::new(registry, connections, Duration::from_millis(10)).spawn();

    let ServerMessage::Heartbeat(beat) = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no heartbeat within one second")
        .expect("channel closed");
    assert_eq!(beat.get("cpu"), Some(&json!(42)));
    assert!(beat.time().unwrap() > 0);
}

#[tokio::test]
async fn no_sampling_work_happens_without_connections() {
    let provider = CountingProvider::new("cpu", 1);
    let registry = registry_with(vec![("Stats", provider.clone() as Arc<dyn ServerModule>)]);
    let connections = Arc::new(ConnectionSet::new());

    HeartbeatScheduler::new(registry, connections.clone(), Duration::from_millis(10)).spawn();

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(provider.runs.load(Ordering::SeqCst), 0);

    // Once a client connects, sampling resumes and a beat arrives.
    let (_id, mut rx) = connections.join("late-client").await;
    let received = timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(received.is_ok());
    assert!(provider.runs.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn received_times_never_decrease() {
    let registry = registry_with(vec![("Stats", CountingProvider::new("cpu", 1) as Arc<dyn ServerModule>)]);
    let connections = Arc::new(ConnectionSet::new());
    let (_id, mut rx) = connections.join("test-client").await;

    HeartbeatScheduler::new(registry, connections, Duration::from_millis(10)).spawn();

    let mut last = 0;
    for _ in 0..5 {
        let ServerMessage::Heartbeat(beat) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no heartbeat within one second")
            .expect("channel closed");
        let time = beat.time().unwrap();
        assert!(time >= last);
        last = time;
    }
}

#[tokio::test]
async fn failing_provider_suppresses_every_broadcast() {
    let registry = registry_with(vec![
        ("Good", CountingProvider::new("cpu", 42) as Arc<dyn ServerModule>),
        ("Broken", Arc::new(FailingProvider)),
    ]);
    let connections = Arc::new(ConnectionSet::new());
    let (_id, mut rx) = connections.join("test-client").await;

    HeartbeatScheduler::new(registry, connections, Duration::from_millis(10)).spawn();

    // No partial heartbeat may arrive while a provider keeps failing.
    let received = timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(received.is_err());
}

#[tokio::test]
async fn disconnected_client_stops_receiving() {
    let registry = registry_with(vec![("Stats", CountingProvider::new("cpu", 1) as Arc<dyn ServerModule>)]);
    let connections = Arc::new(ConnectionSet::new());
    let (id, mut rx) = connections.join("test-client").await;

    HeartbeatScheduler::new(registry, connections.clone(), Duration::from_millis(10)).spawn();

    assert!(timeout(Duration::from_secs(1), rx.recv()).await.is_ok());

    connections.leave(&id).await;
    assert_eq!(connections.count().await, 0);

    // Drain whatever was queued before the leave, then expect silence.
    while rx.try_recv().is_ok() {}
    let received = timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(received.is_err() || received.unwrap().is_none());
}
