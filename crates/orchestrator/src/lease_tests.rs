// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::test_support::{online_node, running_pod};
use orc_core::FakeClock;
use orc_store::InMemoryStore;
use std::time::Duration;

fn watcher(store: Arc<dyn Store>, clock: FakeClock) -> LeaseWatcher<FakeClock> {
    LeaseWatcher::new(
        store,
        ConnectionRegistry::new(),
        clock,
        Duration::from_secs(30),
        Duration::from_secs(120),
    )
}

#[tokio::test]
async fn disconnected_online_node_becomes_suspect() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_000_000);
    let mut node = online_node("n1");
    node.last_heartbeat_ms = clock.epoch_ms();
    let node_id = node.id;
    store.put_node(node).await.unwrap();

    let w = watcher(store.clone(), clock);
    w.sweep().await;

    let node = store.get_node(&node_id).await.unwrap().unwrap();
    assert_eq!(node.status, NodeStatus::Suspect);
    assert!(node.connection_id.is_none());
}

#[tokio::test]
async fn connected_node_with_fresh_heartbeat_stays_online() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_000_000);
    let mut node = online_node("n1");
    node.last_heartbeat_ms = clock.epoch_ms();
    let node_id = node.id;
    store.put_node(node).await.unwrap();

    let registry = ConnectionRegistry::new();
    let (session_id, _rx) = registry.register();
    registry.bind_node(session_id, node_id);

    let w = LeaseWatcher::new(store.clone(), registry, clock, Duration::from_secs(30), Duration::from_secs(120));
    w.sweep().await;

    let node = store.get_node(&node_id).await.unwrap().unwrap();
    assert_eq!(node.status, NodeStatus::Online);
}

#[tokio::test]
async fn suspect_node_past_lease_goes_offline_and_fails_pods() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_000_000);

    let mut node = online_node("n1");
    node.status = NodeStatus::Suspect;
    let node_id = node.id;
    store.put_node(node).await.unwrap();

    let pod = running_pod(node_id, 1);
    let pod_id = pod.id;
    store.put_pod(pod).await.unwrap();

    let w = watcher(store.clone(), clock.clone());
    // First sweep records the suspect-since timestamp.
    w.sweep().await;
    clock.advance(Duration::from_secs(200));
    w.sweep().await;

    let node = store.get_node(&node_id).await.unwrap().unwrap();
    assert_eq!(node.status, NodeStatus::Offline);

    let pod = store.get_pod(&pod_id).await.unwrap().unwrap();
    assert_eq!(pod.status, orc_core::PodStatus::Failed);
    assert_eq!(pod.termination_reason, Some(TerminationReason::NodeLost));
}

#[tokio::test]
async fn offline_node_is_left_alone() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let clock = FakeClock::new();
    let mut node = online_node("n1");
    node.status = NodeStatus::Offline;
    let node_id = node.id;
    store.put_node(node).await.unwrap();

    let w = watcher(store.clone(), clock);
    w.sweep().await;

    let node = store.get_node(&node_id).await.unwrap().unwrap();
    assert_eq!(node.status, NodeStatus::Offline);
}
