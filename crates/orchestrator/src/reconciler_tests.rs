// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use super::*;
use orc_core::test_support::{daemon_set_service, online_node, pack_with_version, replica_service};
use orc_core::FakeClock;
use orc_store::InMemoryStore;

fn cfg() -> ReconcileConfig {
    ReconcileConfig {
        max_consecutive_failures: 3,
        failure_window_ms: 60_000,
        initial_backoff_ms: 30_000,
        max_backoff_ms: 600_000,
    }
}

#[tokio::test]
async fn tick_converges_every_service_independently() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let pack = pack_with_version("app", "1.0.0");
    let pack_id = pack.id;
    store.put_pack(pack).await.unwrap();
    store.put_node(online_node("n1")).await.unwrap();
    store.put_node(online_node("n2")).await.unwrap();

    let mut a = replica_service("a", "1.0.0", 2);
    a.pack_id = pack_id;
    let mut b = daemon_set_service("b", "1.0.0");
    b.pack_id = pack_id;
    store.put_service(a.clone()).await.unwrap();
    store.put_service(b.clone()).await.unwrap();

    let reconciler = Reconciler::new(store.clone(), ConnectionRegistry::new(), FakeClock::new(), cfg());
    reconciler.tick().await;

    assert_eq!(store.list_pods_for_service(&a.id).await.unwrap().len(), 2);
    assert_eq!(store.list_pods_for_service(&b.id).await.unwrap().len(), 2);
}

/// A service with no matching pack still lets the tick finish and
/// converge every other service (§7: nothing kills the tick loop).
#[tokio::test]
async fn broken_service_does_not_block_others() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let pack = pack_with_version("app", "1.0.0");
    let pack_id = pack.id;
    store.put_pack(pack).await.unwrap();
    store.put_node(online_node("n1")).await.unwrap();

    let broken = replica_service("broken", "1.0.0", 1); // pack_id left at default, unresolvable
    let mut healthy = replica_service("healthy", "1.0.0", 1);
    healthy.pack_id = pack_id;
    store.put_service(broken.clone()).await.unwrap();
    store.put_service(healthy.clone()).await.unwrap();

    let reconciler = Reconciler::new(store.clone(), ConnectionRegistry::new(), FakeClock::new(), cfg());
    reconciler.tick().await;

    assert_eq!(store.list_pods_for_service(&broken.id).await.unwrap().len(), 0);
    assert_eq!(store.list_pods_for_service(&healthy.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn trigger_coalesces_concurrent_calls_into_one_extra_tick() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let reconciler = Reconciler::new(store, ConnectionRegistry::new(), FakeClock::new(), cfg());
    let shutdown = tokio_util::sync::CancellationToken::new();

    let handle = tokio::spawn(reconciler.clone().run(Duration::from_secs(3600), Duration::from_millis(10), shutdown.clone()));

    reconciler.trigger();
    reconciler.trigger();
    reconciler.trigger();
    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown.cancel();
    handle.await.unwrap();
}
