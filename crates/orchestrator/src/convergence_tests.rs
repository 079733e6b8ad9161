// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::test_support::{online_node, pack_with_version, replica_service, daemon_set_service};
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

async fn setup_pack(store: &InMemoryStore, name: &str, version: &str) -> orc_core::PackId {
    let pack = pack_with_version(name, version);
    let id = pack.id;
    store.put_pack(pack).await.unwrap();
    id
}

/// S1: replicas=3, two eligible nodes with spare capacity, zero pods —
/// one tick creates exactly 3 pending pods.
#[tokio::test]
async fn s1_replica_convergence_creates_desired_count() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "app", "1.0.0").await;
    store.put_node(online_node("n1")).await.unwrap();
    store.put_node(online_node("n2")).await.unwrap();

    let mut service = replica_service("s", "1.0.0", 3);
    service.pack_id = pack_id;
    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();

    let service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();

    let pods = store.list_pods_for_service(&service.id).await.unwrap();
    assert_eq!(pods.len(), 3);
    assert!(pods.iter().all(|p| p.status == PodStatus::Pending));
}

/// S1 continued: a second, stable tick is idempotent (§8 property 4).
#[tokio::test]
async fn second_tick_on_stable_input_creates_nothing_new() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "app", "1.0.0").await;
    store.put_node(online_node("n1")).await.unwrap();

    let mut service = replica_service("s", "1.0.0", 2);
    service.pack_id = pack_id;
    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();

    let service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();
    let after_first = store.list_pods_for_service(&service.id).await.unwrap().len();

    let service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();
    let after_second = store.list_pods_for_service(&service.id).await.unwrap().len();

    assert_eq!(after_first, 2);
    assert_eq!(after_second, 2);
}

/// S2: DaemonSet with three eligible nodes converges to one pod each.
#[tokio::test]
async fn s2_daemon_set_creates_one_pod_per_eligible_node() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "agent", "1.0.0").await;
    for name in ["n1", "n2", "n3"] {
        store.put_node(online_node(name)).await.unwrap();
    }

    let mut service = daemon_set_service("s", "1.0.0");
    service.pack_id = pack_id;
    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();

    let service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();

    let pods = store.list_pods_for_service(&service.id).await.unwrap();
    assert_eq!(pods.len(), 3);
    let nodes: HashSet<_> = pods.iter().filter_map(|p| p.node_id).collect();
    assert_eq!(nodes.len(), 3);
}

/// S2 continued: disabling a node stops new placements there but does not
/// touch its already-running pod.
#[tokio::test]
async fn daemon_set_skips_unschedulable_node_without_touching_existing_pod() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "agent", "1.0.0").await;
    let mut n2 = online_node("n2");
    n2.unschedulable = true;
    let n2_id = n2.id;
    store.put_node(online_node("n1")).await.unwrap();
    store.put_node(n2).await.unwrap();

    let mut service = daemon_set_service("s", "1.0.0");
    service.pack_id = pack_id;
    let existing = Pod::builder()
        .service_id(service.id)
        .node_id(n2_id)
        .pack_id(service.pack_id)
        .pack_version("1.0.0")
        .status(PodStatus::Running)
        .build();
    store.put_pod(existing.clone()).await.unwrap();

    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();
    let service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();

    let pods = store.list_pods_for_service(&service.id).await.unwrap();
    // n1 gets a new pod, n2's existing pod is untouched and not duplicated.
    assert_eq!(pods.len(), 2);
    let n2_pods: Vec<_> = pods.iter().filter(|p| p.node_id == Some(n2_id)).collect();
    assert_eq!(n2_pods.len(), 1);
    assert_eq!(n2_pods[0].id, existing.id);
}

/// Scale-down stops the excess pods and leaves the rest running.
#[tokio::test]
async fn replica_scale_down_stops_excess() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "app", "1.0.0").await;
    let node = online_node("n1");
    let node_id = node.id;
    store.put_node(node).await.unwrap();

    let mut service = replica_service("s", "1.0.0", 1);
    service.pack_id = pack_id;
    store.put_service(service.clone()).await.unwrap();

    for _ in 0..3 {
        let pod = Pod::builder()
            .service_id(service.id)
            .node_id(node_id)
            .pack_id(service.pack_id)
            .pack_version("1.0.0")
            .status(PodStatus::Running)
            .build();
        store.put_pod(pod).await.unwrap();
    }

    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();
    let service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();

    let pods = store.list_pods_for_service(&service.id).await.unwrap();
    let stopping = pods.iter().filter(|p| p.status == PodStatus::Stopping).count();
    let running = pods.iter().filter(|p| p.status == PodStatus::Running).count();
    assert_eq!(stopping, 2);
    assert_eq!(running, 1);
}

/// S6: three successive application-failure pods within the window trip
/// crash-loop detection and roll back to `last_successful_version`.
#[tokio::test]
async fn s6_crash_loop_rolls_back_to_last_successful_version() {
    let store = InMemoryStore::new();
    let mut pack = pack_with_version("app", "1.0.0");
    pack.versions.push(orc_core::PackMetadata {
        version: "2.0.0".to_string(),
        digest: "sha256:app:2".to_string(),
        compatible_runtimes: vec![orc_core::RuntimeKind::Process],
        min_runtime_version: None,
        created_epoch_ms: 1_000_000,
    });
    let pack_id = pack.id;
    store.put_pack(pack).await.unwrap();
    store.put_node(online_node("n1")).await.unwrap();

    let mut service = replica_service("s", "2.0.0", 1);
    service.pack_id = pack_id;
    service.last_successful_version = Some("1.0.0".to_string());

    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_000_000);
    let counted = CountedFailures::default();

    for _ in 0..3 {
        let pod = Pod::builder()
            .service_id(service.id)
            .pack_id(service.pack_id)
            .pack_version("2.0.0")
            .status(PodStatus::Failed)
            .termination_reason(TerminationReason::Error)
            .stopped_epoch_ms(clock.epoch_ms())
            .build();
        store.put_pod(pod).await.unwrap();
        service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();
    }

    assert_eq!(service.pack_version, "1.0.0");
    assert_eq!(service.failed_version.as_deref(), Some("2.0.0"));
    assert!(service.failure_backoff_until_ms.is_some());
    assert_eq!(service.crash_loop_count, 0);
}

/// When there is no prior successful version to fall back to, crash-loop
/// detection pauses the service instead.
#[tokio::test]
async fn crash_loop_without_prior_version_pauses_service() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "app", "1.0.0").await;
    store.put_node(online_node("n1")).await.unwrap();

    let mut service = replica_service("s", "1.0.0", 1);
    service.pack_id = pack_id;
    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();

    for _ in 0..3 {
        let pod = Pod::builder()
            .service_id(service.id)
            .pack_id(service.pack_id)
            .pack_version("1.0.0")
            .status(PodStatus::Failed)
            .termination_reason(TerminationReason::Error)
            .stopped_epoch_ms(clock.epoch_ms())
            .build();
        store.put_pod(pod).await.unwrap();
        service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();
    }

    assert_eq!(service.status, ServiceStatus::Degraded);
}

/// Infrastructure failures (node_lost) never count toward crash-loop (§8
/// property 7).
#[tokio::test]
async fn infrastructure_failures_do_not_trip_crash_loop() {
    let store = InMemoryStore::new();
    let pack_id = setup_pack(&store, "app", "1.0.0").await;
    store.put_node(online_node("n1")).await.unwrap();

    let mut service = replica_service("s", "1.0.0", 1);
    service.pack_id = pack_id;
    let registry = ConnectionRegistry::new();
    let clock = FakeClock::new();
    let counted = CountedFailures::default();

    for _ in 0..5 {
        let pod = Pod::builder()
            .service_id(service.id)
            .pack_id(service.pack_id)
            .pack_version("1.0.0")
            .status(PodStatus::Failed)
            .termination_reason(TerminationReason::NodeLost)
            .stopped_epoch_ms(clock.epoch_ms())
            .build();
        store.put_pod(pod).await.unwrap();
        service = converge_service(&store, &clock, &registry, &cfg(), &counted, service).await.unwrap();
    }

    assert_eq!(service.crash_loop_count, 0);
    assert_ne!(service.status, ServiceStatus::Degraded);
}

#[test]
fn backoff_doubles_and_clamps() {
    assert_eq!(backoff_for(1000, 60_000, 1), 1000);
    assert_eq!(backoff_for(1000, 60_000, 2), 2000);
    assert_eq!(backoff_for(1000, 60_000, 3), 4000);
    assert_eq!(backoff_for(1000, 60_000, 20), 60_000);
}
