// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::test_support::online_node;
use orc_core::{FakeClock, PackId};
use orc_store::{InMemoryStore, Store};

fn spec(node_id: Option<NodeId>, incarnation: Incarnation) -> NewPodSpec {
    NewPodSpec {
        namespace: Namespace::default(),
        service_id: Some(ServiceId::new()),
        pack_id: PackId::new(),
        pack_version: "1.0.0".to_string(),
        node_id,
        incarnation,
        labels: HashMap::new(),
    }
}

#[tokio::test]
async fn next_incarnation_starts_at_one_for_empty_service() {
    let store = InMemoryStore::new();
    let service_id = ServiceId::new();
    assert_eq!(next_incarnation(&store, &service_id).await.unwrap(), 1);
}

#[tokio::test]
async fn next_incarnation_increments_past_existing_max() {
    let store = InMemoryStore::new();
    let node = online_node("n1");
    let node_id = node.id;
    store.put_node(node).await.unwrap();

    let pod_spec = spec(Some(node_id), 1);
    let service_id = pod_spec.service_id.unwrap();
    let pod = create_pod(&store, &FakeClock::new(), pod_spec).await.unwrap();
    assert_eq!(pod.incarnation, 1);

    assert_eq!(next_incarnation(&store, &service_id).await.unwrap(), 2);
}

#[tokio::test]
async fn created_pod_with_node_gets_scheduled_history_entry() {
    let store = InMemoryStore::new();
    let pod = create_pod(&store, &FakeClock::new(), spec(Some(NodeId::new()), 1)).await.unwrap();
    let history = store.pod_history(&pod.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(matches!(history[0].action, PodHistoryAction::Created));
    assert!(matches!(history[1].action, PodHistoryAction::Scheduled));
}

#[tokio::test]
async fn created_pod_without_node_has_no_scheduled_entry() {
    let store = InMemoryStore::new();
    let pod = create_pod(&store, &FakeClock::new(), spec(None, 1)).await.unwrap();
    let history = store.pod_history(&pod.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!pod.is_assigned());
}

#[test]
fn matching_incarnation_passes_check() {
    let pod = Pod::builder().incarnation(3).build();
    assert!(check_incarnation(&pod, 3).is_ok());
}

#[test]
fn stale_incarnation_is_rejected() {
    let pod = Pod::builder().incarnation(3).build();
    let err = check_incarnation(&pod, 2).unwrap_err();
    assert!(matches!(err, SessionError::StaleIncarnation { expected: 3, got: 2 }));
}

#[tokio::test]
async fn mark_started_sets_timestamp_once() {
    let store = InMemoryStore::new();
    let clock = FakeClock::new();
    let pod = create_pod(&store, &clock, spec(Some(NodeId::new()), 1)).await.unwrap();

    clock.advance(std::time::Duration::from_millis(500));
    let pod = mark_started(&store, &clock, pod).await.unwrap();
    let first_started = pod.started_epoch_ms;
    assert!(first_started.is_some());

    clock.advance(std::time::Duration::from_millis(500));
    let pod = mark_started(&store, &clock, pod).await.unwrap();
    assert_eq!(pod.started_epoch_ms, first_started);

    let history = store.pod_history(&pod.id).await.unwrap();
    assert!(matches!(history[history.len() - 2].action, PodHistoryAction::Started));
    assert!(matches!(history[history.len() - 1].action, PodHistoryAction::Restarted));
}

#[tokio::test]
async fn mark_stopped_with_application_reason_is_failed() {
    let store = InMemoryStore::new();
    let clock = FakeClock::new();
    let pod = create_pod(&store, &clock, spec(Some(NodeId::new()), 1)).await.unwrap();
    let pod = mark_stopped(&store, &clock, pod, TerminationReason::Error).await.unwrap();

    assert_eq!(pod.status, PodStatus::Failed);
    assert_eq!(pod.termination_reason, Some(TerminationReason::Error));
    let history = store.pod_history(&pod.id).await.unwrap();
    assert!(matches!(
        history.last().unwrap().action,
        PodHistoryAction::Failed { reason: TerminationReason::Error }
    ));
}

#[tokio::test]
async fn mark_stopped_with_admin_stop_is_stopped() {
    let store = InMemoryStore::new();
    let clock = FakeClock::new();
    let pod = create_pod(&store, &clock, spec(Some(NodeId::new()), 1)).await.unwrap();
    let pod = mark_stopped(&store, &clock, pod, TerminationReason::AdminStop).await.unwrap();

    assert_eq!(pod.status, PodStatus::Stopped);
    let history = store.pod_history(&pod.id).await.unwrap();
    assert!(matches!(
        history.last().unwrap().action,
        PodHistoryAction::Stopped { reason: TerminationReason::AdminStop }
    ));
}
