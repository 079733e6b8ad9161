// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod lifecycle transitions (§4.4): incarnation allocation, the
//! incarnation staleness guard, status transitions, and history writes.
//!
//! Grounded on `job.rs`'s step-transition methods in the teacher
//! (`finalize_current_step`/`push_step`, "timestamp set once" pattern),
//! adapted from a single-job step machine to a per-pod status machine with
//! an explicit incarnation fencing check instead of a step name.

use std::collections::HashMap;

use orc_core::{
    Clock, Incarnation, Namespace, NodeId, PackId, Pod, PodHistoryAction, PodHistoryEntry, PodId,
    PodStatus, ServiceId, TerminationReason,
};
use orc_store::Store;

use crate::error::SessionError;

/// Allocates the next incarnation for `service_id` by scanning its current
/// pods. A real transactional store would do this with a single
/// `max(incarnation)+1 WHERE service_id=?` statement (§4.4); this client
/// reproduces the same guarantee by reading the full pod set and taking the
/// max since `Store` exposes typed CRUD, not raw SQL.
pub async fn next_incarnation(
    store: &dyn Store,
    service_id: &ServiceId,
) -> Result<Incarnation, SessionError> {
    let pods = store.list_pods_for_service(service_id).await?;
    Ok(pods.iter().map(|p| p.incarnation).max().unwrap_or(0) + 1)
}

/// Arguments to create a new pod for a service (§4.5.4's pod-creation contract).
pub struct NewPodSpec {
    pub namespace: Namespace,
    pub service_id: Option<ServiceId>,
    pub pack_id: PackId,
    pub pack_version: String,
    pub node_id: Option<NodeId>,
    pub incarnation: Incarnation,
    pub labels: HashMap<String, String>,
}

/// Creates and persists a new pod, appending a `Created` history entry.
/// Node binding (if any) happens at call time via `spec.node_id` — this
/// function never itself invokes the scheduler.
pub async fn create_pod(
    store: &dyn Store,
    clock: &dyn Clock,
    spec: NewPodSpec,
) -> Result<Pod, SessionError> {
    let now = clock.epoch_ms();
    let pod = Pod {
        id: PodId::new(),
        namespace: spec.namespace,
        service_id: spec.service_id,
        pack_id: spec.pack_id,
        pack_version: spec.pack_version,
        node_id: spec.node_id,
        incarnation: spec.incarnation,
        status: PodStatus::Pending,
        termination_reason: None,
        labels: spec.labels,
        created_epoch_ms: now,
        started_epoch_ms: None,
        stopped_epoch_ms: None,
    };
    store.put_pod(pod.clone()).await?;
    store
        .append_pod_history(PodHistoryEntry::new(
            pod.id,
            pod.service_id,
            PodHistoryAction::Created,
            now,
        ))
        .await?;
    if pod.node_id.is_some() {
        store
            .append_pod_history(PodHistoryEntry::new(
                pod.id,
                pod.service_id,
                PodHistoryAction::Scheduled,
                now,
            ))
            .await?;
    }
    Ok(pod)
}

/// Validates an inbound status message's incarnation against the stored
/// pod, returning `StaleIncarnation` on mismatch (§4.4, §8 property 2).
/// Late messages from a superseded pod instance never mutate state.
pub fn check_incarnation(pod: &Pod, incarnation: Incarnation) -> Result<(), SessionError> {
    if pod.incarnation != incarnation {
        return Err(SessionError::StaleIncarnation { expected: pod.incarnation, got: incarnation });
    }
    Ok(())
}

/// Transition a pod to `Running`, setting `started_epoch_ms` once (never
/// overwritten on a later call, matching the teacher's "timestamp set only
/// the first time" convention). A pod that was already started once before
/// (the node reporting `running` again without a new incarnation) is
/// recorded as `Restarted` rather than `Started`.
pub async fn mark_started(
    store: &dyn Store,
    clock: &dyn Clock,
    mut pod: Pod,
) -> Result<Pod, SessionError> {
    let restarted = pod.started_epoch_ms.is_some();
    pod.status = PodStatus::Running;
    if !restarted {
        pod.started_epoch_ms = Some(clock.epoch_ms());
    }
    store.put_pod(pod.clone()).await?;
    let action = if restarted { PodHistoryAction::Restarted } else { PodHistoryAction::Started };
    store.append_pod_history(PodHistoryEntry::new(pod.id, pod.service_id, action, clock.epoch_ms())).await?;
    Ok(pod)
}

/// Transition a pod to `Stopping` (controller-initiated, e.g. scale-down or
/// rolling update); terminal status and reason are set later by
/// [`mark_stopped`] once the node confirms.
pub async fn mark_stopping(store: &dyn Store, clock: &dyn Clock, mut pod: Pod) -> Result<Pod, SessionError> {
    pod.status = PodStatus::Stopping;
    store.put_pod(pod.clone()).await?;
    store
        .append_pod_history(PodHistoryEntry::new(
            pod.id,
            pod.service_id,
            PodHistoryAction::Stopping,
            clock.epoch_ms(),
        ))
        .await?;
    Ok(pod)
}

/// Transition a pod to its terminal status — `Stopped`, `Failed`, or
/// `Evicted` depending on `reason` (§4.4's application/infrastructure
/// taxonomy, via [`TerminationReason::terminal_status`]). `stopped_epoch_ms`
/// is set once, never overwritten.
pub async fn mark_stopped(
    store: &dyn Store,
    clock: &dyn Clock,
    mut pod: Pod,
    reason: TerminationReason,
) -> Result<Pod, SessionError> {
    let status = reason.terminal_status();
    pod.status = status;
    pod.termination_reason = Some(reason);
    if pod.stopped_epoch_ms.is_none() {
        pod.stopped_epoch_ms = Some(clock.epoch_ms());
    }
    store.put_pod(pod.clone()).await?;
    let action = match status {
        PodStatus::Failed => PodHistoryAction::Failed { reason },
        PodStatus::Evicted => PodHistoryAction::Evicted { reason },
        _ => PodHistoryAction::Stopped { reason },
    };
    store.append_pod_history(PodHistoryEntry::new(pod.id, pod.service_id, action, clock.epoch_ms())).await?;
    Ok(pod)
}

#[cfg(test)]
#[path = "pod_store_tests.rs"]
mod tests;
