// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-service convergence (§4.5): the part of the reconciler that turns
//! one service's spec into pod placements. Follows the teacher's
//! `ReplicaSetController::reconcile_namespace` shape (compute desired vs.
//! current, create/stop the delta, then recompute observed status) from
//! the replicaset controller reference, generalized with the crash-loop/
//! rollback and rolling-update steps `reconcile_namespace` doesn't have.

use std::collections::{HashMap, HashSet};

use orc_core::{
    Clock, Node, NodeId, Pod, PodHistoryAction, PodHistoryEntry, PodId, PodStatus, Service,
    ServiceId, ServiceStatus, TerminationReason,
};
use orc_store::Store;
use orc_wire::OrchestratorMessage;
use parking_lot::Mutex;
use tracing::warn;

use crate::error::ReconcileError;
use crate::pod_store;
use crate::registry::ConnectionRegistry;
use crate::scheduler;

/// Tunables driving crash-loop detection and backoff (§4.5.1, §6 config).
#[derive(Debug, Clone, Copy)]
pub struct ReconcileConfig {
    pub max_consecutive_failures: u32,
    pub failure_window_ms: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// Ephemeral per-service bookkeeping of which failed pods have already
/// been counted toward `crash_loop_count`, so re-running detection on a
/// stable input doesn't double-count (§8 property 4, idempotent ticks).
/// Never business state — lost on restart like the connection registry
/// and lease timers (§5's shared-resource policy).
pub type CountedFailures = Mutex<HashMap<ServiceId, HashSet<PodId>>>;

/// Runs the full per-service convergence pass described by §4.5 steps
/// 2-6 against one service, persisting the updated spec/status and
/// returning it. Never returns an error for conditions the next tick can
/// repair (missing pack, no eligible node); those are logged and skipped.
pub async fn converge_service(
    store: &dyn Store,
    clock: &dyn Clock,
    registry: &ConnectionRegistry,
    cfg: &ReconcileConfig,
    counted: &CountedFailures,
    mut service: Service,
) -> Result<Service, ReconcileError> {
    if service.follow_latest {
        resolve_follow_latest(store, clock, &mut service).await?;
    }

    let mut pods = store.list_pods_for_service(&service.id).await?;

    run_crash_loop_detection(clock, cfg, counted, &mut service, &pods);

    if service.status == ServiceStatus::Degraded {
        store.put_service(service.clone()).await?;
        return Ok(service);
    }

    rolling_update_step(store, clock, registry, &service, &pods).await?;
    pods = store.list_pods_for_service(&service.id).await?;

    let active: Vec<&Pod> = pods.iter().filter(|p| !p.is_terminal()).collect();

    if service.is_daemon_set() {
        daemon_set_reconcile(store, clock, registry, &service, &active).await?;
    } else {
        replica_reconcile(store, clock, registry, &service, &active).await?;
    }

    let pods = store.list_pods_for_service(&service.id).await?;
    recompute_status(&mut service, &pods);
    store.put_service(service.clone()).await?;
    Ok(service)
}

fn default_pod_labels(service: &Service) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert("service-owner".to_string(), service.name.clone());
    labels.insert("service-id".to_string(), service.id.to_string());
    labels
}

/// §4.5 step 2: for `followLatest` services, resolve the pack's latest
/// published version and fold it into the spec, recording the prior
/// version as a rollback target if it was serving traffic. Suppressed
/// while a crash-loop backoff window is in effect for the same target
/// version (§4.5.1's "followLatest upgrades are suppressed").
async fn resolve_follow_latest(
    store: &dyn Store,
    clock: &dyn Clock,
    service: &mut Service,
) -> Result<(), ReconcileError> {
    let Some(pack) = store.get_pack(&service.pack_id).await? else { return Ok(()) };
    let Some(latest) = pack.latest_version() else { return Ok(()) };
    if latest.version == service.pack_version {
        return Ok(());
    }
    let now = clock.epoch_ms();
    if let Some(until) = service.failure_backoff_until_ms {
        if now < until && service.failed_version.as_deref() == Some(latest.version.as_str()) {
            return Ok(());
        }
    }
    let pods = store.list_pods_for_service(&service.id).await?;
    if pods.iter().any(|p| p.status == PodStatus::Running) {
        service.last_successful_version = Some(service.pack_version.clone());
    }
    service.pack_version = latest.version.clone();
    service.current_incarnation += 1;
    Ok(())
}

/// §4.5.1: crash-loop detection and auto-rollback/pause.
fn run_crash_loop_detection(
    clock: &dyn Clock,
    cfg: &ReconcileConfig,
    counted: &CountedFailures,
    service: &mut Service,
    pods: &[Pod],
) {
    let now = clock.epoch_ms();
    let running = pods.iter().filter(|p| p.status == PodStatus::Running).count();

    if running == 0 {
        let window_start = now.saturating_sub(cfg.failure_window_ms);
        let failed_app: HashSet<PodId> = pods
            .iter()
            .filter(|p| {
                p.status == PodStatus::Failed
                    && p.termination_reason.map(|r| r.is_application()).unwrap_or(false)
                    && p.stopped_epoch_ms.map(|t| t >= window_start).unwrap_or(false)
            })
            .map(|p| p.id)
            .collect();
        let mut map = counted.lock();
        let prev = map.entry(service.id).or_default();
        let new_failures = failed_app.difference(prev).count() as u32;
        *prev = failed_app;
        drop(map);
        if new_failures > 0 {
            service.crash_loop_count += new_failures;
        }
    } else if pods.iter().any(|p| p.status == PodStatus::Running && p.pack_version == service.pack_version) {
        service.crash_loop_count = 0;
        service.last_successful_version = Some(service.pack_version.clone());
        counted.lock().remove(&service.id);
    }

    if service.crash_loop_count < cfg.max_consecutive_failures {
        return;
    }

    let backoff_ms = backoff_for(cfg.initial_backoff_ms, cfg.max_backoff_ms, service.crash_loop_count);
    match service.last_successful_version.clone() {
        Some(last) if last != service.pack_version => {
            service.failed_version = Some(service.pack_version.clone());
            service.pack_version = last;
            service.crash_loop_count = 0;
            service.failure_backoff_until_ms = Some(now + backoff_ms);
            service.current_incarnation += 1;
            counted.lock().remove(&service.id);
        }
        _ => {
            service.status = ServiceStatus::Degraded;
            service.failure_backoff_until_ms = Some(now + backoff_ms);
        }
    }
}

/// `backoff = min(initial * 2^(n-1), max)` (§4.5.1).
fn backoff_for(initial_ms: u64, max_ms: u64, n: u32) -> u64 {
    let shift = n.saturating_sub(1).min(63);
    let mult = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
    initial_ms.saturating_mul(mult).min(max_ms)
}

/// Marks outdated pods `stopping` up to `max_unavailable` per tick (§9 open
/// question 2's max-unavailable guard) and pushes `pod:stop` to any that
/// are already deployed to a node.
async fn rolling_update_step(
    store: &dyn Store,
    clock: &dyn Clock,
    registry: &ConnectionRegistry,
    service: &Service,
    pods: &[Pod],
) -> Result<(), ReconcileError> {
    let already_stopping = pods.iter().filter(|p| p.status == PodStatus::Stopping).count();
    let budget = (service.max_unavailable as usize).saturating_sub(already_stopping);
    if budget == 0 {
        return Ok(());
    }
    let outdated: Vec<&Pod> = pods
        .iter()
        .filter(|p| p.status == PodStatus::Running && p.pack_version != service.pack_version)
        .collect();

    for pod in outdated.into_iter().take(budget) {
        let node_id = pod.node_id;
        let pod_id = pod.id;
        let service_id = pod.service_id;
        pod_store::mark_stopping(store, clock, pod.clone()).await?;
        store
            .append_pod_history(PodHistoryEntry::new(pod_id, service_id, PodHistoryAction::Updated, clock.epoch_ms()))
            .await?;
        if let Some(node_id) = node_id {
            send_stop(registry, node_id, pod_id, TerminationReason::RollingUpdate, "rolling update");
        }
    }
    Ok(())
}

fn send_stop(registry: &ConnectionRegistry, node_id: NodeId, pod_id: PodId, reason: TerminationReason, why: &str) {
    if !registry.send_to_node(&node_id, OrchestratorMessage::StopPod { pod_id, reason, message: Some(why.to_string()) })
    {
        warn!(pod_id = %pod_id, node_id = %node_id, reason = %why, "pod:stop send failed, reconciler retries next tick");
    }
}

fn send_deploy(registry: &ConnectionRegistry, node_id: NodeId, pod: &Pod) {
    if !registry.send_to_node(
        &node_id,
        OrchestratorMessage::DeployPod {
            pod_id: pod.id,
            service_id: pod.service_id,
            pack_id: pod.pack_id,
            pack_version: pod.pack_version.clone(),
            incarnation: pod.incarnation,
        },
    ) {
        warn!(pod_id = %pod.id, node_id = %node_id, "pod:deploy send failed, pod stays pending for next tick");
    }
}

/// §4.5.2: one pod per eligible node, replacements created (never removed)
/// on nodes that fall out of eligibility.
async fn daemon_set_reconcile(
    store: &dyn Store,
    clock: &dyn Clock,
    registry: &ConnectionRegistry,
    service: &Service,
    active: &[&Pod],
) -> Result<(), ReconcileError> {
    let Some(pack) = store.get_pack(&service.pack_id).await? else {
        warn!(service_id = %service.id, "daemonset reconcile: pack not found");
        return Ok(());
    };
    let Some(pack_version) = pack.version(&service.pack_version) else {
        warn!(service_id = %service.id, version = %service.pack_version, "daemonset reconcile: pack version not found");
        return Ok(());
    };
    let nodes = store.list_nodes().await?;
    let eligible = scheduler::eligible_nodes(&nodes, service, &pack, pack_version);

    let covered: HashSet<NodeId> = active.iter().filter_map(|p| p.node_id).collect();
    for node in eligible {
        if covered.contains(&node.id) {
            continue;
        }
        let incarnation = pod_store::next_incarnation(store, &service.id).await?;
        let spec = pod_store::NewPodSpec {
            namespace: service.namespace.clone(),
            service_id: Some(service.id),
            pack_id: service.pack_id,
            pack_version: service.pack_version.clone(),
            node_id: Some(node.id),
            incarnation,
            labels: default_pod_labels(service),
        };
        let pod = pod_store::create_pod(store, clock, spec).await?;
        send_deploy(registry, node.id, &pod);
    }
    Ok(())
}

/// §4.5.3: create or stop pods until `current == replicas`. New pods are
/// pre-bound to the least-loaded eligible node with spare capacity at
/// creation time (§9 open question 1); a pod created with no eligible
/// node is left unassigned and retried on a later tick.
async fn replica_reconcile(
    store: &dyn Store,
    clock: &dyn Clock,
    registry: &ConnectionRegistry,
    service: &Service,
    active: &[&Pod],
) -> Result<(), ReconcileError> {
    let desired = service.replicas as usize;
    let current = active.len();

    if current < desired {
        let to_create = desired - current;
        let nodes = store.list_nodes().await?;
        let pack = store.get_pack(&service.pack_id).await?;
        let mut working_nodes: Vec<Node> = match &pack {
            Some(pack) => match pack.version(&service.pack_version) {
                Some(meta) => scheduler::eligible_nodes(&nodes, service, pack, meta).into_iter().cloned().collect(),
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        for _ in 0..to_create {
            let picked = {
                let refs: Vec<&Node> = working_nodes.iter().collect();
                scheduler::pick_least_loaded(&refs, service).map(|n| n.id)
            };
            if let Some(id) = picked {
                if let Some(n) = working_nodes.iter_mut().find(|n| n.id == id) {
                    n.allocated = n.allocated.saturating_add(&service.resource_request);
                }
            }
            let incarnation = pod_store::next_incarnation(store, &service.id).await?;
            let spec = pod_store::NewPodSpec {
                namespace: service.namespace.clone(),
                service_id: Some(service.id),
                pack_id: service.pack_id,
                pack_version: service.pack_version.clone(),
                node_id: picked,
                incarnation,
                labels: default_pod_labels(service),
            };
            let pod = pod_store::create_pod(store, clock, spec).await?;
            if let Some(node_id) = pod.node_id {
                send_deploy(registry, node_id, &pod);
            }
        }
    } else if current > desired {
        let already_stopping = active.iter().filter(|p| p.status == PodStatus::Stopping).count();
        let to_stop = (current - desired).saturating_sub(already_stopping);
        let candidates: Vec<&&Pod> = active.iter().filter(|p| p.status != PodStatus::Stopping).collect();

        for pod in candidates.into_iter().take(to_stop) {
            let pod = (*pod).clone();
            if pod.status == PodStatus::Pending && pod.node_id.is_none() {
                pod_store::mark_stopped(store, clock, pod, TerminationReason::ServiceScaleDown).await?;
                continue;
            }
            let node_id = pod.node_id;
            let pod_id = pod.id;
            pod_store::mark_stopping(store, clock, pod).await?;
            if let Some(node_id) = node_id {
                send_stop(registry, node_id, pod_id, TerminationReason::ServiceScaleDown, "service scale down");
            }
        }
    }
    Ok(())
}

/// Recomputes the service's coarse observed status. Not persisted as
/// separate ready/available/total counters (§4.5 step 6) — the admin
/// surface derives those live from the pod set, the same source of truth
/// this function reads, rather than caching a value that could drift.
fn recompute_status(service: &mut Service, pods: &[Pod]) {
    if service.status == ServiceStatus::Degraded {
        return;
    }
    if service.is_daemon_set() {
        // "Stable" has no fixed target without re-running eligibility;
        // DaemonSet services stay Progressing between ticks that actually
        // converge the node set.
        service.status = ServiceStatus::Progressing;
        return;
    }
    let unsettled = pods.iter().any(|p| matches!(p.status, PodStatus::Pending | PodStatus::Stopping));
    let ready = pods.iter().filter(|p| p.status == PodStatus::Running && p.pack_version == service.pack_version).count() as u32;
    service.status = if !unsettled && ready >= service.replicas {
        ServiceStatus::Stable
    } else {
        ServiceStatus::Progressing
    };
}

#[cfg(test)]
#[path = "convergence_tests.rs"]
mod tests;
