// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orphan/stale pod recovery on reconnect (§4.7).
//!
//! Grounded on the teacher's `lifecycle::reconcile` (diffing persisted job
//! state against what the daemon's supervisor actually has running after a
//! restart, and reissuing the corrective action for every mismatch rather
//! than trusting either side blindly), adapted from a single-process
//! restart to a node's `node:reconnect` report.

use std::collections::HashSet;

use orc_core::{Clock, NodeId, PodId, PodStatus, TerminationReason};
use orc_store::Store;
use orc_wire::OrchestratorMessage;
use tracing::{info, warn};

use crate::error::SessionError;
use crate::pod_store;
use crate::registry::ConnectionRegistry;

/// Reconciles a reconnecting node's reported-running pod set against the
/// store's view of what should be running there.
///
/// - A pod the store has active on this node but the node didn't report is
///   an **orphan**: the node lost it without telling us (crashed between
///   heartbeats, process killed out of band). Marked `node_lost` so the
///   next reconciler tick schedules a replacement.
/// - A pod the node reports running that the store doesn't currently
///   assign to this node (already reassigned elsewhere, or scaled down
///   while the node was offline) is **stale**: told to stop, never
///   adopted, since `incarnation` fencing means a later instance already
///   owns the slot (§8 property 2).
///
/// Returns whether any corrective action was taken, so the caller can
/// decide whether to nudge the reconciler immediately.
pub async fn reconcile_reconnect(
    store: &dyn Store,
    clock: &dyn Clock,
    registry: &ConnectionRegistry,
    node_id: NodeId,
    reported_running: &[PodId],
) -> Result<bool, SessionError> {
    let stored = store.list_pods_for_node(&node_id).await?;
    let reported: HashSet<PodId> = reported_running.iter().copied().collect();

    let mut acted = false;

    for pod in stored {
        if pod.is_terminal() || pod.status == PodStatus::Stopping {
            continue;
        }
        if !reported.contains(&pod.id) {
            warn!(pod_id = %pod.id, node_id = %node_id, "orphaned pod not reported by reconnecting node, marking node_lost");
            pod_store::mark_stopped(store, clock, pod, TerminationReason::NodeLost).await?;
            acted = true;
        }
    }

    for pod_id in reported_running {
        match store.get_pod(pod_id).await? {
            Some(pod) if pod.node_id == Some(node_id) && !pod.is_terminal() => {
                // Legitimately this node's pod; leave it for the normal
                // status-report path to reconcile started/running state.
            }
            _ => {
                info!(pod_id = %pod_id, node_id = %node_id, "stale pod instance reported by reconnecting node, requesting stop");
                registry.send_to_node(
                    &node_id,
                    OrchestratorMessage::StopPod {
                        pod_id: *pod_id,
                        reason: TerminationReason::StalePod,
                        message: Some("stale pod instance".to_string()),
                    },
                );
                acted = true;
            }
        }
    }

    Ok(acted)
}

#[cfg(test)]
#[path = "orphan_tests.rs"]
mod tests;
