// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persistent node<->orchestrator session protocol: registration,
//! reconnection, heartbeats, pod lifecycle reporting, and the commands the
//! orchestrator pushes back down the same connection.

use std::collections::HashMap;

use orc_core::{
    Incarnation, NodeCapabilities, NodeId, OwnerId, PackId, PodId, RuntimeKind, ServiceId, Taint,
    TerminationReason,
};
use serde::{Deserialize, Serialize};

/// Messages sent from a node up to the orchestrator over its session connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum NodeMessage {
    /// First message on a brand-new connection, registering a node that has
    /// never connected before (or is re-registering under the same name).
    Register {
        name: String,
        owner: OwnerId,
        runtime_kind: RuntimeKind,
        capabilities: NodeCapabilities,
        #[serde(default)]
        labels: HashMap<String, String>,
        #[serde(default)]
        annotations: HashMap<String, String>,
        #[serde(default)]
        taints: Vec<Taint>,
        allocatable_cpu_millis: u64,
        allocatable_memory_mb: u64,
    },
    /// Resuming a session for a node that already has an assigned `NodeId`,
    /// carrying the set of pods the node believes it is still running so
    /// the orchestrator can reconcile against its own record (§4.7).
    /// `owner` must match the node's recorded owner; otherwise the caller
    /// is not the original registerer and the reconnect is rejected (§4.2).
    Reconnect {
        node_id: NodeId,
        owner: OwnerId,
        known_pod_ids: Vec<PodId>,
    },
    /// Periodic liveness signal; resets the node's lease.
    Heartbeat {
        node_id: NodeId,
        epoch_ms: u64,
    },
    /// The node's observed status for one pod changed. `incarnation` is
    /// checked against the stored pod's incarnation (§4.4); a mismatch is
    /// rejected with `STALE_INCARNATION` and the message has no effect.
    PodStatusReport {
        node_id: NodeId,
        pod_id: PodId,
        incarnation: Incarnation,
        status: PodRuntimeStatus,
    },
    /// Graceful disconnect notice (best-effort; the lease mechanism is the
    /// authority of record if this never arrives).
    Goodbye {
        node_id: NodeId,
    },
}

/// The subset of pod lifecycle states a node actually reports; `Pending` is
/// never reported since it is an orchestrator-side-only state before a pod
/// has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum PodRuntimeStatus {
    Running,
    Stopped { reason: TerminationReason },
}

/// Messages sent from the orchestrator down to a node over its session connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OrchestratorMessage {
    /// Registration/reconnect accepted; carries the durable `NodeId` to use
    /// in subsequent messages (equal to the one sent on `Reconnect`).
    Welcome {
        node_id: NodeId,
        heartbeat_interval_ms: u64,
    },
    /// Registration/reconnect rejected (e.g. name collision under a
    /// different owner, incompatible runtime kind).
    Rejected {
        reason: String,
    },
    /// Dispatch a pod for the node to start running.
    DeployPod {
        pod_id: PodId,
        service_id: Option<ServiceId>,
        pack_id: PackId,
        pack_version: String,
        incarnation: Incarnation,
    },
    /// Ask the node to stop a pod it is running.
    StopPod {
        pod_id: PodId,
        reason: TerminationReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

#[cfg(test)]
#[path = "node_protocol_tests.rs"]
mod tests;
