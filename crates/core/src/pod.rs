// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pods: a single running (or once-running) instance of a pack on a node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::namespace::Namespace;
use crate::node::NodeId;
use crate::pack::PackId;
use crate::service::ServiceId;

crate::define_id! {
    /// Unique identifier for a pod.
    pub struct PodId("pod-");
}

/// Monotonic generation counter, scoped to a single service, bumped each
/// time the service's controller creates a replacement pod.
pub type Incarnation = u64;

/// Lifecycle status of a pod (§3's closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodStatus {
    /// Created, not yet bound to a node (§9 open question 1) or bound but
    /// not yet dispatched.
    Pending,
    /// Bound to a node and dispatched; not yet acknowledged starting.
    Scheduled,
    /// Node has accepted the deploy and is bringing the pack up.
    Starting,
    Running,
    /// Controller has asked the node to stop the pod.
    Stopping,
    /// Terminated gracefully (scale-down, rolling update, admin stop).
    Stopped,
    /// Terminated abnormally (application error or node loss).
    Failed,
    /// Terminated by scheduler action (resource pressure, preemption).
    Evicted,
    /// Node-reported status the orchestrator can't classify.
    Unknown,
}

crate::simple_display! {
    PodStatus {
        Pending => "pending",
        Scheduled => "scheduled",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Failed => "failed",
        Evicted => "evicted",
        Unknown => "unknown",
    }
}

/// Why a pod stopped, from §4.4's closed set. Distinguishes failures
/// attributable to the application from ones attributable to
/// infrastructure, since only the former count toward crash-loop
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Non-zero exit or runtime error while running.
    Error,
    /// Killed by the node's out-of-memory handling.
    Oom,
    /// Process/runtime crashed (signal, panic, unhandled fault).
    Crash,
    /// Exited with a non-zero status without otherwise erroring.
    ExitNonZero,
    /// Exceeded a node- or pack-defined execution deadline.
    Timeout,
    /// Node went offline, connection dropped, or the pod was never
    /// acknowledged before the node disappeared.
    NodeLost,
    /// Evicted by the scheduler under resource pressure.
    EvictedResources,
    /// Evicted to make room for a higher-priority pod.
    Preempted,
    /// Stopped because the owning service's replica count decreased.
    ServiceScaleDown,
    /// Stopped by an explicit admin request.
    AdminStop,
    /// Stopped because a rolling update superseded this pod's version.
    RollingUpdate,
    /// Stopped as a duplicate instance left over from a reassignment
    /// during a node disconnect (§4.7).
    StalePod,
}

impl TerminationReason {
    /// Whether this reason reflects application behavior, and therefore
    /// should count toward a service's crash-loop counter (§4.4).
    pub fn is_application(&self) -> bool {
        matches!(
            self,
            TerminationReason::Error
                | TerminationReason::Oom
                | TerminationReason::Crash
                | TerminationReason::ExitNonZero
                | TerminationReason::Timeout
        )
    }

    /// Whether this reason reflects infrastructure/control-plane action
    /// rather than the application itself.
    pub fn is_infrastructure(&self) -> bool {
        !self.is_application()
    }

    /// The terminal [`PodStatus`] this reason resolves to (§3's
    /// `terminationReason` set iff `status ∈ {stopped, failed, evicted}`
    /// invariant). `NodeLost` resolves to `Failed` even though it is an
    /// infrastructure reason, matching the lease-expiry scenario.
    pub fn terminal_status(&self) -> PodStatus {
        match self {
            TerminationReason::Error
            | TerminationReason::Oom
            | TerminationReason::Crash
            | TerminationReason::ExitNonZero
            | TerminationReason::Timeout
            | TerminationReason::NodeLost => PodStatus::Failed,
            TerminationReason::EvictedResources | TerminationReason::Preempted => PodStatus::Evicted,
            TerminationReason::ServiceScaleDown
            | TerminationReason::AdminStop
            | TerminationReason::RollingUpdate
            | TerminationReason::StalePod => PodStatus::Stopped,
        }
    }
}

crate::simple_display! {
    TerminationReason {
        Error => "error",
        Oom => "oom",
        Crash => "crash",
        ExitNonZero => "exit_non_zero",
        Timeout => "timeout",
        NodeLost => "node_lost",
        EvictedResources => "evicted_resources",
        Preempted => "preempted",
        ServiceScaleDown => "service_scale_down",
        AdminStop => "admin_stop",
        RollingUpdate => "rolling_update",
        StalePod => "stale_pod",
    }
}

/// A single pod instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub id: PodId,
    pub namespace: Namespace,
    /// Service that owns this pod, if any; unowned pods are standalone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    pub pack_id: PackId,
    pub pack_version: String,
    /// Node this pod is bound to. `None` until the scheduler finds an
    /// eligible node with spare capacity (§9 open question 1); a pod
    /// created unassigned is retried by the reconciler on later ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    pub incarnation: Incarnation,
    pub status: PodStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub created_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_epoch_ms: Option<u64>,
}

impl Pod {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, PodStatus::Stopped | PodStatus::Failed | PodStatus::Evicted)
    }

    /// Whether this pod counts as "available" for rolling-update purposes.
    pub fn is_available(&self) -> bool {
        self.status == PodStatus::Running
    }

    pub fn is_assigned(&self) -> bool {
        self.node_id.is_some()
    }
}

crate::builder! {
    pub struct PodBuilder => Pod {
        into {
            pack_version: String = "1.0.0",
        }
        set {
            namespace: Namespace = Namespace::default(),
            pack_id: PackId = PackId::new(),
            incarnation: Incarnation = 1,
            status: PodStatus = PodStatus::Pending,
            labels: HashMap<String, String> = HashMap::new(),
            created_epoch_ms: u64 = 0,
        }
        option {
            service_id: ServiceId = None,
            node_id: NodeId = None,
            termination_reason: TerminationReason = None,
            started_epoch_ms: u64 = None,
            stopped_epoch_ms: u64 = None,
        }
        computed {
            id: PodId = PodId::new(),
        }
    }
}

#[cfg(test)]
#[path = "pod_tests.rs"]
mod tests;
