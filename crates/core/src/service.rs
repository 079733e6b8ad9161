// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Services: desired-state controllers over a set of pods running one pack.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::namespace::Namespace;
use crate::owner::OwnerId;
use crate::pack::PackId;
use crate::resource::ResourceQuantities;
use crate::taint::Toleration;

crate::define_id! {
    /// Unique identifier for a service.
    pub struct ServiceId("svc-");
}

/// Scheduling constraint narrowing which nodes a service's pods may land on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSelector {
    /// Labels that must all be present (with matching values) on a node.
    #[serde(default)]
    pub match_labels: HashMap<String, String>,
}

impl NodeSelector {
    pub fn matches(&self, node_labels: &HashMap<String, String>) -> bool {
        self.match_labels.iter().all(|(k, v)| node_labels.get(k) == Some(v))
    }
}

/// Replication strategy for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// A fixed `replicas` count, scheduled anywhere eligible.
    Replica,
    /// Exactly one pod per eligible node (`replicas` is ignored and treated
    /// as "one per eligible node").
    DaemonSet,
}

crate::simple_display! {
    ServiceKind {
        Replica => "replica",
        DaemonSet => "daemon_set",
    }
}

/// Observed rollout status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Pods are being created or updated toward the desired spec.
    Progressing,
    /// All desired pods are running the current pack version.
    Stable,
    /// Crash-loop detection tripped and the service was rolled back.
    Degraded,
}

crate::simple_display! {
    ServiceStatus {
        Progressing => "progressing",
        Stable => "stable",
        Degraded => "degraded",
    }
}

/// A service: desired state for a set of pods running one pack version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub namespace: Namespace,
    pub name: String,
    pub owner: OwnerId,
    pub kind: ServiceKind,
    pub pack_id: PackId,
    pub pack_version: String,
    /// Desired replica count. Ignored (treated as "one per eligible node")
    /// when `kind == DaemonSet`.
    pub replicas: u32,
    #[serde(default)]
    pub node_selector: NodeSelector,
    #[serde(default)]
    pub tolerations: Vec<Toleration>,
    #[serde(default)]
    pub resource_request: ResourceQuantities,
    /// Maximum number of pods that may be simultaneously unavailable during
    /// a rolling update. Defaults to 1 (redesigned from the distilled spec,
    /// see DESIGN.md).
    #[serde(default = "default_max_unavailable")]
    pub max_unavailable: u32,
    pub status: ServiceStatus,
    /// Current generation incremented on every spec-affecting update
    /// (pack_version, replicas, node_selector, ...); pods are stamped with
    /// the incarnation that produced them so rollouts can tell old from new.
    pub current_incarnation: u64,
    /// Consecutive application-attributable pod failures observed for the
    /// current incarnation; reset on a successful rollout or rollback.
    #[serde(default)]
    pub crash_loop_count: u32,
    /// Pack version to roll back to if crash-loop detection trips, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_pack_version: Option<String>,
    /// When true, the reconciler resolves the pack's latest published
    /// version each tick and rolls the service forward automatically.
    #[serde(default)]
    pub follow_latest: bool,
    /// Most recent pack version this service ran with at least one running
    /// pod. Rollback target for crash-loop detection (§4.5.1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_version: Option<String>,
    /// Version crash-loop detection most recently rolled back away from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_version: Option<String>,
    /// Epoch-ms before which `follow_latest` upgrades toward `failed_version`
    /// are suppressed, set by the backoff computed in §4.5.1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_backoff_until_ms: Option<u64>,
}

fn default_max_unavailable() -> u32 {
    1
}

impl Service {
    pub fn is_daemon_set(&self) -> bool {
        self.kind == ServiceKind::DaemonSet
    }
}

crate::builder! {
    pub struct ServiceBuilder => Service {
        into {
            name: String = "demo-service",
            pack_version: String = "1.0.0",
        }
        set {
            namespace: Namespace = Namespace::default(),
            owner: OwnerId = OwnerId::new("test-user"),
            kind: ServiceKind = ServiceKind::Replica,
            pack_id: PackId = PackId::new(),
            replicas: u32 = 1,
            node_selector: NodeSelector = NodeSelector::default(),
            tolerations: Vec<Toleration> = Vec::new(),
            resource_request: ResourceQuantities = ResourceQuantities::default(),
            max_unavailable: u32 = 1,
            status: ServiceStatus = ServiceStatus::Progressing,
            current_incarnation: u64 = 1,
            crash_loop_count: u32 = 0,
            follow_latest: bool = false,
        }
        option {
            rollback_pack_version: String = None,
            last_successful_version: String = None,
            failed_version: String = None,
            failure_backoff_until_ms: u64 = None,
        }
        computed {
            id: ServiceId = ServiceId::new(),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
