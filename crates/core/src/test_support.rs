// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::namespace::Namespace;
use crate::node::{Node, NodeStatus, RuntimeKind};
use crate::pack::{Pack, PackMetadata, Visibility};
use crate::pod::{Pod, PodStatus};
use crate::service::{Service, ServiceKind, ServiceStatus};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::node::NodeStatus;
    use crate::pod::{PodStatus, TerminationReason};
    use crate::service::{ServiceKind, ServiceStatus};
    use proptest::prelude::*;

    pub fn arb_node_status() -> impl Strategy<Value = NodeStatus> {
        prop_oneof![Just(NodeStatus::Online), Just(NodeStatus::Suspect), Just(NodeStatus::Offline),]
    }

    pub fn arb_pod_status() -> impl Strategy<Value = PodStatus> {
        prop_oneof![
            Just(PodStatus::Pending),
            Just(PodStatus::Scheduled),
            Just(PodStatus::Starting),
            Just(PodStatus::Running),
            Just(PodStatus::Stopping),
            Just(PodStatus::Stopped),
            Just(PodStatus::Failed),
            Just(PodStatus::Evicted),
            Just(PodStatus::Unknown),
        ]
    }

    pub fn arb_termination_reason() -> impl Strategy<Value = TerminationReason> {
        prop_oneof![
            Just(TerminationReason::Error),
            Just(TerminationReason::Oom),
            Just(TerminationReason::Crash),
            Just(TerminationReason::ExitNonZero),
            Just(TerminationReason::Timeout),
            Just(TerminationReason::NodeLost),
            Just(TerminationReason::EvictedResources),
            Just(TerminationReason::Preempted),
            Just(TerminationReason::ServiceScaleDown),
            Just(TerminationReason::AdminStop),
            Just(TerminationReason::RollingUpdate),
            Just(TerminationReason::StalePod),
        ]
    }

    pub fn arb_service_kind() -> impl Strategy<Value = ServiceKind> {
        prop_oneof![Just(ServiceKind::Replica), Just(ServiceKind::DaemonSet)]
    }

    pub fn arb_service_status() -> impl Strategy<Value = ServiceStatus> {
        prop_oneof![Just(ServiceStatus::Progressing), Just(ServiceStatus::Stable), Just(ServiceStatus::Degraded),]
    }
}

// ── Factory functions ────────────────────────────────────────────────────

/// An online node with generous default capacity, ready for scheduling.
pub fn online_node(name: &str) -> Node {
    Node::builder().name(name).status(NodeStatus::Online).build()
}

pub fn offline_node(name: &str) -> Node {
    Node::builder().name(name).status(NodeStatus::Offline).build()
}

/// A pack with a single published version.
pub fn pack_with_version(name: &str, version: &str) -> Pack {
    Pack::builder()
        .name(name)
        .visibility(Visibility::Private)
        .versions(vec![PackMetadata {
            version: version.to_string(),
            digest: format!("sha256:{name}:{version}"),
            compatible_runtimes: vec![RuntimeKind::Process],
            min_runtime_version: None,
            created_epoch_ms: 1_000_000,
        }])
        .build()
}

/// A replica service targeting the given pack version.
pub fn replica_service(name: &str, pack_version: &str, replicas: u32) -> Service {
    Service::builder()
        .name(name)
        .pack_version(pack_version)
        .kind(ServiceKind::Replica)
        .replicas(replicas)
        .status(ServiceStatus::Progressing)
        .build()
}

/// A daemon-set service targeting the given pack version.
pub fn daemon_set_service(name: &str, pack_version: &str) -> Service {
    Service::builder()
        .name(name)
        .pack_version(pack_version)
        .kind(ServiceKind::DaemonSet)
        .status(ServiceStatus::Progressing)
        .build()
}

/// A running pod bound to the given node, on the given incarnation.
pub fn running_pod(node_id: crate::node::NodeId, incarnation: u64) -> Pod {
    Pod::builder().node_id(node_id).incarnation(incarnation).status(PodStatus::Running).build()
}

pub fn default_namespace() -> Namespace {
    Namespace::default()
}
