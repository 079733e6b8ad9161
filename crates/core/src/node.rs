// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node identity, capabilities, and connection/health status.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::owner::OwnerId;
use crate::resource::ResourceQuantities;
use crate::taint::Taint;

crate::define_id! {
    /// Unique identifier for a node.
    pub struct NodeId("nod-");
}

/// Closed set of runtime kinds a node (and a pack) can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeKind {
    Process,
    Browser,
}

crate::simple_display! {
    RuntimeKind {
        Process => "process",
        Browser => "browser",
    }
}

/// Connection/health status of a node (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Online,
    Suspect,
    Offline,
}

crate::simple_display! {
    NodeStatus {
        Online => "online",
        Suspect => "suspect",
        Offline => "offline",
    }
}

/// Capabilities a node reports at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCapabilities {
    /// Semver-ish runtime version string (e.g. "1.4.2").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    /// Additional compatible runtime kinds beyond the node's primary kind.
    #[serde(default)]
    pub compatible_runtimes: Vec<RuntimeKind>,
}

/// A registered node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub runtime_kind: RuntimeKind,
    pub capabilities: NodeCapabilities,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub taints: Vec<Taint>,
    pub allocatable: ResourceQuantities,
    #[serde(default)]
    pub allocated: ResourceQuantities,
    pub status: NodeStatus,
    /// Session owning this node's connection, if any. Invariant: non-null
    /// only while `status == Online`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    /// Whether the node accepts new pod placements (set by admin, not by health).
    #[serde(default)]
    pub unschedulable: bool,
    /// User who first registered this node; re-registration under the same
    /// name requires matching ownership.
    pub owner: OwnerId,
    pub last_heartbeat_ms: u64,
}

impl Node {
    /// Remaining allocatable capacity.
    pub fn spare_capacity(&self) -> ResourceQuantities {
        self.allocatable.saturating_sub(&self.allocated)
    }

    pub fn is_eligible_base(&self) -> bool {
        self.status == NodeStatus::Online && !self.unschedulable
    }
}

crate::builder! {
    pub struct NodeBuilder => Node {
        into {
            name: String = "n1",
        }
        set {
            capabilities: NodeCapabilities = NodeCapabilities::default(),
            labels: HashMap<String, String> = HashMap::new(),
            annotations: HashMap<String, String> = HashMap::new(),
            taints: Vec<Taint> = Vec::new(),
            allocatable: ResourceQuantities = ResourceQuantities::new(4000, 8192),
            allocated: ResourceQuantities = ResourceQuantities::default(),
            status: NodeStatus = NodeStatus::Online,
            unschedulable: bool = false,
            runtime_kind: RuntimeKind = RuntimeKind::Process,
            owner: OwnerId = OwnerId::new("test-user"),
            last_heartbeat_ms: u64 = 0,
        }
        option {
            connection_id: String = None,
        }
        computed {
            id: NodeId = NodeId::new(),
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
