// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs for the admin HTTP surface: summary/detail split per resource kind,
//! mirroring the teacher's `JobSummary`/`JobDetail` convention.

use std::collections::HashMap;

use orc_core::{
    ApiError, NodeId, NodeStatus, PackId, PodId, PodStatus, RuntimeKind, ServiceId, ServiceKind,
    ServiceStatus, TerminationReason, Visibility,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub runtime_kind: RuntimeKind,
    pub status: NodeStatus,
    pub unschedulable: bool,
    pub pod_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDetail {
    pub id: NodeId,
    pub name: String,
    pub runtime_kind: RuntimeKind,
    pub status: NodeStatus,
    pub unschedulable: bool,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub allocatable_cpu_millis: u64,
    pub allocatable_memory_mb: u64,
    pub allocated_cpu_millis: u64,
    pub allocated_memory_mb: u64,
    pub last_heartbeat_ms: u64,
    pub pod_ids: Vec<PodId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PodSummary {
    pub id: PodId,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    pub status: PodStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
    pub incarnation: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PodDetail {
    #[serde(flatten)]
    pub summary: PodSummary,
    pub pack_id: PackId,
    pub pack_version: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub created_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_epoch_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSummary {
    pub id: ServiceId,
    pub namespace: String,
    pub name: String,
    pub kind: ServiceKind,
    pub pack_version: String,
    pub replicas: u32,
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub summary: ServiceSummary,
    pub pack_id: PackId,
    pub max_unavailable: u32,
    pub current_incarnation: u64,
    pub crash_loop_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_pack_version: Option<String>,
    pub pod_ids: Vec<PodId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackSummary {
    pub id: PackId,
    pub namespace: String,
    pub name: String,
    pub visibility: Visibility,
    pub latest_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackDetail {
    #[serde(flatten)]
    pub summary: PackSummary,
    pub versions: Vec<String>,
}

/// Body for `POST /v1/namespaces/{ns}/services`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateServiceRequest {
    pub name: String,
    pub kind: ServiceKind,
    pub pack_id: PackId,
    pub pack_version: String,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default)]
    pub node_selector_labels: HashMap<String, String>,
    #[serde(default)]
    pub max_unavailable: Option<u32>,
}

fn default_replicas() -> u32 {
    1
}

/// Body for `PATCH /v1/namespaces/{ns}/services/{name}` — a rolling update
/// or a replica-count change, never both in the same call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateServiceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
}

/// Body for `PATCH /v1/nodes/{id}` — cordon/uncordon is the only admin
/// mutation nodes support; nodes otherwise register themselves over the
/// session protocol (§4.2), not the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateNodeRequest {
    pub unschedulable: bool,
}

/// Body for `POST /v1/namespaces/{ns}/packs`, publishing the pack's first
/// version. Later versions are appended with `AddPackVersionRequest`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePackRequest {
    pub name: String,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
    pub version: String,
    pub digest: String,
    pub compatible_runtimes: Vec<RuntimeKind>,
    #[serde(default)]
    pub min_runtime_version: Option<String>,
}

fn default_visibility() -> Visibility {
    Visibility::Private
}

/// Body for `POST /v1/namespaces/{ns}/packs/{name}/versions`, appending a
/// new immutable version to an existing pack (§3's "versions, newest
/// last, never rewritten in place").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddPackVersionRequest {
    pub version: String,
    pub digest: String,
    pub compatible_runtimes: Vec<RuntimeKind>,
    #[serde(default)]
    pub min_runtime_version: Option<String>,
}

/// Standard envelope for a fallible admin API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AdminResult<T> {
    Ok(T),
    Err { error: ApiError },
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
