// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Store` trait: typed CRUD the orchestrator depends on, kept
//! external to the core and the control plane so the persistence backend
//! (in-memory for tests, Postgres in production) can vary independently.

use async_trait::async_trait;
use orc_core::{
    Namespace, Node, NodeId, Pack, PackId, Pod, PodHistoryEntry, PodId, Service, ServiceId,
};

use crate::error::StoreResult;

/// A typed, transactional key-value store over the orchestrator's durable
/// entities. Every write is expected to be atomic from the caller's point of
/// view; the orchestrator never assumes partial writes are visible.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn put_node(&self, node: Node) -> StoreResult<()>;
    async fn get_node(&self, id: &NodeId) -> StoreResult<Option<Node>>;
    /// Nodes are cluster-scoped (not namespaced), so lookup by name alone.
    async fn get_node_by_name(&self, name: &str) -> StoreResult<Option<Node>>;
    async fn list_nodes(&self) -> StoreResult<Vec<Node>>;
    async fn delete_node(&self, id: &NodeId) -> StoreResult<()>;

    async fn put_service(&self, service: Service) -> StoreResult<()>;
    async fn get_service(&self, id: &ServiceId) -> StoreResult<Option<Service>>;
    async fn get_service_by_name(
        &self,
        namespace: &Namespace,
        name: &str,
    ) -> StoreResult<Option<Service>>;
    async fn list_services(&self, namespace: &Namespace) -> StoreResult<Vec<Service>>;
    /// Every service across every namespace, for the reconciler's tick scan
    /// (§4.5), which is not scoped to a single caller's namespace.
    async fn list_all_services(&self) -> StoreResult<Vec<Service>>;
    async fn delete_service(&self, id: &ServiceId) -> StoreResult<()>;

    async fn put_pod(&self, pod: Pod) -> StoreResult<()>;
    async fn get_pod(&self, id: &PodId) -> StoreResult<Option<Pod>>;
    async fn list_pods_for_service(&self, service_id: &ServiceId) -> StoreResult<Vec<Pod>>;
    async fn list_pods_for_node(&self, node_id: &NodeId) -> StoreResult<Vec<Pod>>;
    async fn delete_pod(&self, id: &PodId) -> StoreResult<()>;

    async fn put_pack(&self, pack: Pack) -> StoreResult<()>;
    async fn get_pack(&self, id: &PackId) -> StoreResult<Option<Pack>>;
    async fn get_pack_by_name(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<Pack>>;
    async fn list_packs(&self, namespace: &Namespace) -> StoreResult<Vec<Pack>>;

    async fn append_pod_history(&self, entry: PodHistoryEntry) -> StoreResult<()>;
    async fn pod_history(&self, pod_id: &PodId) -> StoreResult<Vec<PodHistoryEntry>>;
}
