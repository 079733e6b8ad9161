// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `Store` implementation: a materialized projection of the
//! orchestrator's entities keyed by ID, guarded by a single mutex.
//!
//! Intended for tests and single-process development; not durable across
//! restarts.

use std::collections::HashMap;

use async_trait::async_trait;
use orc_core::{
    Namespace, Node, NodeId, Pack, PackId, Pod, PodHistoryEntry, PodId, Service, ServiceId,
};
use parking_lot::Mutex;

use crate::error::StoreResult;
use crate::store::Store;

#[derive(Default)]
struct Tables {
    nodes: HashMap<NodeId, Node>,
    services: HashMap<ServiceId, Service>,
    pods: HashMap<PodId, Pod>,
    packs: HashMap<PackId, Pack>,
    pod_history: HashMap<PodId, Vec<PodHistoryEntry>>,
}

/// An in-memory, process-local `Store`.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn put_node(&self, node: Node) -> StoreResult<()> {
        self.tables.lock().nodes.insert(node.id, node);
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StoreResult<Option<Node>> {
        Ok(self.tables.lock().nodes.get(id).cloned())
    }

    async fn get_node_by_name(&self, name: &str) -> StoreResult<Option<Node>> {
        Ok(self.tables.lock().nodes.values().find(|n| n.name == name).cloned())
    }

    async fn list_nodes(&self) -> StoreResult<Vec<Node>> {
        Ok(self.tables.lock().nodes.values().cloned().collect())
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        self.tables.lock().nodes.remove(id);
        Ok(())
    }

    async fn put_service(&self, service: Service) -> StoreResult<()> {
        self.tables.lock().services.insert(service.id, service);
        Ok(())
    }

    async fn get_service(&self, id: &ServiceId) -> StoreResult<Option<Service>> {
        Ok(self.tables.lock().services.get(id).cloned())
    }

    async fn get_service_by_name(
        &self,
        namespace: &Namespace,
        name: &str,
    ) -> StoreResult<Option<Service>> {
        Ok(self
            .tables
            .lock()
            .services
            .values()
            .find(|s| &s.namespace == namespace && s.name == name)
            .cloned())
    }

    async fn list_services(&self, namespace: &Namespace) -> StoreResult<Vec<Service>> {
        Ok(self.tables.lock().services.values().filter(|s| &s.namespace == namespace).cloned().collect())
    }

    async fn list_all_services(&self) -> StoreResult<Vec<Service>> {
        Ok(self.tables.lock().services.values().cloned().collect())
    }

    async fn delete_service(&self, id: &ServiceId) -> StoreResult<()> {
        self.tables.lock().services.remove(id);
        Ok(())
    }

    async fn put_pod(&self, pod: Pod) -> StoreResult<()> {
        self.tables.lock().pods.insert(pod.id, pod);
        Ok(())
    }

    async fn get_pod(&self, id: &PodId) -> StoreResult<Option<Pod>> {
        Ok(self.tables.lock().pods.get(id).cloned())
    }

    async fn list_pods_for_service(&self, service_id: &ServiceId) -> StoreResult<Vec<Pod>> {
        Ok(self
            .tables
            .lock()
            .pods
            .values()
            .filter(|p| p.service_id.as_ref() == Some(service_id))
            .cloned()
            .collect())
    }

    async fn list_pods_for_node(&self, node_id: &NodeId) -> StoreResult<Vec<Pod>> {
        Ok(self
            .tables
            .lock()
            .pods
            .values()
            .filter(|p| p.node_id.as_ref() == Some(node_id))
            .cloned()
            .collect())
    }

    async fn delete_pod(&self, id: &PodId) -> StoreResult<()> {
        self.tables.lock().pods.remove(id);
        Ok(())
    }

    async fn put_pack(&self, pack: Pack) -> StoreResult<()> {
        self.tables.lock().packs.insert(pack.id, pack);
        Ok(())
    }

    async fn get_pack(&self, id: &PackId) -> StoreResult<Option<Pack>> {
        Ok(self.tables.lock().packs.get(id).cloned())
    }

    async fn get_pack_by_name(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<Pack>> {
        Ok(self
            .tables
            .lock()
            .packs
            .values()
            .find(|p| &p.namespace == namespace && p.name == name)
            .cloned())
    }

    async fn list_packs(&self, namespace: &Namespace) -> StoreResult<Vec<Pack>> {
        Ok(self.tables.lock().packs.values().filter(|p| &p.namespace == namespace).cloned().collect())
    }

    async fn append_pod_history(&self, entry: PodHistoryEntry) -> StoreResult<()> {
        self.tables.lock().pod_history.entry(entry.pod_id).or_default().push(entry);
        Ok(())
    }

    async fn pod_history(&self, pod_id: &PodId) -> StoreResult<Vec<PodHistoryEntry>> {
        Ok(self.tables.lock().pod_history.get(pod_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
