// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Postgres-backed `Store`.
//!
//! Each entity kind is stored as a JSONB blob keyed by its ID, with the
//! columns the trait actually queries by (name, namespace, owning service/
//! node) pulled out alongside it so lookups don't require scanning and
//! deserializing every row.

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use orc_core::{
    Namespace, Node, NodeId, Pack, PackId, Pod, PodHistoryEntry, PodId, Service, ServiceId,
};
use tokio_postgres::NoTls;

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// Connection settings for the Postgres backend.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
}

impl PostgresConfig {
    pub async fn create_pool(self) -> StoreResult<Pool> {
        let mut cfg = PoolConfig::new();
        cfg.host = Some(self.host);
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname);
        cfg.user = Some(self.user);
        cfg.password = self.password;
        cfg.manager = Some(ManagerConfig { recycling_method: RecyclingMethod::Fast });
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// A `Store` backed by a Postgres connection pool.
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create the tables this store expects, if they don't already exist.
    /// Intended for local development and tests; production deployments
    /// should run migrations out of band.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS nodes (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    data JSONB NOT NULL
                );

                CREATE TABLE IF NOT EXISTS services (
                    id TEXT PRIMARY KEY,
                    namespace TEXT NOT NULL,
                    name TEXT NOT NULL,
                    data JSONB NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS services_namespace_name_idx
                    ON services (namespace, name);

                CREATE TABLE IF NOT EXISTS pods (
                    id TEXT PRIMARY KEY,
                    service_id TEXT,
                    node_id TEXT,
                    data JSONB NOT NULL
                );
                CREATE INDEX IF NOT EXISTS pods_service_id_idx ON pods (service_id);
                CREATE INDEX IF NOT EXISTS pods_node_id_idx ON pods (node_id);

                CREATE TABLE IF NOT EXISTS packs (
                    id TEXT PRIMARY KEY,
                    namespace TEXT NOT NULL,
                    name TEXT NOT NULL,
                    data JSONB NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS packs_namespace_name_idx
                    ON packs (namespace, name);

                CREATE TABLE IF NOT EXISTS pod_history (
                    pod_id TEXT NOT NULL,
                    seq BIGSERIAL NOT NULL,
                    data JSONB NOT NULL,
                    PRIMARY KEY (pod_id, seq)
                );
                "#,
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn put_node(&self, node: Node) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let data = serde_json::to_value(&node)?;
        client
            .execute(
                "INSERT INTO nodes (id, name, data) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, name = EXCLUDED.name",
                &[&node.id.as_str(), &node.name, &data],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StoreResult<Option<Node>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt("SELECT data FROM nodes WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn get_node_by_name(&self, name: &str) -> StoreResult<Option<Node>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt("SELECT data FROM nodes WHERE name = $1", &[&name])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn list_nodes(&self) -> StoreResult<Vec<Node>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query("SELECT data FROM nodes", &[])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        client
            .execute("DELETE FROM nodes WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn put_service(&self, service: Service) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let data = serde_json::to_value(&service)?;
        client
            .execute(
                "INSERT INTO services (id, namespace, name, data) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
                &[&service.id.as_str(), &service.namespace.as_str(), &service.name, &data],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_service(&self, id: &ServiceId) -> StoreResult<Option<Service>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt("SELECT data FROM services WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn get_service_by_name(
        &self,
        namespace: &Namespace,
        name: &str,
    ) -> StoreResult<Option<Service>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt(
                "SELECT data FROM services WHERE namespace = $1 AND name = $2",
                &[&namespace.as_str(), &name],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn list_services(&self, namespace: &Namespace) -> StoreResult<Vec<Service>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query("SELECT data FROM services WHERE namespace = $1", &[&namespace.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn list_all_services(&self) -> StoreResult<Vec<Service>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query("SELECT data FROM services", &[])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn delete_service(&self, id: &ServiceId) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        client
            .execute("DELETE FROM services WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn put_pod(&self, pod: Pod) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let data = serde_json::to_value(&pod)?;
        let service_id = pod.service_id.as_ref().map(|s| s.as_str().to_string());
        let node_id = pod.node_id.as_ref().map(|n| n.as_str().to_string());
        client
            .execute(
                "INSERT INTO pods (id, service_id, node_id, data) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, service_id = EXCLUDED.service_id, node_id = EXCLUDED.node_id",
                &[&pod.id.as_str(), &service_id, &node_id, &data],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_pod(&self, id: &PodId) -> StoreResult<Option<Pod>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt("SELECT data FROM pods WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn list_pods_for_service(&self, service_id: &ServiceId) -> StoreResult<Vec<Pod>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query("SELECT data FROM pods WHERE service_id = $1", &[&service_id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn list_pods_for_node(&self, node_id: &NodeId) -> StoreResult<Vec<Pod>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query("SELECT data FROM pods WHERE node_id = $1", &[&node_id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn delete_pod(&self, id: &PodId) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        client
            .execute("DELETE FROM pods WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn put_pack(&self, pack: Pack) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let data = serde_json::to_value(&pack)?;
        client
            .execute(
                "INSERT INTO packs (id, namespace, name, data) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
                &[&pack.id.as_str(), &pack.namespace.as_str(), &pack.name, &data],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_pack(&self, id: &PackId) -> StoreResult<Option<Pack>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt("SELECT data FROM packs WHERE id = $1", &[&id.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn get_pack_by_name(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<Pack>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let row = client
            .query_opt(
                "SELECT data FROM packs WHERE namespace = $1 AND name = $2",
                &[&namespace.as_str(), &name],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(|r| {
            let data: serde_json::Value = r.get(0);
            serde_json::from_value(data).map_err(StoreError::from)
        })
        .transpose()
    }

    async fn list_packs(&self, namespace: &Namespace) -> StoreResult<Vec<Pack>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query("SELECT data FROM packs WHERE namespace = $1", &[&namespace.as_str()])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn append_pod_history(&self, entry: PodHistoryEntry) -> StoreResult<()> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let data = serde_json::to_value(&entry)?;
        client
            .execute(
                "INSERT INTO pod_history (pod_id, data) VALUES ($1, $2)",
                &[&entry.pod_id.as_str(), &data],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn pod_history(&self, pod_id: &PodId) -> StoreResult<Vec<PodHistoryEntry>> {
        let client = self.pool.get().await.map_err(|e| StoreError::Backend(e.to_string()))?;
        let rows = client
            .query(
                "SELECT data FROM pod_history WHERE pod_id = $1 ORDER BY seq ASC",
                &[&pod_id.as_str()],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|r| {
                let data: serde_json::Value = r.get(0);
                serde_json::from_value(data).map_err(StoreError::from)
            })
            .collect()
    }
}
