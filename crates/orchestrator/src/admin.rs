// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin HTTP surface (§4.8, §6): list/get/create/update/delete for
//! {nodes, services, pods, packs} plus `POST /v1/reconcile/trigger`,
//! gated by the same bearer token the node session protocol uses.
//!
//! Grounded on the teacher's job-query HTTP handlers
//! (`crates/daemon/src/listener/http.rs`-style summary/detail split,
//! `AdminResult` mirroring its `JsonEnvelope`) built on `axum`, generalized
//! from one resource kind (jobs) to the four the control plane manages.
//! Namespaces are not a separate resource here: `Namespace` (§3) is a thin
//! user-chosen string scoping services/pods/packs, not a stored entity, so
//! there is no `/v1/namespaces` collection to manage — only the `{ns}` path
//! segment scoping the resources that do carry a namespace.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use orc_core::{
    ApiError, Clock, ErrorCode, Namespace, Node, NodeId, OwnerId, Pack, PackId, PackMetadata,
    Service, ServiceId, ServiceKind,
};
use orc_store::Store;
use orc_wire::{
    AddPackVersionRequest, AdminResult, CreatePackRequest, CreateServiceRequest, NodeDetail,
    NodeSummary, PackDetail, PackSummary, PodDetail, PodSummary, ServiceDetail, ServiceSummary,
    UpdateNodeRequest, UpdateServiceRequest,
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::SessionError;
use crate::pod_store;
use crate::registry::ConnectionRegistry;

/// Shared state handed to every handler. `trigger_reconcile` is a plain
/// closure rather than holding `Reconciler<C>` directly so this module
/// stays generic-free (the binary wires the concrete clock at startup).
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn Store>,
    pub registry: ConnectionRegistry,
    pub auth_token: Option<String>,
    pub trigger_reconcile: Arc<dyn Fn() + Send + Sync>,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/v1/nodes", get(list_nodes))
        .route("/v1/nodes/:id", get(get_node).patch(update_node).delete(delete_node))
        .route("/v1/namespaces/:ns/services", get(list_services).post(create_service))
        .route(
            "/v1/namespaces/:ns/services/:name",
            get(get_service).patch(update_service).delete(delete_service),
        )
        .route("/v1/namespaces/:ns/pods", get(list_pods))
        .route("/v1/namespaces/:ns/pods/:id", get(get_pod).delete(stop_pod))
        .route("/v1/namespaces/:ns/packs", get(list_packs).post(create_pack))
        .route("/v1/namespaces/:ns/packs/:name", get(get_pack))
        .route("/v1/namespaces/:ns/packs/:name/versions", post(add_pack_version))
        .route("/v1/reconcile/trigger", post(trigger_reconcile))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

async fn require_auth(
    State(state): State<AdminState>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let Some(expected) = &state.auth_token else {
        return next.run(request).await;
    };
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if provided == Some(expected.as_str()) {
        next.run(request).await
    } else {
        err_response(StatusCode::UNAUTHORIZED, ApiError::new(ErrorCode::Unauthorized, "missing or invalid bearer token"))
    }
}

fn ok_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(AdminResult::Ok(body))).into_response()
}

fn err_response(status: StatusCode, error: ApiError) -> Response {
    (status, Json(AdminResult::<()>::Err { error })).into_response()
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict | ErrorCode::StaleIncarnation => StatusCode::CONFLICT,
        ErrorCode::SendFailed | ErrorCode::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_err(e: orc_store::StoreError) -> Response {
    let api: ApiError = match e {
        orc_store::StoreError::NotFound(m) => ApiError::new(ErrorCode::NotFound, m),
        orc_store::StoreError::Conflict(m) => ApiError::new(ErrorCode::Conflict, m),
        _ => ApiError::new(ErrorCode::InternalError, "store error"),
    };
    err_response(status_for(api.code), api)
}

fn session_err(e: SessionError) -> Response {
    let api: ApiError = (&e).into();
    err_response(status_for(api.code), api)
}

// ── Nodes (cluster-scoped, never namespaced — §4.6's eligibility is
// cluster-wide) ───────────────────────────────────────────────────────────

fn node_summary(node: &Node, pod_count: usize) -> NodeSummary {
    NodeSummary {
        id: node.id,
        name: node.name.clone(),
        runtime_kind: node.runtime_kind,
        status: node.status,
        unschedulable: node.unschedulable,
        pod_count,
    }
}

async fn list_nodes(State(state): State<AdminState>) -> Response {
    let nodes = match state.store.list_nodes().await {
        Ok(n) => n,
        Err(e) => return store_err(e),
    };
    let mut summaries = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let count = state.store.list_pods_for_node(&node.id).await.map(|p| p.len()).unwrap_or(0);
        summaries.push(node_summary(node, count));
    }
    ok_response(StatusCode::OK, summaries)
}

async fn get_node(State(state): State<AdminState>, Path(id): Path<String>) -> Response {
    let node_id = NodeId::from_string(id);
    match state.store.get_node(&node_id).await {
        Ok(Some(node)) => {
            let pods = state.store.list_pods_for_node(&node.id).await.unwrap_or_default();
            let detail = NodeDetail {
                id: node.id,
                name: node.name.clone(),
                runtime_kind: node.runtime_kind,
                status: node.status,
                unschedulable: node.unschedulable,
                labels: node.labels.clone(),
                allocatable_cpu_millis: node.allocatable.cpu_millis,
                allocatable_memory_mb: node.allocatable.memory_mb,
                allocated_cpu_millis: node.allocated.cpu_millis,
                allocated_memory_mb: node.allocated.memory_mb,
                last_heartbeat_ms: node.last_heartbeat_ms,
                pod_ids: pods.iter().map(|p| p.id).collect(),
            };
            ok_response(StatusCode::OK, detail)
        }
        Ok(None) => err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("node {node_id}"))),
        Err(e) => store_err(e),
    }
}

async fn update_node(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNodeRequest>,
) -> Response {
    let node_id = NodeId::from_string(id);
    match state.store.get_node(&node_id).await {
        Ok(Some(mut node)) => {
            node.unschedulable = req.unschedulable;
            if let Err(e) = state.store.put_node(node).await {
                return store_err(e);
            }
            (state.trigger_reconcile)();
            ok_response(StatusCode::OK, ())
        }
        Ok(None) => err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("node {node_id}"))),
        Err(e) => store_err(e),
    }
}

async fn delete_node(State(state): State<AdminState>, Path(id): Path<String>) -> Response {
    let node_id = NodeId::from_string(id);
    if let Err(e) = state.store.delete_node(&node_id).await {
        return store_err(e);
    }
    (state.trigger_reconcile)();
    ok_response(StatusCode::OK, ())
}

// ── Services ───────────────────────────────────────────────────────────

fn service_summary(service: &Service) -> ServiceSummary {
    ServiceSummary {
        id: service.id,
        namespace: service.namespace.to_string(),
        name: service.name.clone(),
        kind: service.kind,
        pack_version: service.pack_version.clone(),
        replicas: service.replicas,
        status: service.status,
    }
}

async fn list_services(State(state): State<AdminState>, Path(ns): Path<String>) -> Response {
    let namespace = Namespace::new(ns);
    match state.store.list_services(&namespace).await {
        Ok(services) => ok_response(StatusCode::OK, services.iter().map(service_summary).collect::<Vec<_>>()),
        Err(e) => store_err(e),
    }
}

async fn service_detail(store: &dyn Store, service: &Service) -> Result<ServiceDetail, orc_store::StoreError> {
    let pods = store.list_pods_for_service(&service.id).await?;
    Ok(ServiceDetail {
        summary: service_summary(service),
        pack_id: service.pack_id,
        max_unavailable: service.max_unavailable,
        current_incarnation: service.current_incarnation,
        crash_loop_count: service.crash_loop_count,
        rollback_pack_version: service.rollback_pack_version.clone(),
        pod_ids: pods.iter().map(|p| p.id).collect(),
    })
}

async fn get_service(State(state): State<AdminState>, Path((ns, name)): Path<(String, String)>) -> Response {
    let namespace = Namespace::new(ns);
    match state.store.get_service_by_name(&namespace, &name).await {
        Ok(Some(service)) => match service_detail(state.store.as_ref(), &service).await {
            Ok(detail) => ok_response(StatusCode::OK, detail),
            Err(e) => store_err(e),
        },
        Ok(None) => err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("service {name}"))),
        Err(e) => store_err(e),
    }
}

async fn create_service(
    State(state): State<AdminState>,
    Path(ns): Path<String>,
    Json(req): Json<CreateServiceRequest>,
) -> Response {
    let namespace = Namespace::new(ns);
    if let Ok(Some(_)) = state.store.get_service_by_name(&namespace, &req.name).await {
        return err_response(
            StatusCode::CONFLICT,
            ApiError::conflict(format!("service {} already exists", req.name)),
        );
    }
    let mut node_selector = orc_core::NodeSelector::default();
    node_selector.match_labels = req.node_selector_labels;
    let service = Service {
        id: ServiceId::new(),
        namespace,
        name: req.name,
        owner: OwnerId::new("admin"),
        kind: req.kind,
        pack_id: req.pack_id,
        pack_version: req.pack_version,
        replicas: if req.kind == ServiceKind::DaemonSet { 0 } else { req.replicas },
        node_selector,
        tolerations: Vec::new(),
        resource_request: orc_core::ResourceQuantities::default(),
        max_unavailable: req.max_unavailable.unwrap_or(1),
        status: orc_core::ServiceStatus::Progressing,
        current_incarnation: 1,
        crash_loop_count: 0,
        rollback_pack_version: None,
        follow_latest: false,
        last_successful_version: None,
        failed_version: None,
        failure_backoff_until_ms: None,
    };
    if let Err(e) = state.store.put_service(service.clone()).await {
        return store_err(e);
    }
    (state.trigger_reconcile)();
    match service_detail(state.store.as_ref(), &service).await {
        Ok(detail) => ok_response(StatusCode::CREATED, detail),
        Err(e) => store_err(e),
    }
}

async fn update_service(
    State(state): State<AdminState>,
    Path((ns, name)): Path<(String, String)>,
    Json(req): Json<UpdateServiceRequest>,
) -> Response {
    let namespace = Namespace::new(ns);
    let mut service = match state.store.get_service_by_name(&namespace, &name).await {
        Ok(Some(s)) => s,
        Ok(None) => return err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("service {name}"))),
        Err(e) => return store_err(e),
    };
    if req.pack_version.is_some() && req.replicas.is_some() {
        return err_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation("a rolling update and a replica change cannot be combined", "pack_version", "mutually exclusive with replicas"),
        );
    }
    if let Some(version) = req.pack_version {
        if version != service.pack_version {
            service.pack_version = version;
            service.current_incarnation += 1;
            service.crash_loop_count = 0;
            service.status = orc_core::ServiceStatus::Progressing;
        }
    }
    if let Some(replicas) = req.replicas {
        service.replicas = replicas;
        service.status = orc_core::ServiceStatus::Progressing;
    }
    if let Err(e) = state.store.put_service(service.clone()).await {
        return store_err(e);
    }
    (state.trigger_reconcile)();
    match service_detail(state.store.as_ref(), &service).await {
        Ok(detail) => ok_response(StatusCode::OK, detail),
        Err(e) => store_err(e),
    }
}

async fn delete_service(State(state): State<AdminState>, Path((ns, name)): Path<(String, String)>) -> Response {
    let namespace = Namespace::new(ns);
    let service = match state.store.get_service_by_name(&namespace, &name).await {
        Ok(Some(s)) => s,
        Ok(None) => return err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("service {name}"))),
        Err(e) => return store_err(e),
    };
    if let Err(e) = state.store.delete_service(&service.id).await {
        return store_err(e);
    }
    (state.trigger_reconcile)();
    ok_response(StatusCode::OK, ())
}

// ── Pods (read-only plus a force-stop; pods are otherwise created and
// retired entirely by the reconciler, §4.5) ───────────────────────────────

fn pod_summary(pod: &orc_core::Pod) -> PodSummary {
    PodSummary {
        id: pod.id,
        namespace: pod.namespace.to_string(),
        service_id: pod.service_id,
        node_id: pod.node_id,
        status: pod.status,
        termination_reason: pod.termination_reason,
        incarnation: pod.incarnation,
    }
}

async fn list_pods(State(state): State<AdminState>, Path(ns): Path<String>) -> Response {
    let namespace = Namespace::new(ns);
    let services = match state.store.list_services(&namespace).await {
        Ok(s) => s,
        Err(e) => return store_err(e),
    };
    let mut pods = Vec::new();
    for service in services {
        match state.store.list_pods_for_service(&service.id).await {
            Ok(p) => pods.extend(p),
            Err(e) => return store_err(e),
        }
    }
    ok_response(StatusCode::OK, pods.iter().map(pod_summary).collect::<Vec<_>>())
}

async fn get_pod(State(state): State<AdminState>, Path((_ns, id)): Path<(String, String)>) -> Response {
    let pod_id = orc_core::PodId::from_string(id);
    match state.store.get_pod(&pod_id).await {
        Ok(Some(pod)) => {
            let detail = PodDetail {
                summary: pod_summary(&pod),
                pack_id: pod.pack_id,
                pack_version: pod.pack_version.clone(),
                labels: pod.labels.clone(),
                created_epoch_ms: pod.created_epoch_ms,
                started_epoch_ms: pod.started_epoch_ms,
                stopped_epoch_ms: pod.stopped_epoch_ms,
            };
            ok_response(StatusCode::OK, detail)
        }
        Ok(None) => err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("pod {pod_id}"))),
        Err(e) => store_err(e),
    }
}

/// `DELETE /v1/namespaces/{ns}/pods/{id}`: an administrative force-stop,
/// not a deletion — the pod row stays for history until its service
/// retires it.
async fn stop_pod(
    State(state): State<AdminState>,
    Path((_ns, id)): Path<(String, String)>,
) -> Response {
    let pod_id = orc_core::PodId::from_string(id);
    let pod = match state.store.get_pod(&pod_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("pod {pod_id}"))),
        Err(e) => return store_err(e),
    };
    if pod.is_terminal() {
        return ok_response(StatusCode::OK, ());
    }
    let node_id = pod.node_id;
    let clock = orc_core::SystemClock;
    let result = pod_store::mark_stopping(state.store.as_ref(), &clock, pod).await;
    match result {
        Ok(_) => {
            if let Some(node_id) = node_id {
                use orc_wire::OrchestratorMessage;
                let sent = state.registry.send_to_node(
                    &node_id,
                    OrchestratorMessage::StopPod {
                        pod_id,
                        reason: orc_core::TerminationReason::AdminStop,
                        message: Some("admin requested stop".to_string()),
                    },
                );
                if !sent {
                    warn!(pod_id = %pod_id, node_id = %node_id, "admin stop request queued but node is not connected");
                }
            }
            (state.trigger_reconcile)();
            ok_response(StatusCode::OK, ())
        }
        Err(e) => session_err(e),
    }
}

// ── Packs ──────────────────────────────────────────────────────────────

fn pack_summary(pack: &Pack) -> PackSummary {
    PackSummary {
        id: pack.id,
        namespace: pack.namespace.to_string(),
        name: pack.name.clone(),
        visibility: pack.visibility,
        latest_version: pack.latest_version().map(|v| v.version.clone()),
    }
}

async fn list_packs(State(state): State<AdminState>, Path(ns): Path<String>) -> Response {
    let namespace = Namespace::new(ns);
    match state.store.list_packs(&namespace).await {
        Ok(packs) => ok_response(StatusCode::OK, packs.iter().map(pack_summary).collect::<Vec<_>>()),
        Err(e) => store_err(e),
    }
}

async fn get_pack(State(state): State<AdminState>, Path((ns, name)): Path<(String, String)>) -> Response {
    let namespace = Namespace::new(ns);
    match state.store.get_pack_by_name(&namespace, &name).await {
        Ok(Some(pack)) => {
            let detail = PackDetail {
                summary: pack_summary(&pack),
                versions: pack.versions.iter().map(|v| v.version.clone()).collect(),
            };
            ok_response(StatusCode::OK, detail)
        }
        Ok(None) => err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("pack {name}"))),
        Err(e) => store_err(e),
    }
}

async fn create_pack(
    State(state): State<AdminState>,
    Path(ns): Path<String>,
    Json(req): Json<CreatePackRequest>,
) -> Response {
    let namespace = Namespace::new(ns);
    if let Ok(Some(_)) = state.store.get_pack_by_name(&namespace, &req.name).await {
        return err_response(StatusCode::CONFLICT, ApiError::conflict(format!("pack {} already exists", req.name)));
    }
    let pack = Pack {
        id: PackId::new(),
        namespace,
        name: req.name,
        owner: OwnerId::new("admin"),
        visibility: req.visibility,
        labels: Default::default(),
        versions: vec![PackMetadata {
            version: req.version,
            digest: req.digest,
            compatible_runtimes: req.compatible_runtimes,
            min_runtime_version: req.min_runtime_version,
            created_epoch_ms: orc_core::SystemClock.epoch_ms(),
        }],
    };
    if let Err(e) = state.store.put_pack(pack.clone()).await {
        return store_err(e);
    }
    ok_response(StatusCode::CREATED, pack_summary(&pack))
}

async fn add_pack_version(
    State(state): State<AdminState>,
    Path((ns, name)): Path<(String, String)>,
    Json(req): Json<AddPackVersionRequest>,
) -> Response {
    let namespace = Namespace::new(ns);
    let mut pack = match state.store.get_pack_by_name(&namespace, &name).await {
        Ok(Some(p)) => p,
        Ok(None) => return err_response(StatusCode::NOT_FOUND, ApiError::not_found(format!("pack {name}"))),
        Err(e) => return store_err(e),
    };
    if pack.version(&req.version).is_some() {
        return err_response(
            StatusCode::CONFLICT,
            ApiError::conflict(format!("pack {name} already has version {}", req.version)),
        );
    }
    pack.versions.push(PackMetadata {
        version: req.version,
        digest: req.digest,
        compatible_runtimes: req.compatible_runtimes,
        min_runtime_version: req.min_runtime_version,
        created_epoch_ms: orc_core::SystemClock.epoch_ms(),
    });
    if let Err(e) = state.store.put_pack(pack.clone()).await {
        return store_err(e);
    }
    ok_response(StatusCode::CREATED, pack_summary(&pack))
}

// ── Reconcile trigger ──────────────────────────────────────────────────

async fn trigger_reconcile(State(state): State<AdminState>) -> Response {
    (state.trigger_reconcile)();
    ok_response(StatusCode::ACCEPTED, ())
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
