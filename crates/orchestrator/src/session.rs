// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node session transport (§4.1-§4.4, §4.7): an axum WebSocket endpoint
//! carrying [`NodeMessage`]/[`OrchestratorMessage`] frames, one connection
//! per node.
//!
//! Grounded on the teacher's `RuntimeAdapter` connection loop
//! (`crates/adapters/src/ws.rs`-style split-socket read/write tasks feeding
//! a per-connection outbound queue), generalized from "one browser runtime
//! adapter" to "any node, process or browser-kind" — which is also why this
//! runs over WebSocket rather than a raw length-delimited socket
//! ([`orc_wire::frame`]'s codec): a browser-kind node can only open a
//! WebSocket, never a bare TCP/Unix stream, so the session transport has to
//! be the lowest common denominator. WS's own frame boundaries carry one
//! [`orc_wire::encode`]d JSON payload per message; the length-delimited
//! codec is for transports (Unix sockets, the in-memory test channel) that
//! don't already frame for us.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use orc_core::{Clock, Node, NodeId, NodeStatus, OwnerId, Taint};
use orc_store::Store;
use orc_wire::{decode, encode, NodeMessage, OrchestratorMessage, PodRuntimeStatus};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::SessionError;
use crate::lease::LeaseWatcher;
use crate::orphan;
use crate::pod_store;
use crate::registry::ConnectionRegistry;

/// Tunables for the session transport, mirroring [`crate::convergence::ReconcileConfig`]'s
/// "binary reads env, module takes a plain struct" split.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub heartbeat_interval_ms: u64,
    /// How long the transport tolerates silence from a node before closing
    /// the socket itself, ahead of the lease watcher's own sweep (§4.3).
    /// A node sending heartbeats on schedule never approaches this.
    pub frame_read_timeout: Duration,
}

#[derive(Clone)]
pub struct SessionState<C: Clock> {
    pub store: Arc<dyn Store>,
    pub registry: ConnectionRegistry,
    pub lease: Arc<LeaseWatcher<C>>,
    pub clock: C,
    pub cfg: SessionConfig,
    pub auth_token: Option<String>,
    pub trigger_reconcile: Arc<dyn Fn() + Send + Sync>,
}

#[derive(Debug, Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

pub fn router<C: Clock + 'static>(state: SessionState<C>) -> Router {
    Router::new().route("/v1/session", get(ws_handler::<C>)).with_state(state)
}

fn authorized<C: Clock>(state: &SessionState<C>, headers: &HeaderMap, query: &AuthQuery) -> bool {
    let Some(expected) = &state.auth_token else {
        return true;
    };
    let header_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    header_token == Some(expected.as_str()) || query.token.as_deref() == Some(expected.as_str())
}

async fn ws_handler<C: Clock + 'static>(
    State(state): State<SessionState<C>>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !authorized(&state, &headers, &query) {
        return Response::builder()
            .status(axum::http::StatusCode::UNAUTHORIZED)
            .body(axum::body::Body::empty())
            .expect("static response is well-formed");
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket<C: Clock + 'static>(socket: WebSocket, state: SessionState<C>) {
    let (session_id, mut outbound_rx) = state.registry.register();
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let payload = match encode(&message) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "failed to encode outbound session message");
                    continue;
                }
            };
            if sink.send(Message::Binary(payload)).await.is_err() {
                break;
            }
        }
    });

    loop {
        let next = tokio::time::timeout(state.cfg.frame_read_timeout, stream.next()).await;
        let message = match next {
            Ok(Some(Ok(message))) => message,
            Ok(Some(Err(e))) => {
                warn!(session_id = %session_id, error = %e, "session read error, closing");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                warn!(session_id = %session_id, "session silent past read timeout, closing");
                break;
            }
        };
        let payload = match message {
            Message::Binary(bytes) => bytes,
            Message::Text(text) => text.into_bytes(),
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => continue,
        };
        let node_message: NodeMessage = match decode(&payload) {
            Ok(m) => m,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "malformed session frame, ignoring");
                continue;
            }
        };
        if let Some(reply) = handle_node_message(&state, session_id, node_message).await {
            state.registry.send_to_session(session_id, reply);
        }
    }

    writer.abort();
    if let Some(node_id) = state.registry.unregister(session_id) {
        info!(session_id = %session_id, node_id = %node_id, "session closed");
    }
}

/// Handles one inbound frame, mutating store/registry state as needed and
/// returning an immediate reply to send back down the same session, if any.
async fn handle_node_message<C: Clock>(
    state: &SessionState<C>,
    session_id: crate::registry::SessionId,
    message: NodeMessage,
) -> Option<OrchestratorMessage> {
    match message {
        NodeMessage::Register {
            name,
            owner,
            runtime_kind,
            capabilities,
            labels,
            annotations,
            taints,
            allocatable_cpu_millis,
            allocatable_memory_mb,
        } => {
            Some(
                handle_register(
                    state,
                    session_id,
                    name,
                    owner,
                    runtime_kind,
                    capabilities,
                    labels,
                    annotations,
                    taints,
                    allocatable_cpu_millis,
                    allocatable_memory_mb,
                )
                .await,
            )
        }
        NodeMessage::Reconnect { node_id, owner, known_pod_ids } => {
            Some(handle_reconnect(state, session_id, node_id, owner, known_pod_ids).await)
        }
        NodeMessage::Heartbeat { node_id, .. } => {
            handle_heartbeat(state, session_id, node_id).await;
            None
        }
        NodeMessage::PodStatusReport { node_id, pod_id, incarnation, status } => {
            handle_pod_status_report(state, node_id, pod_id, incarnation, status).await;
            None
        }
        NodeMessage::Goodbye { node_id } => {
            handle_goodbye(state, node_id).await;
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_register<C: Clock>(
    state: &SessionState<C>,
    session_id: crate::registry::SessionId,
    name: String,
    owner: OwnerId,
    runtime_kind: orc_core::RuntimeKind,
    capabilities: orc_core::NodeCapabilities,
    labels: std::collections::HashMap<String, String>,
    annotations: std::collections::HashMap<String, String>,
    taints: Vec<Taint>,
    allocatable_cpu_millis: u64,
    allocatable_memory_mb: u64,
) -> OrchestratorMessage {
    let now = state.clock.epoch_ms();
    let existing = match state.store.get_node_by_name(&name).await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "register: store lookup failed");
            return OrchestratorMessage::Rejected { reason: "store unavailable".to_string() };
        }
    };

    let node = match existing {
        Some(mut node) if node.owner == owner => {
            node.runtime_kind = runtime_kind;
            node.capabilities = capabilities;
            node.labels = labels;
            node.annotations = annotations;
            node.taints = taints;
            node.allocatable = orc_core::ResourceQuantities::new(allocatable_cpu_millis, allocatable_memory_mb);
            node.status = NodeStatus::Online;
            node.connection_id = Some(session_id.to_string());
            node.last_heartbeat_ms = now;
            node
        }
        Some(node) => {
            warn!(name = %name, "register: name already owned by a different owner");
            let _ = node;
            return OrchestratorMessage::Rejected {
                reason: format!("node name {name} is already registered under a different owner"),
            };
        }
        None => Node {
            id: NodeId::new(),
            name,
            runtime_kind,
            capabilities,
            labels,
            annotations,
            taints,
            allocatable: orc_core::ResourceQuantities::new(allocatable_cpu_millis, allocatable_memory_mb),
            allocated: orc_core::ResourceQuantities::default(),
            status: NodeStatus::Online,
            connection_id: Some(session_id.to_string()),
            unschedulable: false,
            owner,
            last_heartbeat_ms: now,
        },
    };

    let node_id = node.id;
    if let Err(e) = state.store.put_node(node).await {
        warn!(error = %e, "register: failed to persist node");
        return OrchestratorMessage::Rejected { reason: "failed to persist node".to_string() };
    }
    state.registry.bind_node(session_id, node_id);
    state.lease.clear_suspect(&node_id);
    (state.trigger_reconcile)();
    info!(node_id = %node_id, "node registered");
    OrchestratorMessage::Welcome { node_id, heartbeat_interval_ms: state.cfg.heartbeat_interval_ms }
}

async fn handle_reconnect<C: Clock>(
    state: &SessionState<C>,
    session_id: crate::registry::SessionId,
    node_id: NodeId,
    owner: OwnerId,
    known_pod_ids: Vec<orc_core::PodId>,
) -> OrchestratorMessage {
    let now = state.clock.epoch_ms();
    let mut node = match state.store.get_node(&node_id).await {
        Ok(Some(node)) => node,
        Ok(None) => {
            return OrchestratorMessage::Rejected { reason: format!("unknown node_id {node_id}") };
        }
        Err(e) => {
            warn!(error = %e, "reconnect: store lookup failed");
            return OrchestratorMessage::Rejected { reason: "store unavailable".to_string() };
        }
    };
    if node.owner != owner {
        warn!(node_id = %node_id, "reconnect: owner mismatch, rejecting");
        return OrchestratorMessage::Rejected {
            reason: format!("node {node_id} is not registered under this owner"),
        };
    }

    node.status = NodeStatus::Online;
    node.connection_id = Some(session_id.to_string());
    node.last_heartbeat_ms = now;
    if let Err(e) = state.store.put_node(node).await {
        warn!(error = %e, "reconnect: failed to persist node");
        return OrchestratorMessage::Rejected { reason: "failed to persist node".to_string() };
    }

    state.registry.bind_node(session_id, node_id);
    state.lease.clear_suspect(&node_id);

    match orphan::reconcile_reconnect(
        state.store.as_ref(),
        &state.clock,
        &state.registry,
        node_id,
        &known_pod_ids,
    )
    .await
    {
        Ok(acted) => {
            if acted {
                (state.trigger_reconcile)();
            }
        }
        Err(e) => warn!(node_id = %node_id, error = %e, "reconnect: orphan reconciliation failed"),
    }

    info!(node_id = %node_id, "node reconnected");
    OrchestratorMessage::Welcome { node_id, heartbeat_interval_ms: state.cfg.heartbeat_interval_ms }
}

async fn handle_heartbeat<C: Clock>(
    state: &SessionState<C>,
    session_id: crate::registry::SessionId,
    node_id: NodeId,
) {
    if !state.registry.owns_node(session_id, &node_id) {
        warn!(node_id = %node_id, "heartbeat from session that does not own this node, dropping");
        return;
    }
    let now = state.clock.epoch_ms();
    let mut node = match state.store.get_node(&node_id).await {
        Ok(Some(node)) => node,
        Ok(None) => {
            warn!(node_id = %node_id, "heartbeat for unknown node");
            return;
        }
        Err(e) => {
            warn!(error = %e, "heartbeat: store lookup failed");
            return;
        }
    };
    node.last_heartbeat_ms = now;
    node.connection_id = Some(session_id.to_string());
    if node.status != NodeStatus::Offline {
        node.status = NodeStatus::Online;
    }
    if let Err(e) = state.store.put_node(node).await {
        warn!(error = %e, "heartbeat: failed to persist node");
        return;
    }
    state.lease.clear_suspect(&node_id);
}

async fn handle_pod_status_report<C: Clock>(
    state: &SessionState<C>,
    node_id: NodeId,
    pod_id: orc_core::PodId,
    incarnation: orc_core::Incarnation,
    status: PodRuntimeStatus,
) {
    let pod = match state.store.get_pod(&pod_id).await {
        Ok(Some(pod)) => pod,
        Ok(None) => {
            warn!(pod_id = %pod_id, node_id = %node_id, "status report for unknown pod");
            return;
        }
        Err(e) => {
            warn!(error = %e, "pod status report: store lookup failed");
            return;
        }
    };

    if let Err(SessionError::StaleIncarnation { expected, got }) =
        pod_store::check_incarnation(&pod, incarnation)
    {
        warn!(pod_id = %pod_id, expected, got, "dropping stale-incarnation status report");
        return;
    }

    let result = match status {
        PodRuntimeStatus::Running => {
            pod_store::mark_started(state.store.as_ref(), &state.clock, pod).await
        }
        PodRuntimeStatus::Stopped { reason } => {
            pod_store::mark_stopped(state.store.as_ref(), &state.clock, pod, reason).await
        }
    };
    if let Err(e) = result {
        warn!(pod_id = %pod_id, error = %e, "failed to apply pod status report");
        return;
    }
    (state.trigger_reconcile)();
}

async fn handle_goodbye<C: Clock>(state: &SessionState<C>, node_id: NodeId) {
    let mut node = match state.store.get_node(&node_id).await {
        Ok(Some(node)) => node,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "goodbye: store lookup failed");
            return;
        }
    };
    node.status = NodeStatus::Offline;
    node.connection_id = None;
    if let Err(e) = state.store.put_node(node).await {
        warn!(error = %e, "goodbye: failed to persist node");
        return;
    }
    info!(node_id = %node_id, "node said goodbye, marked offline");
    (state.trigger_reconcile)();
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
