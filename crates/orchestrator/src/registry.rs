// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ConnectionRegistry — tracks live node sessions and routes outbound
//! frames to them (§4.1).
//!
//! Grounded on the teacher's `RuntimeRouter` (a `Mutex<HashMap<AgentId, _>>`
//! lookup table recording which adapter owns an agent) generalized from
//! "one adapter per agent" to "one outbound queue per session, optionally
//! bound to a node identity".

use std::collections::HashMap;
use std::sync::Arc;

use orc_core::NodeId;
use orc_wire::OrchestratorMessage;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Opaque identifier for one open session, assigned when the transport
/// accepts a connection (before the node has registered/reconnected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next(counter: &std::sync::atomic::AtomicU64) -> Self {
        Self(counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sess-{}", self.0)
    }
}

/// Outbound queue capacity per session. Bounded so a wedged node can't
/// grow memory without bound; `send` fails (non-fatally) once full.
const OUTBOUND_QUEUE_CAPACITY: usize = 256;

struct Entry {
    sender: mpsc::Sender<OrchestratorMessage>,
    node_id: Option<NodeId>,
}

/// Live session table, keyed by session-id, with a secondary node→session
/// index for outbound routing.
#[derive(Default)]
struct Tables {
    sessions: HashMap<SessionId, Entry>,
    by_node: HashMap<NodeId, SessionId>,
}

/// Shared handle to the set of live node sessions.
#[derive(Clone)]
pub struct ConnectionRegistry {
    tables: Arc<Mutex<Tables>>,
    counter: Arc<std::sync::atomic::AtomicU64>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            counter: Arc::new(std::sync::atomic::AtomicU64::new(1)),
        }
    }

    /// Register a new session, returning its id and the receiving half of
    /// its outbound queue. The session actor owns the receiver and is
    /// responsible for writing frames to the transport in order.
    pub fn register(&self) -> (SessionId, mpsc::Receiver<OrchestratorMessage>) {
        let id = SessionId::next(&self.counter);
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        self.tables.lock().sessions.insert(id, Entry { sender: tx, node_id: None });
        (id, rx)
    }

    /// Associate a node identity with an already-registered session, once
    /// `register`/`reconnect` succeeds (§4.1).
    pub fn bind_node(&self, session_id: SessionId, node_id: NodeId) {
        let mut tables = self.tables.lock();
        if let Some(entry) = tables.sessions.get_mut(&session_id) {
            entry.node_id = Some(node_id);
        }
        tables.by_node.insert(node_id, session_id);
    }

    /// Drop a session. If it was bound to a node and still owns that
    /// node's routing entry, the node→session mapping is cleared too.
    pub fn unregister(&self, session_id: SessionId) -> Option<NodeId> {
        let mut tables = self.tables.lock();
        let entry = tables.sessions.remove(&session_id)?;
        if let Some(node_id) = entry.node_id {
            if tables.by_node.get(&node_id) == Some(&session_id) {
                tables.by_node.remove(&node_id);
            }
        }
        entry.node_id
    }

    /// Best-effort enqueue to a node's session. Returns `false` if no live
    /// session owns the node or the outbound queue is full/closed — callers
    /// log this as `SEND_FAILED` and rely on the next reconciler tick to
    /// retry (§4.1, §7).
    pub fn send_to_node(&self, node_id: &NodeId, frame: OrchestratorMessage) -> bool {
        let session_id = { self.tables.lock().by_node.get(node_id).copied() };
        match session_id {
            Some(id) => self.send_to_session(id, frame),
            None => false,
        }
    }

    pub fn send_to_session(&self, session_id: SessionId, frame: OrchestratorMessage) -> bool {
        let sender = { self.tables.lock().sessions.get(&session_id).map(|e| e.sender.clone()) };
        match sender {
            Some(sender) => sender.try_send(frame).is_ok(),
            None => false,
        }
    }

    pub fn is_node_connected(&self, node_id: &NodeId) -> bool {
        self.tables.lock().by_node.contains_key(node_id)
    }

    /// Whether `session_id` is the session currently bound to `node_id`.
    /// Frames that claim a `node_id` (e.g. `node:heartbeat`) must be
    /// dropped, not applied, when this is false (§3, §4.2) — otherwise a
    /// session could keep refreshing a different node's liveness.
    pub fn owns_node(&self, session_id: SessionId, node_id: &NodeId) -> bool {
        self.tables.lock().by_node.get(node_id) == Some(&session_id)
    }

    pub fn live_session_count(&self) -> usize {
        self.tables.lock().sessions.len()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
