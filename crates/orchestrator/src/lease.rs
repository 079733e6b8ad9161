// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node lease & health (§4.3): the three-state node machine
//! online ⇄ suspect → offline, and the sweep that expires leases.
//!
//! Generalized from the teacher's "one liveness timer per agent"
//! (`crates/engine/src/runtime/monitor.rs`, `TimerKind::Liveness` in
//! `crates/core/src/timer.rs`) to "one lease timer per suspect node":
//! instead of a timer-per-entity map, a periodic sweep scans all nodes and
//! compares `last_heartbeat_ms`/a recorded suspect-since timestamp against
//! the clock, which is simpler to reason about for a node count in the
//! hundreds-to-thousands range and avoids a timer-wheel dependency the
//! teacher doesn't otherwise carry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use orc_core::{Clock, Node, NodeId, NodeStatus, TerminationReason};
use orc_store::Store;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::pod_store;
use crate::registry::ConnectionRegistry;

/// Tracks, per suspect node, the epoch-ms at which it became suspect — the
/// lease clock. Cleared when the node returns online or goes offline.
#[derive(Default)]
struct SuspectSince(Mutex<HashMap<NodeId, u64>>);

/// A clock pinned to a single already-read epoch value, used to stamp
/// history entries with the sweep's `now` rather than re-reading the clock
/// (and risking skew) per pod inside a single sweep pass.
#[derive(Clone, Copy)]
struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        self.0
    }
}

/// Watches node heartbeats and drives online → suspect → offline
/// transitions on a fixed sweep cadence.
pub struct LeaseWatcher<C: Clock> {
    store: Arc<dyn Store>,
    registry: ConnectionRegistry,
    clock: C,
    suspect_since: SuspectSince,
    suspect_timeout: Duration,
    lease_duration: Duration,
}

impl<C: Clock> LeaseWatcher<C> {
    pub fn new(
        store: Arc<dyn Store>,
        registry: ConnectionRegistry,
        clock: C,
        suspect_timeout: Duration,
        lease_duration: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
            suspect_since: SuspectSince::default(),
            suspect_timeout,
            lease_duration,
        }
    }

    /// Run the sweep loop forever on `interval`, until `shutdown` fires.
    /// Takes `Arc<Self>` rather than `self` so the session layer can hold
    /// its own clone of the watcher (to call [`clear_suspect`](Self::clear_suspect)
    /// on a successful reconnect) while the sweep loop also owns one.
    pub async fn run(self: Arc<Self>, interval: Duration, shutdown: tokio_util::sync::CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                _ = shutdown.cancelled() => {
                    info!("lease watcher shutting down");
                    return;
                }
            }
        }
    }

    /// One sweep over all known nodes. Called directly by tests and the
    /// periodic loop alike.
    pub async fn sweep(&self) {
        let nodes = match self.store.list_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(error = %e, "lease sweep: failed to list nodes");
                return;
            }
        };
        let now = self.clock.epoch_ms();
        for node in nodes {
            self.sweep_one(node, now).await;
        }
    }

    async fn sweep_one(&self, mut node: Node, now: u64) {
        match node.status {
            NodeStatus::Online => {
                let connected = self.registry.is_node_connected(&node.id);
                let heartbeat_stale =
                    now.saturating_sub(node.last_heartbeat_ms) > self.suspect_timeout.as_millis() as u64;
                if !connected || heartbeat_stale {
                    node.status = NodeStatus::Suspect;
                    node.connection_id = None;
                    self.suspect_since.0.lock().insert(node.id, now);
                    info!(node_id = %node.id, "node transitioned online -> suspect");
                    if let Err(e) = self.store.put_node(node).await {
                        warn!(error = %e, "failed to persist suspect transition");
                    }
                }
            }
            NodeStatus::Suspect => {
                let since = self.suspect_since.0.lock().get(&node.id).copied().unwrap_or(now);
                if now.saturating_sub(since) > self.lease_duration.as_millis() as u64 {
                    self.expire_lease(node, now).await;
                }
            }
            NodeStatus::Offline => {}
        }
    }

    /// Lease expired: fail every active pod on the node with
    /// `terminationReason=node_lost` and move the node to offline. The next
    /// reconciler tick is responsible for scheduling replacements (§4.3).
    async fn expire_lease(&self, mut node: Node, now: u64) {
        warn!(node_id = %node.id, "lease expired, marking node offline");
        node.status = NodeStatus::Offline;
        self.suspect_since.0.lock().remove(&node.id);
        if let Err(e) = self.store.put_node(node.clone()).await {
            warn!(error = %e, "failed to persist offline transition");
            return;
        }

        let pods = match self.store.list_pods_for_node(&node.id).await {
            Ok(pods) => pods,
            Err(e) => {
                warn!(error = %e, "failed to list pods for expired node");
                return;
            }
        };
        let clock = FixedClock(now);
        for pod in pods {
            if pod.is_terminal() {
                continue;
            }
            if let Err(e) =
                pod_store::mark_stopped(self.store.as_ref(), &clock, pod, TerminationReason::NodeLost).await
            {
                warn!(error = %e, "failed to mark pod node_lost");
            }
        }
    }

    /// Node reconnected within its lease: clear suspect state and mark
    /// online again. Called by the session handler on a successful
    /// `node:reconnect` (§4.3's "suspect → online" transition).
    pub fn clear_suspect(&self, node_id: &NodeId) {
        self.suspect_since.0.lock().remove(node_id);
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
