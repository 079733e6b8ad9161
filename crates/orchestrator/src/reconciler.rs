// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciler tick loop (§4.5): periodically (and on-demand, debounced)
//! runs [`convergence::converge_service`] over every service.
//!
//! Grounded on the replicaset controller reference's
//! `ReplicaSetController::start` (a `tokio::time::interval` loop wrapping
//! a single `reconcile()` call), generalized with a debounced "trigger
//! now" path for the admin surface's explicit reconcile requests and a
//! `Notify`-based non-overlap guard so a slow tick can't pile up work.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use orc_core::{Clock, ServiceId};
use orc_store::Store;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::convergence::{self, CountedFailures, ReconcileConfig};
use crate::registry::ConnectionRegistry;

/// Drives convergence for every service on a fixed cadence, plus an
/// on-demand path debounced to `debounce_interval` so a burst of admin
/// writes collapses into one extra tick rather than one per write.
pub struct Reconciler<C: Clock> {
    store: Arc<dyn Store>,
    registry: ConnectionRegistry,
    clock: C,
    cfg: ReconcileConfig,
    counted: CountedFailures,
    notify: Notify,
    /// Set when a trigger is pending and cleared at the start of the tick
    /// that services it, so triggers that arrive mid-tick aren't lost.
    pending: AtomicBool,
}

impl<C: Clock> Reconciler<C> {
    pub fn new(store: Arc<dyn Store>, registry: ConnectionRegistry, clock: C, cfg: ReconcileConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            registry,
            clock,
            cfg,
            counted: CountedFailures::default(),
            notify: Notify::new(),
            pending: AtomicBool::new(false),
        })
    }

    /// Request a tick as soon as the debounce window allows. Safe to call
    /// from any number of concurrent admin handlers; redundant triggers
    /// while one is already pending are free.
    pub fn trigger(&self) {
        if !self.pending.swap(true, Ordering::AcqRel) {
            self.notify.notify_one();
        }
    }

    /// Runs forever: one tick every `interval`, plus an extra tick at most
    /// every `debounce` in response to [`trigger`](Self::trigger) calls,
    /// until `shutdown` fires.
    pub async fn run(self: Arc<Self>, interval: Duration, debounce: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.pending.store(false, Ordering::Release);
                    self.tick().await;
                }
                _ = self.notify.notified() => {
                    tokio::time::sleep(debounce).await;
                    self.pending.store(false, Ordering::Release);
                    self.tick().await;
                }
                _ = shutdown.cancelled() => {
                    info!("reconciler shutting down");
                    return;
                }
            }
        }
    }

    /// One full pass over every known service. Each service converges
    /// independently — one failing service never blocks the rest (§7).
    pub async fn tick(&self) {
        let services = match self.store.list_all_services().await {
            Ok(services) => services,
            Err(e) => {
                warn!(error = %e, "reconcile tick: failed to list services");
                return;
            }
        };

        let mut seen: HashSet<ServiceId> = HashSet::with_capacity(services.len());
        for service in services {
            seen.insert(service.id);
            let service_id = service.id;
            let result = convergence::converge_service(
                self.store.as_ref(),
                &self.clock,
                &self.registry,
                &self.cfg,
                &self.counted,
                service,
            )
            .await;
            if let Err(e) = result {
                warn!(service_id = %service_id, error = %e, "reconcile: service convergence failed, retrying next tick");
            }
        }

        self.counted.lock().retain(|id, _| seen.contains(id));
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
