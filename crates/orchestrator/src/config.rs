// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the orchestrator crate,
//! one function per setting with a documented fallback (§4.8, following
//! the teacher's `env.rs` convention).

use std::time::Duration;

fn env_duration_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis).unwrap_or(default)
}

fn env_u32(var: &str, default: u32) -> u32 {
    std::env::var(var).ok().and_then(|s| s.parse::<u32>().ok()).unwrap_or(default)
}

/// Address the admin HTTP / node WebSocket listener binds to.
pub fn bind_addr() -> String {
    std::env::var("ORC_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:7080".to_string())
}

/// Bearer token required on admin requests and the node session handshake.
/// When unset, authentication is disabled (local development only).
pub fn auth_token() -> Option<String> {
    std::env::var("ORC_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

/// Reconciler tick period.
pub fn reconcile_interval() -> Duration {
    env_duration_ms("ORC_RECONCILE_INTERVAL_MS", Duration::from_secs(5))
}

/// Minimum spacing between externally-triggered reconcile runs.
pub fn debounce_interval() -> Duration {
    env_duration_ms("ORC_DEBOUNCE_MS", Duration::from_secs(2))
}

/// Consecutive application-attributable pod failures before crash-loop
/// rollback/pause kicks in (§4.5.1).
pub fn max_consecutive_failures() -> u32 {
    env_u32("ORC_MAX_CONSECUTIVE_FAILURES", 3)
}

/// Sliding window over which application failures are counted toward
/// crash-loop detection.
pub fn failure_detection_window() -> Duration {
    env_duration_ms("ORC_FAILURE_WINDOW_MS", Duration::from_secs(60))
}

/// Initial crash-loop backoff duration; doubled per consecutive trip up to
/// `max_backoff`.
pub fn initial_backoff() -> Duration {
    env_duration_ms("ORC_INITIAL_BACKOFF_MS", Duration::from_secs(30))
}

/// Ceiling on crash-loop backoff duration.
pub fn max_backoff() -> Duration {
    env_duration_ms("ORC_MAX_BACKOFF_MS", Duration::from_secs(600))
}

/// How often the lease watcher sweeps all nodes for stale heartbeats.
pub fn lease_sweep_interval() -> Duration {
    env_duration_ms("ORC_LEASE_SWEEP_INTERVAL_MS", Duration::from_secs(5))
}

/// How long a missed heartbeat is tolerated before a node moves
/// online → suspect (§4.3).
pub fn suspect_timeout() -> Duration {
    env_duration_ms("ORC_SUSPECT_TIMEOUT_MS", Duration::from_secs(30))
}

/// How long a node may remain suspect before its pods are failed and the
/// node moves to offline (§4.3).
pub fn lease_duration() -> Duration {
    env_duration_ms("ORC_LEASE_DURATION_MS", Duration::from_secs(120))
}

/// Heartbeat interval the orchestrator advertises to nodes on `Welcome`.
pub fn heartbeat_interval() -> Duration {
    env_duration_ms("ORC_HEARTBEAT_INTERVAL_MS", Duration::from_secs(10))
}

/// Postgres connection string, when the `postgres` feature backend is used.
/// Falls back to the in-memory store when unset.
pub fn store_dsn() -> Option<String> {
    std::env::var("ORC_STORE_DSN").ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn bind_addr_falls_back_when_unset() {
        std::env::remove_var("ORC_BIND_ADDR");
        assert_eq!(bind_addr(), "0.0.0.0:7080");
    }

    #[test]
    #[serial]
    fn reconcile_interval_reads_override() {
        std::env::set_var("ORC_RECONCILE_INTERVAL_MS", "750");
        assert_eq!(reconcile_interval(), Duration::from_millis(750));
        std::env::remove_var("ORC_RECONCILE_INTERVAL_MS");
    }
}
