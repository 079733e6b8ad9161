// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource quantities requested/limited/allocated for pods and nodes.
//!
//! Kept deliberately simple (two named dimensions) rather than an open map —
//! the core never interprets these beyond bookkeeping and predicate checks.

use serde::{Deserialize, Serialize};

/// A resource quantity request, limit, or allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    /// Fractional CPU cores, expressed in millicores (1000 = 1 core).
    #[serde(default)]
    pub cpu_millis: u64,
    /// Memory in megabytes.
    #[serde(default)]
    pub memory_mb: u64,
}

impl ResourceQuantities {
    pub fn new(cpu_millis: u64, memory_mb: u64) -> Self {
        Self { cpu_millis, memory_mb }
    }

    /// Whether `self` (remaining allocatable capacity) can satisfy `request`.
    pub fn fits(&self, request: &ResourceQuantities) -> bool {
        self.cpu_millis >= request.cpu_millis && self.memory_mb >= request.memory_mb
    }

    pub fn saturating_sub(&self, other: &ResourceQuantities) -> ResourceQuantities {
        ResourceQuantities {
            cpu_millis: self.cpu_millis.saturating_sub(other.cpu_millis),
            memory_mb: self.memory_mb.saturating_sub(other.memory_mb),
        }
    }

    pub fn saturating_add(&self, other: &ResourceQuantities) -> ResourceQuantities {
        ResourceQuantities {
            cpu_millis: self.cpu_millis.saturating_add(other.cpu_millis),
            memory_mb: self.memory_mb.saturating_add(other.memory_mb),
        }
    }
}
