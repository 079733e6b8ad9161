// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Taints and tolerations: the negative/positive matching tokens that gate
//! scheduler eligibility (§4.6 of the design).

use serde::{Deserialize, Serialize};

/// Effect of a taint on scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaintEffect {
    /// Blocks scheduling of new pods without a matching toleration.
    NoSchedule,
    /// Blocks scheduling and evicts already-running pods without a toleration.
    NoExecute,
    /// Advisory only; never blocks scheduling.
    PreferNoSchedule,
}

impl TaintEffect {
    /// Whether this effect requires a matching toleration to schedule.
    pub fn is_blocking(&self) -> bool {
        matches!(self, TaintEffect::NoSchedule | TaintEffect::NoExecute)
    }
}

/// A taint applied to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub effect: TaintEffect,
}

impl Taint {
    pub fn new(key: impl Into<String>, effect: TaintEffect) -> Self {
        Self { key: key.into(), value: None, effect }
    }
}

/// A toleration carried by a service, matching against node taints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toleration {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<TaintEffect>,
}

impl Toleration {
    /// Whether this toleration covers the given taint.
    ///
    /// A toleration with no `effect` tolerates any effect for the key/value.
    /// A toleration with no `value` tolerates any value for the key.
    pub fn tolerates(&self, taint: &Taint) -> bool {
        if self.key != taint.key {
            return false;
        }
        if let Some(v) = &self.value {
            if Some(v) != taint.value.as_ref() {
                return false;
            }
        }
        match &self.effect {
            Some(e) => std::mem::discriminant(e) == std::mem::discriminant(&taint.effect),
            None => true,
        }
    }
}

/// Returns true if every blocking taint on `taints` is covered by some
/// toleration in `tolerations`.
pub fn tolerates_all_blocking(taints: &[Taint], tolerations: &[Toleration]) -> bool {
    taints
        .iter()
        .filter(|t| t.effect.is_blocking())
        .all(|t| tolerations.iter().any(|tol| tol.tolerates(t)))
}

#[cfg(test)]
#[path = "taint_tests.rs"]
mod tests;
