// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PodHistory: an append-only audit trail of lifecycle actions taken
//! against a pod, kept independent of the pod's own mutable status fields.

use serde::{Deserialize, Serialize};

use crate::pod::{PodId, TerminationReason};
use crate::service::ServiceId;

/// A single lifecycle action recorded against a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum PodHistoryAction {
    Created,
    Scheduled,
    Started,
    /// The node reported the same pod running again without a new
    /// incarnation (e.g. an in-place restart the node itself performed).
    Restarted,
    Stopping,
    Stopped { reason: TerminationReason },
    Failed { reason: TerminationReason },
    Evicted { reason: TerminationReason },
    /// Controller marked this pod stopping because a rolling update
    /// superseded its version.
    Updated,
}

/// One entry in a pod's append-only history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodHistoryEntry {
    pub pod_id: PodId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    pub action: PodHistoryAction,
    pub epoch_ms: u64,
}

impl PodHistoryEntry {
    pub fn new(pod_id: PodId, service_id: Option<ServiceId>, action: PodHistoryAction, epoch_ms: u64) -> Self {
        Self { pod_id, service_id, action, epoch_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::PodId;

    #[test]
    fn stopped_entry_carries_reason() {
        let entry = PodHistoryEntry::new(
            PodId::new(),
            None,
            PodHistoryAction::Stopped { reason: TerminationReason::Error },
            42,
        );
        match entry.action {
            PodHistoryAction::Stopped { reason } => assert_eq!(reason, TerminationReason::Error),
            _ => panic!("expected Stopped"),
        }
    }

    #[test]
    fn serializes_with_tagged_action() {
        let entry = PodHistoryEntry::new(PodId::new(), None, PodHistoryAction::Created, 0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"]["action"], "created");
    }
}
