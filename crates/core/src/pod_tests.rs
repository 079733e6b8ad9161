// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builder_produces_pending_pod() {
    let pod = Pod::builder().build();
    assert_eq!(pod.status, PodStatus::Pending);
    assert!(pod.id.as_str().starts_with("pod-"));
    assert!(!pod.is_terminal());
    assert!(!pod.is_available());
}

#[test]
fn running_pod_is_available() {
    let pod = Pod::builder().status(PodStatus::Running).build();
    assert!(pod.is_available());
    assert!(!pod.is_terminal());
}

#[test]
fn stopped_pod_is_terminal() {
    let pod = Pod::builder().status(PodStatus::Stopped).build();
    assert!(pod.is_terminal());
}

#[test]
fn error_termination_is_application_attributable() {
    assert!(TerminationReason::Error.is_application());
    assert!(!TerminationReason::Error.is_infrastructure());
}

#[test]
fn node_lost_and_evicted_are_infrastructure_attributable() {
    assert!(TerminationReason::NodeLost.is_infrastructure());
    assert!(TerminationReason::EvictedResources.is_infrastructure());
    assert!(TerminationReason::AdminStop.is_infrastructure());
}

#[test]
fn node_lost_resolves_to_failed_status() {
    assert_eq!(TerminationReason::NodeLost.terminal_status(), PodStatus::Failed);
    assert_eq!(TerminationReason::Crash.terminal_status(), PodStatus::Failed);
}

#[test]
fn eviction_reasons_resolve_to_evicted_status() {
    assert_eq!(TerminationReason::EvictedResources.terminal_status(), PodStatus::Evicted);
    assert_eq!(TerminationReason::Preempted.terminal_status(), PodStatus::Evicted);
}

#[test]
fn administrative_reasons_resolve_to_stopped_status() {
    assert_eq!(TerminationReason::AdminStop.terminal_status(), PodStatus::Stopped);
    assert_eq!(TerminationReason::ServiceScaleDown.terminal_status(), PodStatus::Stopped);
    assert_eq!(TerminationReason::RollingUpdate.terminal_status(), PodStatus::Stopped);
    assert_eq!(TerminationReason::StalePod.terminal_status(), PodStatus::Stopped);
}

#[test]
fn unowned_pod_has_no_service() {
    let pod = Pod::builder().build();
    assert!(pod.service_id.is_none());
}

#[test]
fn pod_built_without_node_is_unassigned() {
    let pod = Pod::builder().build();
    assert!(!pod.is_assigned());
}
