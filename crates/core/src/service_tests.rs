// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builder_defaults_to_progressing_replica_service() {
    let svc = Service::builder().build();
    assert_eq!(svc.status, ServiceStatus::Progressing);
    assert!(!svc.is_daemon_set());
    assert_eq!(svc.max_unavailable, 1);
}

#[test]
fn daemon_set_kind_is_reported() {
    let svc = Service::builder().kind(ServiceKind::DaemonSet).build();
    assert!(svc.is_daemon_set());
}

#[test]
fn node_selector_matches_subset_of_labels() {
    let mut labels = HashMap::new();
    labels.insert("gpu".to_string(), "true".to_string());
    labels.insert("zone".to_string(), "us-east".to_string());

    let mut selector = NodeSelector::default();
    selector.match_labels.insert("gpu".to_string(), "true".to_string());
    assert!(selector.matches(&labels));

    selector.match_labels.insert("zone".to_string(), "us-west".to_string());
    assert!(!selector.matches(&labels));
}

#[test]
fn empty_selector_matches_any_node() {
    let selector = NodeSelector::default();
    assert!(selector.matches(&HashMap::new()));
}
