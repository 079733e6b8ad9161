// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::test_support::{online_node, pack_with_version, replica_service};
use orc_core::{Namespace, NodeSelector, RuntimeKind, Taint, TaintEffect, Toleration};

fn pack_and_version(name: &str) -> (Pack, PackMetadata) {
    let pack = pack_with_version(name, "1.0.0");
    let version = pack.latest_version().unwrap().clone();
    (pack, version)
}

#[test]
fn online_node_with_matching_runtime_is_eligible() {
    let node = online_node("n1");
    let service = replica_service("web", "1.0.0", 2);
    let (pack, version) = pack_and_version("web");
    assert!(is_eligible(&node, &service, &pack, &version, &Namespace::default()).is_ok());
}

#[test]
fn offline_node_is_ineligible() {
    let mut node = online_node("n1");
    node.status = orc_core::NodeStatus::Offline;
    let service = replica_service("web", "1.0.0", 2);
    let (pack, version) = pack_and_version("web");
    assert_eq!(
        is_eligible(&node, &service, &pack, &version, &Namespace::default()),
        Err(Ineligibility::NotOnline)
    );
}

#[test]
fn incompatible_runtime_kind_is_rejected() {
    let mut node = online_node("n1");
    node.runtime_kind = RuntimeKind::Browser;
    let service = replica_service("web", "1.0.0", 2);
    let (pack, version) = pack_and_version("web");
    assert_eq!(
        is_eligible(&node, &service, &pack, &version, &Namespace::default()),
        Err(Ineligibility::RuntimeIncompatible)
    );
}

#[test]
fn selector_mismatch_is_rejected() {
    let node = online_node("n1");
    let mut service = replica_service("web", "1.0.0", 2);
    service.node_selector = NodeSelector { match_labels: [("zone".to_string(), "us".to_string())].into() };
    let (pack, version) = pack_and_version("web");
    assert_eq!(
        is_eligible(&node, &service, &pack, &version, &Namespace::default()),
        Err(Ineligibility::SelectorMismatch)
    );
}

#[test]
fn untolerated_blocking_taint_is_rejected() {
    let mut node = online_node("n1");
    node.taints = vec![Taint::new("gpu", TaintEffect::NoSchedule)];
    let service = replica_service("web", "1.0.0", 2);
    let (pack, version) = pack_and_version("web");
    assert_eq!(
        is_eligible(&node, &service, &pack, &version, &Namespace::default()),
        Err(Ineligibility::UntoleratedTaint)
    );
}

#[test]
fn matching_toleration_clears_blocking_taint() {
    let mut node = online_node("n1");
    node.taints = vec![Taint::new("gpu", TaintEffect::NoSchedule)];
    let mut service = replica_service("web", "1.0.0", 2);
    service.tolerations = vec![Toleration { key: "gpu".to_string(), value: None, effect: None }];
    let (pack, version) = pack_and_version("web");
    assert!(is_eligible(&node, &service, &pack, &version, &Namespace::default()).is_ok());
}

#[test]
fn private_pack_from_other_namespace_is_inaccessible() {
    let node = online_node("n1");
    let service = replica_service("web", "1.0.0", 2);
    let (pack, version) = pack_and_version("web");
    assert_eq!(
        is_eligible(&node, &service, &pack, &version, &Namespace::new("other")),
        Err(Ineligibility::PackInaccessible)
    );
}

#[test]
fn pick_least_loaded_prefers_more_spare_capacity() {
    let mut low_spare = online_node("n1");
    low_spare.allocated = orc_core::ResourceQuantities::new(3900, 100);
    let high_spare = online_node("n2");
    let service = replica_service("web", "1.0.0", 1);

    let eligible = vec![&low_spare, &high_spare];
    let picked = pick_least_loaded(&eligible, &service).unwrap();
    assert_eq!(picked.name, "n2");
}

#[test]
fn pick_least_loaded_skips_nodes_without_capacity() {
    let mut tiny = online_node("n1");
    tiny.allocatable = orc_core::ResourceQuantities::new(10, 10);
    let mut service = replica_service("web", "1.0.0", 1);
    service.resource_request = orc_core::ResourceQuantities::new(1000, 512);
    let eligible = vec![&tiny];
    assert!(pick_least_loaded(&eligible, &service).is_none());
}
