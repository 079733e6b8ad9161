// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::NodeId;
use orc_wire::OrchestratorMessage;

#[test]
fn send_to_unbound_node_fails() {
    let registry = ConnectionRegistry::new();
    let node_id = NodeId::new();
    assert!(!registry.send_to_node(&node_id, OrchestratorMessage::Rejected { reason: "x".into() }));
}

#[test]
fn bound_session_receives_frame() {
    let registry = ConnectionRegistry::new();
    let (session_id, mut rx) = registry.register();
    let node_id = NodeId::new();
    registry.bind_node(session_id, node_id);

    assert!(registry.is_node_connected(&node_id));
    let sent = registry.send_to_node(
        &node_id,
        OrchestratorMessage::StopPod { pod_id: orc_core::PodId::new(), reason: orc_core::TerminationReason::AdminStop, message: None },
    );
    assert!(sent);
    assert!(rx.try_recv().is_ok());
}

#[test]
fn unregister_clears_node_binding() {
    let registry = ConnectionRegistry::new();
    let (session_id, _rx) = registry.register();
    let node_id = NodeId::new();
    registry.bind_node(session_id, node_id);

    let unbound = registry.unregister(session_id);
    assert_eq!(unbound, Some(node_id));
    assert!(!registry.is_node_connected(&node_id));
}

#[test]
fn unregister_unknown_session_is_noop() {
    let registry = ConnectionRegistry::new();
    assert!(registry.unregister(SessionId::next(&std::sync::atomic::AtomicU64::new(0))).is_none());
}

#[test]
fn owns_node_is_false_for_a_different_session() {
    let registry = ConnectionRegistry::new();
    let (session_id, _rx) = registry.register();
    let (other_session, _rx2) = registry.register();
    let node_id = NodeId::new();
    registry.bind_node(session_id, node_id);

    assert!(registry.owns_node(session_id, &node_id));
    assert!(!registry.owns_node(other_session, &node_id));
    assert!(!registry.owns_node(session_id, &NodeId::new()));
}
