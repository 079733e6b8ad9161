// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn register_roundtrips_through_json() {
    let msg = NodeMessage::Register {
        name: "n1".to_string(),
        owner: OwnerId::new("alice"),
        runtime_kind: RuntimeKind::Process,
        capabilities: NodeCapabilities::default(),
        labels: HashMap::new(),
        annotations: HashMap::new(),
        taints: Vec::new(),
        allocatable_cpu_millis: 4000,
        allocatable_memory_mb: 8192,
    };
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"type\":\"Register\""));
    let back: NodeMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn reconnect_carries_known_pod_ids() {
    let pod = PodId::new();
    let msg =
        NodeMessage::Reconnect { node_id: NodeId::new(), owner: OwnerId::new("alice"), known_pod_ids: vec![pod] };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["known_pod_ids"].as_array().unwrap().len(), 1);
}

#[test]
fn pod_status_report_tags_stopped_reason() {
    let msg = NodeMessage::PodStatusReport {
        node_id: NodeId::new(),
        pod_id: PodId::new(),
        incarnation: 1,
        status: PodRuntimeStatus::Stopped { reason: TerminationReason::Error },
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["status"]["state"], "stopped");
    assert_eq!(json["status"]["reason"], "error");
}

#[test]
fn welcome_and_deploy_pod_roundtrip() {
    let welcome = OrchestratorMessage::Welcome { node_id: NodeId::new(), heartbeat_interval_ms: 5000 };
    let json = serde_json::to_string(&welcome).unwrap();
    let back: OrchestratorMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, welcome);

    let deploy = OrchestratorMessage::DeployPod {
        pod_id: PodId::new(),
        service_id: Some(ServiceId::new()),
        pack_id: PackId::new(),
        pack_version: "1.0.0".to_string(),
        incarnation: 3,
    };
    let json = serde_json::to_string(&deploy).unwrap();
    let back: OrchestratorMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, deploy);
}
