// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::ErrorCode;

#[test]
fn create_service_request_defaults_replicas_to_one() {
    let json = r#"{"name":"web","kind":"replica","pack_id":"pak-abc","pack_version":"1.0.0"}"#;
    let req: CreateServiceRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.replicas, 1);
}

#[test]
fn update_service_request_allows_either_field_alone() {
    let json = r#"{"replicas": 3}"#;
    let req: UpdateServiceRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.replicas, Some(3));
    assert!(req.pack_version.is_none());
}

#[test]
fn admin_result_ok_roundtrips() {
    let result: AdminResult<u32> = AdminResult::Ok(7);
    let json = serde_json::to_string(&result).unwrap();
    let back: AdminResult<u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn admin_result_err_carries_api_error() {
    let result: AdminResult<u32> = AdminResult::Err { error: ApiError::not_found("service x") };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    let _ = ErrorCode::NotFound;
}

#[test]
fn pod_detail_flattens_summary_fields() {
    let detail = PodDetail {
        summary: PodSummary {
            id: orc_core::PodId::new(),
            namespace: "default".to_string(),
            service_id: None,
            node_id: Some(orc_core::NodeId::new()),
            status: orc_core::PodStatus::Running,
            termination_reason: None,
            incarnation: 1,
        },
        pack_id: orc_core::PackId::new(),
        pack_version: "1.0.0".to_string(),
        labels: HashMap::new(),
        created_epoch_ms: 0,
        started_epoch_ms: None,
        stopped_epoch_ms: None,
    };
    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["namespace"], "default");
    assert_eq!(json["pack_version"], "1.0.0");
}

#[test]
fn create_pack_request_defaults_to_private() {
    let json = r#"{"name":"agent","version":"1.0.0","digest":"sha256:x","compatible_runtimes":["process"]}"#;
    let req: CreatePackRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.visibility, orc_core::Visibility::Private);
    assert!(req.min_runtime_version.is_none());
}

#[test]
fn update_node_request_requires_unschedulable() {
    let json = r#"{"unschedulable": true}"#;
    let req: UpdateNodeRequest = serde_json::from_str(json).unwrap();
    assert!(req.unschedulable);
}
