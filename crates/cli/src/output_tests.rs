// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orc_core::{NodeId, NodeStatus, RuntimeKind};

fn summary() -> NodeSummary {
    NodeSummary {
        id: NodeId::from_string("nod-test"),
        name: "n1".to_string(),
        runtime_kind: RuntimeKind::Process,
        status: NodeStatus::Online,
        unschedulable: false,
        pod_count: 2,
    }
}

#[test]
fn node_row_matches_header_arity() {
    let row = node_row(&summary());
    assert_eq!(row.len(), NODE_HEADER.len());
    assert_eq!(row[1], "n1");
    assert_eq!(row[3], "online");
}

#[test]
fn default_output_format_is_text() {
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
}
