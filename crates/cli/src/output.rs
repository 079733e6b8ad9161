// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text/JSON rendering shared across the resource subcommands.

use clap::ValueEnum;
use orc_wire::{NodeDetail, NodeSummary, PackDetail, PackSummary, PodDetail, PodSummary, ServiceDetail, ServiceSummary};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a `Vec<T>` as either a plain table (via `row`) or pretty JSON.
pub fn print_list<T: Serialize>(format: OutputFormat, items: &[T], header: &[&str], row: impl Fn(&T) -> Vec<String>) {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Text => print_table(header, items.iter().map(&row).collect()),
    }
}

/// Print a single `Option<T>` as JSON or a `key: value` block; `None`
/// prints "not found" to stderr and the caller maps it to an exit code.
pub fn print_detail<T: Serialize>(format: OutputFormat, item: &T, fields: Vec<(&str, String)>) {
    match format {
        OutputFormat::Json => print_json(item),
        OutputFormat::Text => {
            let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, value) in fields {
                println!("{}{}  {}", crate::color::context(key), " ".repeat(width - key.len()), value);
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}

fn print_table(header: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    let header_line: Vec<String> =
        header.iter().zip(&widths).map(|(h, w)| format!("{:<width$}", h, width = w)).collect();
    println!("{}", crate::color::header(&header_line.join("  ")));
    for row in rows {
        let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| format!("{:<width$}", c, width = w)).collect();
        println!("{}", line.join("  "));
    }
}

pub fn node_row(n: &NodeSummary) -> Vec<String> {
    vec![
        n.id.to_string(),
        n.name.clone(),
        n.runtime_kind.to_string(),
        n.status.to_string(),
        n.unschedulable.to_string(),
        n.pod_count.to_string(),
    ]
}

pub const NODE_HEADER: &[&str] = &["ID", "NAME", "RUNTIME", "STATUS", "UNSCHEDULABLE", "PODS"];

pub fn node_detail_fields(n: &NodeDetail) -> Vec<(&'static str, String)> {
    vec![
        ("id", n.id.to_string()),
        ("name", n.name.clone()),
        ("runtime", n.runtime_kind.to_string()),
        ("status", n.status.to_string()),
        ("unschedulable", n.unschedulable.to_string()),
        ("allocatable", format!("{}m cpu / {}Mi mem", n.allocatable_cpu_millis, n.allocatable_memory_mb)),
        ("allocated", format!("{}m cpu / {}Mi mem", n.allocated_cpu_millis, n.allocated_memory_mb)),
        ("last_heartbeat_ms", n.last_heartbeat_ms.to_string()),
        ("pods", n.pod_ids.len().to_string()),
    ]
}

pub fn service_row(s: &ServiceSummary) -> Vec<String> {
    vec![
        s.namespace.clone(),
        s.name.clone(),
        s.kind.to_string(),
        s.pack_version.clone(),
        s.replicas.to_string(),
        s.status.to_string(),
    ]
}

pub const SERVICE_HEADER: &[&str] = &["NAMESPACE", "NAME", "KIND", "PACK_VERSION", "REPLICAS", "STATUS"];

pub fn service_detail_fields(s: &ServiceDetail) -> Vec<(&'static str, String)> {
    vec![
        ("id", s.summary.id.to_string()),
        ("namespace", s.summary.namespace.clone()),
        ("name", s.summary.name.clone()),
        ("kind", s.summary.kind.to_string()),
        ("pack_version", s.summary.pack_version.clone()),
        ("replicas", s.summary.replicas.to_string()),
        ("status", s.summary.status.to_string()),
        ("max_unavailable", s.max_unavailable.to_string()),
        ("current_incarnation", s.current_incarnation.to_string()),
        ("crash_loop_count", s.crash_loop_count.to_string()),
        ("rollback_pack_version", s.rollback_pack_version.clone().unwrap_or_else(|| "-".to_string())),
        ("pods", s.pod_ids.len().to_string()),
    ]
}

pub fn pod_row(p: &PodSummary) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.namespace.clone(),
        p.node_id.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
        p.status.to_string(),
        p.termination_reason.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
        p.incarnation.to_string(),
    ]
}

pub const POD_HEADER: &[&str] = &["ID", "NAMESPACE", "NODE", "STATUS", "TERMINATION_REASON", "INCARNATION"];

pub fn pod_detail_fields(p: &PodDetail) -> Vec<(&'static str, String)> {
    vec![
        ("id", p.summary.id.to_string()),
        ("namespace", p.summary.namespace.clone()),
        ("node", p.summary.node_id.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())),
        ("status", p.summary.status.to_string()),
        ("termination_reason", p.summary.termination_reason.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())),
        ("incarnation", p.summary.incarnation.to_string()),
        ("pack_id", p.pack_id.to_string()),
        ("pack_version", p.pack_version.clone()),
        ("created_epoch_ms", p.created_epoch_ms.to_string()),
        ("started_epoch_ms", p.started_epoch_ms.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())),
        ("stopped_epoch_ms", p.stopped_epoch_ms.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())),
    ]
}

pub fn pack_row(p: &PackSummary) -> Vec<String> {
    vec![
        p.namespace.clone(),
        p.name.clone(),
        p.visibility.to_string(),
        p.latest_version.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

pub const PACK_HEADER: &[&str] = &["NAMESPACE", "NAME", "VISIBILITY", "LATEST_VERSION"];

pub fn pack_detail_fields(p: &PackDetail) -> Vec<(&'static str, String)> {
    vec![
        ("id", p.summary.id.to_string()),
        ("namespace", p.summary.namespace.clone()),
        ("name", p.summary.name.clone()),
        ("visibility", p.summary.visibility.to_string()),
        ("versions", p.versions.join(", ")),
    ]
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
