// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use clap::Subcommand;
use orc_core::{PackId, ServiceKind};
use orc_wire::{CreateServiceRequest, UpdateServiceRequest};

use crate::client::AdminClient;
use crate::error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// List services in a namespace.
    List,
    /// Show a service's detail, including its desired/observed state.
    Get { name: String },
    /// Create a service. `--replicas 0` or `--kind daemon-set` both mean
    /// one pod per eligible node (§3's DaemonSet encoding).
    Create {
        name: String,
        #[arg(long)]
        pack: String,
        #[arg(long)]
        pack_version: String,
        #[arg(long, default_value = "replica")]
        kind: String,
        #[arg(long, default_value_t = 1)]
        replicas: u32,
        /// Node selector label, `key=value`; may be passed multiple times.
        #[arg(long = "selector", value_parser = parse_label)]
        selectors: Vec<(String, String)>,
        #[arg(long)]
        max_unavailable: Option<u32>,
    },
    /// Start a rolling update to a new pack version.
    SetVersion { name: String, version: String },
    /// Change the desired replica count (mutually exclusive with a
    /// version change — the admin surface rejects combining the two).
    Scale { name: String, replicas: u32 },
    /// Delete a service; its pods are retired by the reconciler.
    Delete { name: String },
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    s.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())).ok_or_else(|| format!("expected key=value, got `{s}`"))
}

fn parse_kind(s: &str) -> Result<ServiceKind, ExitError> {
    match s {
        "replica" => Ok(ServiceKind::Replica),
        "daemon-set" | "daemon_set" => Ok(ServiceKind::DaemonSet),
        other => Err(ExitError::new(64, format!("unknown service kind `{other}` (expected replica|daemon-set)"))),
    }
}

pub async fn run(cmd: ServiceCommand, client: &AdminClient, namespace: &str, format: OutputFormat) -> Result<(), ExitError> {
    match cmd {
        ServiceCommand::List => {
            let services = client.list_services(namespace).await?;
            output::print_list(format, &services, output::SERVICE_HEADER, output::service_row);
        }
        ServiceCommand::Get { name } => {
            let service = client.get_service(namespace, &name).await?;
            output::print_detail(format, &service, output::service_detail_fields(&service));
        }
        ServiceCommand::Create { name, pack, pack_version, kind, replicas, selectors, max_unavailable } => {
            let req = CreateServiceRequest {
                name,
                kind: parse_kind(&kind)?,
                pack_id: PackId::from_string(pack),
                pack_version,
                replicas,
                node_selector_labels: selectors.into_iter().collect::<HashMap<_, _>>(),
                max_unavailable,
            };
            let service = client.create_service(namespace, &req).await?;
            output::print_detail(format, &service, output::service_detail_fields(&service));
        }
        ServiceCommand::SetVersion { name, version } => {
            let req = UpdateServiceRequest { pack_version: Some(version), replicas: None };
            let service = client.update_service(namespace, &name, &req).await?;
            output::print_detail(format, &service, output::service_detail_fields(&service));
        }
        ServiceCommand::Scale { name, replicas } => {
            let req = UpdateServiceRequest { pack_version: None, replicas: Some(replicas) };
            let service = client.update_service(namespace, &name, &req).await?;
            output::print_detail(format, &service, output::service_detail_fields(&service));
        }
        ServiceCommand::Delete { name } => {
            client.delete_service(namespace, &name).await?;
            println!("service {} deleted", name);
        }
    }
    Ok(())
}
