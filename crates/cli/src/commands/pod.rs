// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Subcommand;

use crate::client::AdminClient;
use crate::error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum PodCommand {
    /// List every pod belonging to a service in this namespace.
    List,
    /// Show a pod's detail, including its lifecycle timestamps.
    Get { id: String },
    /// Force-stop a pod. An administrative action, not a deletion — the
    /// pod row stays until its service's reconciler retires it.
    Stop { id: String },
}

pub async fn run(cmd: PodCommand, client: &AdminClient, namespace: &str, format: OutputFormat) -> Result<(), ExitError> {
    match cmd {
        PodCommand::List => {
            let pods = client.list_pods(namespace).await?;
            output::print_list(format, &pods, output::POD_HEADER, output::pod_row);
        }
        PodCommand::Get { id } => {
            let pod = client.get_pod(namespace, &id).await?;
            output::print_detail(format, &pod, output::pod_detail_fields(&pod));
        }
        PodCommand::Stop { id } => {
            client.stop_pod(namespace, &id).await?;
            println!("pod {} stop requested", id);
        }
    }
    Ok(())
}
