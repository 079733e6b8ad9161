// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Subcommand;

use crate::client::AdminClient;
use crate::error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum NodeCommand {
    /// List registered nodes.
    List,
    /// Show a single node's detail, including its current pod ids.
    Get { id: String },
    /// Mark a node unschedulable so the reconciler stops placing new pods
    /// on it; existing pods are left running.
    Cordon { id: String },
    /// Clear a node's unschedulable flag.
    Uncordon { id: String },
    /// Remove a node's record (its pods are orphaned, not deleted here).
    Delete { id: String },
}

pub async fn run(cmd: NodeCommand, client: &AdminClient, format: OutputFormat) -> Result<(), ExitError> {
    match cmd {
        NodeCommand::List => {
            let nodes = client.list_nodes().await?;
            output::print_list(format, &nodes, output::NODE_HEADER, output::node_row);
        }
        NodeCommand::Get { id } => {
            let node = client.get_node(&id).await?;
            output::print_detail(format, &node, output::node_detail_fields(&node));
        }
        NodeCommand::Cordon { id } => {
            client.cordon_node(&id, true).await?;
            println!("node {} cordoned", id);
        }
        NodeCommand::Uncordon { id } => {
            client.cordon_node(&id, false).await?;
            println!("node {} uncordoned", id);
        }
        NodeCommand::Delete { id } => {
            client.delete_node(&id).await?;
            println!("node {} deleted", id);
        }
    }
    Ok(())
}
