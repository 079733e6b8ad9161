// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `orc`: a thin admin CLI over `orcd`'s HTTP surface (§6). Every
//! subcommand is a single request/response round trip — no local state,
//! no daemon of its own, matching the admin API's read/mutate-then-refetch
//! shape.

mod client;
mod color;
mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};

use client::AdminClient;
use error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "orc", version, about = "Admin CLI for the pod orchestrator control plane", styles = color::styles())]
struct Cli {
    /// Base URL of the orchestrator's admin HTTP surface.
    #[arg(long, env = "ORC_SERVER", default_value = "http://127.0.0.1:7080", global = true)]
    server: String,

    /// Bearer token for the admin surface; falls back to `ORC_AUTH_TOKEN`.
    #[arg(long, env = "ORC_AUTH_TOKEN", global = true)]
    token: Option<String>,

    /// Namespace scoping services/pods/packs (nodes are cluster-scoped).
    #[arg(long, short = 'n', default_value = "default", global = true)]
    namespace: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage registered worker nodes.
    Node {
        #[command(subcommand)]
        cmd: commands::node::NodeCommand,
    },
    /// Manage services (replica sets and DaemonSets).
    Service {
        #[command(subcommand)]
        cmd: commands::service::ServiceCommand,
    },
    /// Inspect and force-stop pods.
    Pod {
        #[command(subcommand)]
        cmd: commands::pod::PodCommand,
    },
    /// Manage packs (immutable versioned bundles).
    Pack {
        #[command(subcommand)]
        cmd: commands::pack::PackCommand,
    },
    /// Nudge the reconciler to run now instead of waiting for the next tick.
    Reconcile {
        #[command(subcommand)]
        cmd: ReconcileCommand,
    },
}

#[derive(Subcommand)]
enum ReconcileCommand {
    Trigger,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.code);
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let client = AdminClient::new(cli.server, cli.token);
    match cli.command {
        Command::Node { cmd } => commands::node::run(cmd, &client, cli.output).await,
        Command::Service { cmd } => commands::service::run(cmd, &client, &cli.namespace, cli.output).await,
        Command::Pod { cmd } => commands::pod::run(cmd, &client, &cli.namespace, cli.output).await,
        Command::Pack { cmd } => commands::pack::run(cmd, &client, &cli.namespace, cli.output).await,
        Command::Reconcile { cmd: ReconcileCommand::Trigger } => commands::reconcile::trigger(&client).await,
    }
}
