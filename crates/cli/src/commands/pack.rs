// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Subcommand;
use orc_core::{RuntimeKind, Visibility};
use orc_wire::{AddPackVersionRequest, CreatePackRequest};

use crate::client::AdminClient;
use crate::error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum PackCommand {
    /// List packs in a namespace.
    List,
    /// Show a pack's detail, including every published version.
    Get { name: String },
    /// Publish a pack's first version.
    Create {
        name: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        digest: String,
        /// Runtime kinds this version is compatible with (process|browser);
        /// may be passed multiple times.
        #[arg(long = "runtime", required = true)]
        runtimes: Vec<String>,
        #[arg(long, default_value = "private")]
        visibility: String,
        #[arg(long)]
        min_runtime_version: Option<String>,
    },
    /// Append a new immutable version to an existing pack.
    AddVersion {
        name: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        digest: String,
        #[arg(long = "runtime", required = true)]
        runtimes: Vec<String>,
        #[arg(long)]
        min_runtime_version: Option<String>,
    },
}

fn parse_runtime(s: &str) -> Result<RuntimeKind, ExitError> {
    match s {
        "process" => Ok(RuntimeKind::Process),
        "browser" => Ok(RuntimeKind::Browser),
        other => Err(ExitError::new(64, format!("unknown runtime kind `{other}` (expected process|browser)"))),
    }
}

fn parse_runtimes(raw: Vec<String>) -> Result<Vec<RuntimeKind>, ExitError> {
    raw.iter().map(|s| parse_runtime(s)).collect()
}

fn parse_visibility(s: &str) -> Result<Visibility, ExitError> {
    match s {
        "public" => Ok(Visibility::Public),
        "private" => Ok(Visibility::Private),
        other => Err(ExitError::new(64, format!("unknown visibility `{other}` (expected public|private)"))),
    }
}

pub async fn run(cmd: PackCommand, client: &AdminClient, namespace: &str, format: OutputFormat) -> Result<(), ExitError> {
    match cmd {
        PackCommand::List => {
            let packs = client.list_packs(namespace).await?;
            output::print_list(format, &packs, output::PACK_HEADER, output::pack_row);
        }
        PackCommand::Get { name } => {
            let pack = client.get_pack(namespace, &name).await?;
            output::print_detail(format, &pack, output::pack_detail_fields(&pack));
        }
        PackCommand::Create { name, version, digest, runtimes, visibility, min_runtime_version } => {
            let req = CreatePackRequest {
                name,
                visibility: parse_visibility(&visibility)?,
                version,
                digest,
                compatible_runtimes: parse_runtimes(runtimes)?,
                min_runtime_version,
            };
            let pack = client.create_pack(namespace, &req).await?;
            println!("pack {} created ({})", pack.name, pack.latest_version.unwrap_or_default());
        }
        PackCommand::AddVersion { name, version, digest, runtimes, min_runtime_version } => {
            let req = AddPackVersionRequest {
                version,
                digest,
                compatible_runtimes: parse_runtimes(runtimes)?,
                min_runtime_version,
            };
            let pack = client.add_pack_version(namespace, &name, &req).await?;
            println!("pack {} now at {}", pack.name, pack.latest_version.unwrap_or_default());
        }
    }
    Ok(())
}
