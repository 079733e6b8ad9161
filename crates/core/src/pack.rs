// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packs: immutable, versioned bundles of code+metadata that pods run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::namespace::Namespace;
use crate::node::RuntimeKind;
use crate::owner::OwnerId;

crate::define_id! {
    /// Unique identifier for a pack (stable across versions).
    pub struct PackId("pak-");
}

/// Who may reference a pack when scheduling pods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the owning namespace may use this pack.
    Private,
    /// Any namespace in the cluster may use this pack.
    Public,
}

crate::simple_display! {
    Visibility {
        Private => "private",
        Public => "public",
    }
}

/// Metadata describing one immutable version of a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackMetadata {
    pub version: String,
    /// Content digest of the bundle (e.g. sha256 hex), used to detect
    /// tampering and as a cache key by nodes.
    pub digest: String,
    /// Runtime kinds this version is compatible with.
    pub compatible_runtimes: Vec<RuntimeKind>,
    /// Minimum node runtime version required to run this pack version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_runtime_version: Option<String>,
    pub created_epoch_ms: u64,
}

/// A pack: a named, versioned bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub id: PackId,
    pub namespace: Namespace,
    pub name: String,
    pub owner: OwnerId,
    pub visibility: Visibility,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Versions, newest last. The spec treats each entry as immutable once
    /// appended; only new versions may be added, never rewritten in place.
    pub versions: Vec<PackMetadata>,
}

impl Pack {
    pub fn latest_version(&self) -> Option<&PackMetadata> {
        self.versions.last()
    }

    pub fn version(&self, version: &str) -> Option<&PackMetadata> {
        self.versions.iter().find(|v| v.version == version)
    }

    /// Whether `namespace` may reference this pack.
    pub fn accessible_from(&self, namespace: &Namespace) -> bool {
        self.visibility == Visibility::Public || &self.namespace == namespace
    }
}

crate::builder! {
    pub struct PackBuilder => Pack {
        into {
            name: String = "demo-pack",
        }
        set {
            namespace: Namespace = Namespace::default(),
            owner: OwnerId = OwnerId::new("test-user"),
            visibility: Visibility = Visibility::Private,
            labels: HashMap<String, String> = HashMap::new(),
            versions: Vec<PackMetadata> = Vec::new(),
        }
        computed {
            id: PackId = PackId::new(),
        }
    }
}

#[cfg(test)]
#[path = "pack_tests.rs"]
mod tests;
