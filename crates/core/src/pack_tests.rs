// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn meta(version: &str) -> PackMetadata {
    PackMetadata {
        version: version.to_string(),
        digest: format!("sha256:{version}"),
        compatible_runtimes: vec![RuntimeKind::Process],
        min_runtime_version: None,
        created_epoch_ms: 0,
    }
}

#[test]
fn latest_version_is_last_appended() {
    let pack = Pack::builder().versions(vec![meta("1.0.0"), meta("1.1.0")]).build();
    assert_eq!(pack.latest_version().unwrap().version, "1.1.0");
}

#[test]
fn version_lookup_finds_by_string() {
    let pack = Pack::builder().versions(vec![meta("1.0.0"), meta("1.1.0")]).build();
    assert!(pack.version("1.0.0").is_some());
    assert!(pack.version("2.0.0").is_none());
}

#[test]
fn private_pack_is_only_accessible_from_owning_namespace() {
    let pack = Pack::builder().namespace(Namespace::new("team-a")).visibility(Visibility::Private).build();
    assert!(pack.accessible_from(&Namespace::new("team-a")));
    assert!(!pack.accessible_from(&Namespace::new("team-b")));
}

#[test]
fn public_pack_is_accessible_from_any_namespace() {
    let pack = Pack::builder().namespace(Namespace::new("team-a")).visibility(Visibility::Public).build();
    assert!(pack.accessible_from(&Namespace::new("team-b")));
}
