// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn toleration_matches_key_and_effect() {
    let taint = Taint::new("gpu", TaintEffect::NoSchedule);
    let tol = Toleration { key: "gpu".into(), value: None, effect: Some(TaintEffect::NoSchedule) };
    assert!(tol.tolerates(&taint));
}

#[test]
fn toleration_with_no_effect_tolerates_any_effect() {
    let taint = Taint::new("gpu", TaintEffect::NoExecute);
    let tol = Toleration { key: "gpu".into(), value: None, effect: None };
    assert!(tol.tolerates(&taint));
}

#[test]
fn toleration_rejects_mismatched_key() {
    let taint = Taint::new("gpu", TaintEffect::NoSchedule);
    let tol = Toleration { key: "disk".into(), value: None, effect: None };
    assert!(!tol.tolerates(&taint));
}

#[test]
fn toleration_rejects_mismatched_value() {
    let mut taint = Taint::new("gpu", TaintEffect::NoSchedule);
    taint.value = Some("a100".to_string());
    let tol = Toleration {
        key: "gpu".into(),
        value: Some("v100".to_string()),
        effect: None,
    };
    assert!(!tol.tolerates(&taint));
}

#[test]
fn prefer_no_schedule_is_not_blocking() {
    assert!(!TaintEffect::PreferNoSchedule.is_blocking());
    assert!(TaintEffect::NoSchedule.is_blocking());
    assert!(TaintEffect::NoExecute.is_blocking());
}

#[test]
fn tolerates_all_blocking_ignores_advisory_taints() {
    let taints = vec![Taint::new("region", TaintEffect::PreferNoSchedule)];
    assert!(tolerates_all_blocking(&taints, &[]));
}

#[test]
fn tolerates_all_blocking_requires_coverage_of_every_blocking_taint() {
    let taints =
        vec![Taint::new("gpu", TaintEffect::NoSchedule), Taint::new("disk", TaintEffect::NoExecute)];
    let tolerations = vec![Toleration { key: "gpu".into(), value: None, effect: None }];
    assert!(!tolerates_all_blocking(&taints, &tolerations));

    let tolerations = vec![
        Toleration { key: "gpu".into(), value: None, effect: None },
        Toleration { key: "disk".into(), value: None, effect: None },
    ];
    assert!(tolerates_all_blocking(&taints, &tolerations));
}
