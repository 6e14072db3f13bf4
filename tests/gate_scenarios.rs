//! End-to-end scenarios for the verdict reducer, driven through
//! `perfgate::run_gate` only.

use perfgate::{run_gate, GateConfig, Mode, Status};

fn cfg() -> GateConfig {
    GateConfig::default()
}

#[test]
fn negligible_regression_is_overridden_to_pass() {
    let b = vec![2400.0; 12];
    let t = vec![2402.0; 12];
    let r = run_gate(&b, &t, &cfg()).unwrap();
    assert_eq!(r.status, Status::Pass);
}

#[test]
fn clear_regression_fails_with_median_reason() {
    let b = vec![100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0, 100.0, 102.0, 101.0];
    let t = vec![120.0, 122.0, 118.0, 121.0, 119.0, 123.0, 117.0, 120.0, 122.0, 121.0];
    let r = run_gate(&b, &t, &cfg()).unwrap();
    assert_eq!(r.status, Status::Fail);
    assert!(r.reason.contains("MEDIAN"));
}

#[test]
fn high_variance_pair_is_inconclusive_and_skips_detectors() {
    let b = vec![100.0, 95.0, 180.0, 90.0, 85.0, 100.0, 95.0, 180.0, 90.0, 85.0];
    let t = b.clone();
    let r = run_gate(&b, &t, &cfg()).unwrap();
    assert_eq!(r.status, Status::Inconclusive);
    assert!(r.metrics.is_none());
}

#[test]
fn improvement_is_never_a_failure() {
    let b = vec![200.0; 12];
    let t = vec![160.0; 12];
    let r = run_gate(&b, &t, &cfg()).unwrap();
    assert_ne!(r.status, Status::Fail);
}

#[test]
fn release_mode_passes_within_equivalence_margin() {
    let mut c = cfg();
    c.mode = Mode::Release;
    c.equivalence_margin_ms = 30.0;
    let b = vec![1000.0; 20];
    let t = vec![1008.0; 20];
    let r = run_gate(&b, &t, &c).unwrap();
    assert_eq!(r.status, Status::Pass);
}

#[test]
fn release_mode_fails_outside_equivalence_margin() {
    let mut c = cfg();
    c.mode = Mode::Release;
    c.equivalence_margin_ms = 5.0;
    let b = vec![1000.0, 1005.0, 995.0, 1010.0, 990.0, 1000.0, 1005.0, 995.0, 1010.0, 990.0, 1000.0, 1005.0, 995.0, 1010.0, 990.0, 1000.0, 1005.0, 995.0, 1010.0, 990.0];
    let t = vec![1200.0, 1205.0, 1195.0, 1210.0, 1190.0, 1200.0, 1205.0, 1195.0, 1210.0, 1190.0, 1200.0, 1205.0, 1195.0, 1210.0, 1190.0, 1200.0, 1205.0, 1195.0, 1210.0, 1190.0];
    let r = run_gate(&b, &t, &c).unwrap();
    assert_eq!(r.status, Status::Fail);
}

#[test]
fn to_json_round_trips_through_serde() {
    let b = vec![100.0; 12];
    let t = vec![101.0; 12];
    let r = run_gate(&b, &t, &cfg()).unwrap();
    let json = r.to_json("checkout_latency", 12, 12);
    let serialized = serde_json::to_string(&json).unwrap();
    let back: perfgate::GateResultJson = serde_json::from_str(&serialized).unwrap();
    assert_eq!(back.name, "checkout_latency");
    assert_eq!(back.status, r.status);
}
