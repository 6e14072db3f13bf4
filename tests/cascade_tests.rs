//! Integration coverage for the detector cascade, driven through the
//! public `perfgate` API end to end (threshold computation + detectors).

use perfgate::{detectors, tail, thresholds, GateConfig};
use perfgate::stats;

fn compute_thresholds(b: &[f64], cfg: &GateConfig) -> thresholds::ThresholdSet {
    let median = stats::median(b).unwrap();
    let tail_stat = tail::tail_stat(b, 0.10, 2, 5).unwrap();
    thresholds::compute(median, tail_stat, cfg)
}

#[test]
fn median_regression_above_threshold_fails_that_detector_only() {
    let b = vec![100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0, 100.0, 102.0, 101.0];
    let t = vec![120.0, 122.0, 118.0, 121.0, 119.0, 123.0, 117.0, 120.0, 122.0, 121.0];
    let cfg = GateConfig::default();
    let th = compute_thresholds(&b, &cfg);
    let metrics = detectors::run(&b, &t, &th, &cfg).unwrap();
    assert!(metrics.median_outcome.is_fail());
}

#[test]
fn matched_distributions_pass_every_detector() {
    let b: Vec<f64> = (0..40).map(|i| 100.0 + (i % 5) as f64).collect();
    let t = b.clone();
    let cfg = GateConfig::default();
    let th = compute_thresholds(&b, &cfg);
    let metrics = detectors::run(&b, &t, &th, &cfg).unwrap();
    assert!(!metrics.median_outcome.is_fail());
    assert!(!metrics.tail_outcome.is_fail());
    assert!(!metrics.mann_whitney_outcome.is_fail());
}

#[test]
fn no_mann_whitney_flag_disables_that_detector() {
    let b: Vec<f64> = (0..15).map(|i| i as f64).collect();
    let t: Vec<f64> = (0..15).map(|i| i as f64 + 50.0).collect();
    let mut cfg = GateConfig::default();
    cfg.no_mann_whitney = true;
    let th = compute_thresholds(&b, &cfg);
    let metrics = detectors::run(&b, &t, &th, &cfg).unwrap();
    assert!(!metrics.mann_whitney_outcome.is_fail());
}
