//! Detector cascade (C5).
//!
//! Runs the median, tail, directionality, Mann-Whitney, and bootstrap-CI
//! detectors against an admitted baseline/target pair and a `ThresholdSet`.
//! Combination into a terminal verdict is the verdict reducer's job (C6);
//! this module only produces the individual `DetectorOutcome`s plus the raw
//! metrics the reducer and the JSON `details` payload both need.

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stats::{self, Sample};
use crate::tail;
use crate::thresholds::ThresholdSet;

/// Outcome of a single detector (`spec.md` §3 `DetectorOutcome`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DetectorOutcome {
    Pass,
    Fail { reason: String, magnitude: f64 },
}

impl DetectorOutcome {
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

/// Every metric and per-detector outcome computed for one admitted pair,
/// enough to drive both the verdict reducer and the JSON `details` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeMetrics {
    pub baseline_median_ms: f64,
    pub target_median_ms: f64,
    pub median_delta_ms: f64,
    pub baseline_tail_ms: f64,
    pub target_tail_ms: f64,
    pub tail_delta_ms: f64,
    pub tail_k: usize,
    pub directionality_frac: f64,
    pub mann_whitney_u: f64,
    pub mann_whitney_p: f64,
    pub prob_target_gt_baseline: f64,
    pub bootstrap_ci_low_ms: f64,
    pub bootstrap_ci_high_ms: f64,
    pub bootstrap_point_ms: f64,

    pub median_outcome: DetectorOutcome,
    pub tail_outcome: DetectorOutcome,
    pub mann_whitney_outcome: DetectorOutcome,
}

/// Run every detector in the fixed, spec-mandated order: median, tail,
/// directionality, Mann-Whitney, bootstrap CI.
pub fn run(
    b: &Sample,
    t: &Sample,
    thresholds: &ThresholdSet,
    cfg: &GateConfig,
) -> Result<CascadeMetrics, GateError> {
    use crate::config::defaults::{TAIL_METRIC_K_MAX, TAIL_METRIC_K_MIN, TAIL_METRIC_K_PCT};

    let baseline_median_ms = stats::median(b)?;
    let target_median_ms = stats::median(t)?;
    let median_delta_ms = target_median_ms - baseline_median_ms;
    let median_outcome = if median_delta_ms > thresholds.median_threshold_ms {
        DetectorOutcome::Fail {
            reason: "median".to_string(),
            magnitude: median_delta_ms,
        }
    } else {
        DetectorOutcome::Pass
    };

    let baseline_tail_ms = tail::tail_stat(b, TAIL_METRIC_K_PCT, TAIL_METRIC_K_MIN, TAIL_METRIC_K_MAX)?;
    let target_tail_ms = tail::tail_stat(t, TAIL_METRIC_K_PCT, TAIL_METRIC_K_MIN, TAIL_METRIC_K_MAX)?;
    let tail_delta_ms = target_tail_ms - baseline_tail_ms;
    let tail_k = tail::tail_k(t.len(), TAIL_METRIC_K_PCT, TAIL_METRIC_K_MIN, TAIL_METRIC_K_MAX);
    let tail_outcome = if tail_delta_ms > thresholds.tail_threshold_ms {
        DetectorOutcome::Fail {
            reason: "tail".to_string(),
            magnitude: tail_delta_ms,
        }
    } else {
        DetectorOutcome::Pass
    };

    // Directionality: informational only (spec.md §9 open question a).
    let directionality_frac = if t.is_empty() {
        0.0
    } else {
        t.iter().filter(|&&x| x > baseline_median_ms).count() as f64 / t.len() as f64
    };

    let rank_sum = stats::rank_sum_u(b, t)?;
    let mann_whitney_outcome = if cfg.no_mann_whitney {
        DetectorOutcome::Pass
    } else if rank_sum.p_greater < cfg.mann_whitney_alpha
        && rank_sum.prob_t_gt_b >= cfg.effect_floor_prob
    {
        DetectorOutcome::Fail {
            reason: "mw".to_string(),
            magnitude: rank_sum.prob_t_gt_b,
        }
    } else {
        DetectorOutcome::Pass
    };

    let (bootstrap_ci_low_ms, bootstrap_ci_high_ms, bootstrap_point_ms) =
        stats::bootstrap_median_diff(b, t, cfg.bootstrap_b, cfg.bootstrap_alpha, cfg.seed)?;

    Ok(CascadeMetrics {
        baseline_median_ms,
        target_median_ms,
        median_delta_ms,
        baseline_tail_ms,
        target_tail_ms,
        tail_delta_ms,
        tail_k,
        directionality_frac,
        mann_whitney_u: rank_sum.u_target,
        mann_whitney_p: rank_sum.p_greater,
        prob_target_gt_baseline: rank_sum.prob_t_gt_b,
        bootstrap_ci_low_ms,
        bootstrap_ci_high_ms,
        bootstrap_point_ms,
        median_outcome,
        tail_outcome,
        mann_whitney_outcome,
    })
}
