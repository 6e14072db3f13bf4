//! Verdict reducer (C6).
//!
//! Combines the quality gate (C2), threshold engine (C3), tail statistic
//! (C4), and detector cascade (C5) into the terminal `GateResult` per the
//! state machine in `spec.md` §4.6.

use serde::{Deserialize, Serialize};

use crate::config::{GateConfig, Mode};
use crate::detectors::{self, CascadeMetrics};
use crate::error::GateError;
use crate::quality::{self, QualityReport};
use crate::schema::{Details, GateResultJson};
use crate::stats::{self, Sample};
use crate::tail;
use crate::thresholds::{self, ThresholdSet};

/// Terminal verdict (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    Fail,
    NoChange,
    Inconclusive,
}

impl Status {
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Fail)
    }
}

/// Machine-readable reason token, the leading word of `GateResult::reason`.
///
/// Mirrors the teacher's `AnomalyLevel` (`baseline/mod.rs`): a closed enum
/// with a `Display` impl rendering the exact token a caller can match on,
/// rather than callers parsing the leading word out of a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    PracticalOverride,
    MedianRegression,
    TailRegression,
    MannWhitneyRegression,
    MannWhitneyTailRegression,
    TooFewSamples,
    HighCv,
    InternalError,
    NoSignificantChange,
    WithinNoise,
    Equivalent,
    NotEquivalent,
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::PracticalOverride => "PRACTICAL_OVERRIDE",
            Self::MedianRegression => "MEDIAN_REGRESSION",
            Self::TailRegression => "TAIL_REGRESSION",
            Self::MannWhitneyRegression => "MANN_WHITNEY_REGRESSION",
            Self::MannWhitneyTailRegression => "MANN_WHITNEY_TAIL_REGRESSION",
            Self::TooFewSamples => "TOO_FEW_SAMPLES",
            Self::HighCv => "HIGH_CV",
            Self::InternalError => "INTERNAL_ERROR",
            Self::NoSignificantChange => "NO_SIGNIFICANT_CHANGE",
            Self::WithinNoise => "WITHIN_NOISE",
            Self::Equivalent => "EQUIVALENT",
            Self::NotEquivalent => "NOT_EQUIVALENT",
        };
        write!(f, "{token}")
    }
}

/// The terminal result of gating one baseline/target pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub status: Status,
    pub reason: String,
    pub inconclusive: bool,
    pub quality_baseline: QualityReport,
    pub quality_target: QualityReport,
    pub mode: Mode,
    pub metrics: Option<CascadeMetrics>,
    pub thresholds: Option<ThresholdSet>,
    pub overrides: Vec<String>,
}

impl GateResult {
    /// Render the §6 JSON shape for a named trace.
    #[must_use]
    pub fn to_json(&self, name: &str, n_baseline: usize, n_target: usize) -> GateResultJson {
        let m = self.metrics.as_ref();
        let th = self.thresholds.as_ref();
        let details = Details {
            n_baseline,
            n_target,
            baseline_median_ms: m.map_or(0.0, |m| m.baseline_median_ms),
            target_median_ms: m.map_or(0.0, |m| m.target_median_ms),
            median_delta_ms: m.map_or(0.0, |m| m.median_delta_ms),
            median_threshold_ms: th.map_or(0.0, |t| t.median_threshold_ms),
            baseline_tail_ms: m.map_or(0.0, |m| m.baseline_tail_ms),
            target_tail_ms: m.map_or(0.0, |m| m.target_tail_ms),
            tail_delta_ms: m.map_or(0.0, |m| m.tail_delta_ms),
            tail_threshold_ms: th.map_or(0.0, |t| t.tail_threshold_ms),
            tail_k: m.map_or(0, |m| m.tail_k),
            directionality_frac: m.map_or(0.0, |m| m.directionality_frac),
            directionality_threshold: th.map_or(0.0, |t| t.directionality_threshold),
            mann_whitney_u: m.map_or(0.0, |m| m.mann_whitney_u),
            mann_whitney_p: m.map_or(1.0, |m| m.mann_whitney_p),
            prob_target_gt_baseline: m.map_or(0.5, |m| m.prob_target_gt_baseline),
            bootstrap_ci_low_ms: m.map_or(0.0, |m| m.bootstrap_ci_low_ms),
            bootstrap_ci_high_ms: m.map_or(0.0, |m| m.bootstrap_ci_high_ms),
            bootstrap_point_ms: m.map_or(0.0, |m| m.bootstrap_point_ms),
            practical_threshold_ms: th.map_or(0.0, |t| t.practical_threshold_ms),
            tail_practical_threshold_ms: th.map_or(0.0, |t| t.tail_practical_threshold_ms),
            quality_baseline: self.quality_baseline.clone(),
            quality_target: self.quality_target.clone(),
            mode: self.mode,
            overrides: self.overrides.clone(),
        };
        GateResultJson {
            name: name.to_string(),
            status: self.status,
            reason: self.reason.clone(),
            inconclusive: self.inconclusive,
            details,
        }
    }
}

fn inconclusive_result(
    reason: impl Into<String>,
    quality_baseline: QualityReport,
    quality_target: QualityReport,
    mode: Mode,
) -> GateResult {
    GateResult {
        status: Status::Inconclusive,
        reason: reason.into(),
        inconclusive: true,
        quality_baseline,
        quality_target,
        mode,
        metrics: None,
        thresholds: None,
        overrides: Vec::new(),
    }
}

/// Run the full gate pipeline for one baseline/target pair: C2 -> (C3/C4/C5
/// in series here, parallel is an implementation freedom) -> C6.
///
/// Invariant I1: if the quality gate does not admit the pair, the result is
/// fixed at `INCONCLUSIVE` and no detector runs.
pub fn run_gate(b: &Sample, t: &Sample, cfg: &GateConfig) -> Result<GateResult, GateError> {
    let admission = quality::admit(b, t, cfg)?;
    if !admission.admitted {
        let reason = if admission.baseline.issues.contains(&crate::quality::QualityIssue::TooFewSamples)
            || admission.target.issues.contains(&crate::quality::QualityIssue::TooFewSamples)
        {
            format!("{}: sample size below minimum", ReasonCode::TooFewSamples)
        } else {
            format!("{}: coefficient of variation exceeds maximum", ReasonCode::HighCv)
        };
        return Ok(inconclusive_result(
            reason,
            admission.baseline,
            admission.target,
            cfg.mode,
        ));
    }

    let baseline_median = stats::median(b)?;
    use crate::config::defaults::{TAIL_METRIC_K_MAX, TAIL_METRIC_K_MIN, TAIL_METRIC_K_PCT};
    let baseline_tail = tail::tail_stat(b, TAIL_METRIC_K_PCT, TAIL_METRIC_K_MIN, TAIL_METRIC_K_MAX)?;
    let th = thresholds::compute(baseline_median, baseline_tail, cfg);
    let metrics = detectors::run(b, t, &th, cfg)?;

    let (status, reason, overrides) = match cfg.mode {
        Mode::Pr => reduce_pr(&metrics, &th),
        Mode::Release => reduce_release(&metrics, cfg),
    };

    Ok(GateResult {
        status,
        reason,
        inconclusive: false,
        quality_baseline: admission.baseline,
        quality_target: admission.target,
        mode: cfg.mode,
        metrics: Some(metrics),
        thresholds: Some(th),
        overrides,
    })
}

/// PR-mode combination rule (§4.5). Returns `(status, reason, overrides)`.
fn reduce_pr(m: &CascadeMetrics, th: &ThresholdSet) -> (Status, String, Vec<String>) {
    let any_fail =
        m.median_outcome.is_fail() || m.tail_outcome.is_fail() || m.mann_whitney_outcome.is_fail();

    let within_practical =
        m.median_delta_ms.abs() < th.practical_threshold_ms && m.tail_delta_ms.abs() < th.tail_practical_threshold_ms;
    let within_practical_le =
        m.median_delta_ms.abs() <= th.practical_threshold_ms && m.tail_delta_ms.abs() <= th.tail_practical_threshold_ms;

    let (status, reason, overrides) = if any_fail {
        if within_practical_le {
            (
                Status::Pass,
                format!("{}: regression below practical-significance threshold", ReasonCode::PracticalOverride),
                vec![ReasonCode::PracticalOverride.to_string()],
            )
        } else {
            let code = if m.median_outcome.is_fail() {
                ReasonCode::MedianRegression
            } else if m.tail_outcome.is_fail() && m.mann_whitney_outcome.is_fail() {
                ReasonCode::MannWhitneyTailRegression
            } else if m.tail_outcome.is_fail() {
                ReasonCode::TailRegression
            } else {
                ReasonCode::MannWhitneyRegression
            };
            let reason = match code {
                ReasonCode::MedianRegression => format!("{code}: median delta {:.2}ms exceeds threshold {:.2}ms", m.median_delta_ms, th.median_threshold_ms),
                ReasonCode::MannWhitneyTailRegression => format!("{code}: tail delta {:.2}ms exceeds threshold {:.2}ms, corroborated by Mann-Whitney (p={:.4}, P(T>B)={:.2})", m.tail_delta_ms, th.tail_threshold_ms, m.mann_whitney_p, m.prob_target_gt_baseline),
                ReasonCode::TailRegression => format!("{code}: tail delta {:.2}ms exceeds threshold {:.2}ms", m.tail_delta_ms, th.tail_threshold_ms),
                _ => format!("{code}: p={:.4}, P(T>B)={:.2}", m.mann_whitney_p, m.prob_target_gt_baseline),
            };
            (Status::Fail, reason, Vec::new())
        }
    } else if within_practical {
        (
            Status::NoChange,
            format!("{}: deltas within practical-significance threshold", ReasonCode::NoSignificantChange),
            Vec::new(),
        )
    } else {
        (Status::Pass, format!("{}: no detector fired", ReasonCode::WithinNoise), Vec::new())
    };

    (status, reason, overrides)
}

/// Release-mode TOST/equivalence check (§4.6). Returns `(status, reason, overrides)`.
fn reduce_release(m: &CascadeMetrics, cfg: &GateConfig) -> (Status, String, Vec<String>) {
    let margin = cfg.equivalence_margin_ms;
    let equivalent = m.bootstrap_ci_low_ms > -margin && m.bootstrap_ci_high_ms < margin;
    let (status, reason) = if equivalent {
        (
            Status::Pass,
            format!(
                "{}: CI [{:.2}, {:.2}] within margin ±{:.2}ms",
                ReasonCode::Equivalent, m.bootstrap_ci_low_ms, m.bootstrap_ci_high_ms, margin
            ),
        )
    } else {
        (
            Status::Fail,
            format!(
                "{}: CI [{:.2}, {:.2}] exceeds margin ±{:.2}ms",
                ReasonCode::NotEquivalent, m.bootstrap_ci_low_ms, m.bootstrap_ci_high_ms, margin
            ),
        )
    };

    (status, reason, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GateConfig {
        GateConfig::default()
    }

    /// Scenario 1 (§8): negligible regression, override to PASS.
    #[test]
    fn scenario_negligible_regression_override() {
        let b = vec![2400.0; 10];
        let t = vec![2402.5; 10];
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_eq!(r.status, Status::Pass);
        assert!(r.reason.contains("PRACTICAL_OVERRIDE") || r.overrides.contains(&"PRACTICAL_OVERRIDE".to_string()));
    }

    /// Scenario 2 (§8): tail-only regression fails.
    #[test]
    fn scenario_tail_only_regression_fails() {
        let b = vec![100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 150.0];
        let t = vec![100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 350.0];
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_eq!(r.status, Status::Fail);
        assert!(r.reason.contains("TAIL"));
    }

    /// Scenario 3 (§8): high-variance -> INCONCLUSIVE.
    #[test]
    fn scenario_high_variance_inconclusive() {
        let b = vec![100.0, 95.0, 180.0, 90.0, 85.0, 100.0, 95.0, 180.0, 90.0, 85.0];
        let t = b.clone();
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_eq!(r.status, Status::Inconclusive);
        assert!(r.reason.contains("HIGH_CV"));
    }

    /// Scenario 4 (§8): clear improvement never fails.
    #[test]
    fn scenario_clear_improvement_passes() {
        let b = vec![200.0; 10];
        let t = vec![180.0; 10];
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_ne!(r.status, Status::Fail);
    }

    /// Scenario 5 (§8): clear regression, all detectors agree -> FAIL.
    #[test]
    fn scenario_clear_regression_fails() {
        let b = vec![100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0, 100.0, 102.0, 101.0];
        let t = vec![120.0, 122.0, 118.0, 121.0, 119.0, 123.0, 117.0, 120.0, 122.0, 121.0];
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_eq!(r.status, Status::Fail);
        assert!(r.reason.contains("MEDIAN"));
    }

    /// Scenario 6 (§8): release-mode equivalence.
    #[test]
    fn scenario_release_mode_equivalence() {
        let mut cfg = cfg();
        cfg.mode = Mode::Release;
        cfg.equivalence_margin_ms = 30.0;
        let b = vec![1000.0; 20];
        let t = vec![1010.0; 20];
        let r = run_gate(&b, &t, &cfg).unwrap();
        assert_eq!(r.status, Status::Pass);
    }

    #[test]
    fn negative_median_delta_never_fails() {
        // P1: improvement safety.
        let b = vec![500.0; 15];
        let t = vec![400.0; 15];
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_ne!(r.status, Status::Fail);
    }

    #[test]
    fn quality_gate_short_circuits_detectors() {
        // P2: inconclusive supremacy -- too few samples regardless of deltas.
        let b = vec![100.0; 5];
        let t = vec![500.0; 5];
        let r = run_gate(&b, &t, &cfg()).unwrap();
        assert_eq!(r.status, Status::Inconclusive);
        assert!(r.metrics.is_none());
    }
}
