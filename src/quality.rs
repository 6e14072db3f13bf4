//! Data-quality gate (C2).
//!
//! Screens a baseline/target pair for sample size and coefficient of
//! variation before any detector runs. Per `spec.md` invariant I1, if
//! either sample fails this gate the verdict is fixed at `INCONCLUSIVE`
//! and detectors are never consulted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stats::{self, Sample};

/// An issue flagged by the quality gate for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityIssue {
    TooFewSamples,
    HighCv,
    ManyOutliers,
}

impl QualityIssue {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::TooFewSamples => "TOO_FEW_SAMPLES",
            Self::HighCv => "HIGH_CV",
            Self::ManyOutliers => "MANY_OUTLIERS",
        }
    }
}

/// Per-sample quality record (`spec.md` §3 `QualityReport`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub n: usize,
    pub mean: f64,
    pub cv_pct: f64,
    pub outlier_count: usize,
    /// 0-100, informational only; never gates the verdict by itself.
    pub quality_score: f64,
    pub issues: BTreeSet<QualityIssue>,
}

impl QualityReport {
    /// Whether any issue in this report is severe enough to short-circuit
    /// the gate to `INCONCLUSIVE` (outliers alone never do, per §4.2 step 3).
    #[must_use]
    pub fn is_inconclusive(&self) -> bool {
        self.issues.contains(&QualityIssue::TooFewSamples)
            || self.issues.contains(&QualityIssue::HighCv)
    }
}

fn iqr_outlier_count(x: &Sample) -> Result<usize, GateError> {
    use crate::config::defaults::IQR_OUTLIER_K;
    let q1 = stats::percentile(x, 0.25)?;
    let q3 = stats::percentile(x, 0.75)?;
    let iqr = q3 - q1;
    let lo = q1 - IQR_OUTLIER_K * iqr;
    let hi = q3 + IQR_OUTLIER_K * iqr;
    Ok(x.iter().filter(|&&v| v < lo || v > hi).count())
}

/// Build a `QualityReport` for a single sample against `cfg`.
pub fn assess(x: &Sample, cfg: &GateConfig) -> Result<QualityReport, GateError> {
    use crate::config::defaults::{
        OUTLIER_FRACTION_MAX, QUALITY_PENALTY_HIGH_CV, QUALITY_PENALTY_MANY_OUTLIERS,
        QUALITY_PENALTY_TOO_FEW_SAMPLES,
    };

    let n = x.len();
    let mean = if n > 0 {
        x.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };

    let mut issues = BTreeSet::new();
    if n < cfg.min_n {
        issues.insert(QualityIssue::TooFewSamples);
    }

    // A sample too small or degenerate for CV/IQR math is still reported,
    // with TOO_FEW_SAMPLES already recorded above; don't let those numeric
    // errors mask the short-circuit with an InternalError.
    let cv_pct = stats::cv(x).unwrap_or(0.0);
    if cv_pct > cfg.cv_max_pct {
        issues.insert(QualityIssue::HighCv);
    }

    let outlier_count = if n >= 4 { iqr_outlier_count(x)? } else { 0 };
    if n > 0 && outlier_count as f64 / n as f64 > OUTLIER_FRACTION_MAX {
        issues.insert(QualityIssue::ManyOutliers);
    }

    let mut quality_score = 100.0;
    if issues.contains(&QualityIssue::TooFewSamples) {
        quality_score -= QUALITY_PENALTY_TOO_FEW_SAMPLES;
    }
    if issues.contains(&QualityIssue::HighCv) {
        quality_score -= QUALITY_PENALTY_HIGH_CV;
    }
    if issues.contains(&QualityIssue::ManyOutliers) {
        quality_score -= QUALITY_PENALTY_MANY_OUTLIERS;
    }
    quality_score = quality_score.max(0.0);

    Ok(QualityReport {
        n,
        mean,
        cv_pct,
        outlier_count,
        quality_score,
        issues,
    })
}

/// Outcome of gating a baseline/target pair through C2.
pub struct AdmissionDecision {
    pub baseline: QualityReport,
    pub target: QualityReport,
    pub admitted: bool,
}

/// Run the quality gate on both samples. Never short-circuits early on
/// outliers (§4.2 step 3); both reports are always fully computed.
pub fn admit(b: &Sample, t: &Sample, cfg: &GateConfig) -> Result<AdmissionDecision, GateError> {
    let baseline = assess(b, cfg)?;
    let target = assess(t, cfg)?;
    let admitted = !baseline.is_inconclusive() && !target.is_inconclusive();
    Ok(AdmissionDecision {
        baseline,
        target,
        admitted,
    })
}
