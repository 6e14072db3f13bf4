//! Default constants for the gating engine.
//!
//! Centralises the magic numbers named in `spec.md` §6, grouped by the
//! component that consumes them.

// ============================================================================
// Data-quality gate (C2)
// ============================================================================

/// Minimum sample size admitted past the quality gate.
pub const MIN_N: usize = 10;

/// Maximum coefficient of variation (percent) admitted past the quality gate.
pub const CV_MAX_PCT: f64 = 15.0;

/// IQR outlier fence multiplier: points outside `[Q1 - k*IQR, Q3 + k*IQR]`.
pub const IQR_OUTLIER_K: f64 = 1.5;

/// Fraction of a sample that must be IQR-outliers to trigger `MANY_OUTLIERS`.
pub const OUTLIER_FRACTION_MAX: f64 = 0.10;

/// Quality-score penalty for `TOO_FEW_SAMPLES`.
pub const QUALITY_PENALTY_TOO_FEW_SAMPLES: f64 = 40.0;

/// Quality-score penalty for `HIGH_CV`.
pub const QUALITY_PENALTY_HIGH_CV: f64 = 30.0;

/// Quality-score penalty for `MANY_OUTLIERS`.
pub const QUALITY_PENALTY_MANY_OUTLIERS: f64 = 15.0;

// ============================================================================
// Threshold engine (C3)
// ============================================================================

/// Fixed floor for the median-delta threshold (ms).
pub const MS_FLOOR: f64 = 5.0;

/// Relative floor for the median-delta threshold, as a fraction of baseline median.
pub const PCT_FLOOR: f64 = 0.03;

/// Fixed floor for the tail-delta threshold (ms).
pub const TAIL_MS_FLOOR: f64 = 75.0;

/// Relative floor for the tail-delta threshold, as a fraction of baseline tail stat.
pub const TAIL_PCT_FLOOR: f64 = 0.05;

/// Fraction of baseline median used to derive the practical-significance threshold.
pub const PRACTICAL_PCT: f64 = 0.01;

/// Lower clamp for the practical-significance threshold (ms).
pub const PRACTICAL_MIN_MS: f64 = 2.0;

/// Upper clamp for the practical-significance threshold (ms).
pub const PRACTICAL_MAX_MS: f64 = 20.0;

// ============================================================================
// Tail statistic (C4)
// ============================================================================

/// Target fraction of a sample treated as "the tail".
pub const TAIL_METRIC_K_PCT: f64 = 0.10;

/// Minimum tail width, regardless of sample size.
pub const TAIL_METRIC_K_MIN: usize = 2;

/// Maximum tail width, regardless of sample size.
pub const TAIL_METRIC_K_MAX: usize = 5;

// ============================================================================
// Detector cascade (C5)
// ============================================================================

/// One-sided significance level for the Mann-Whitney U detector.
pub const ALPHA: f64 = 0.05;

/// Minimum P(T>B) required alongside significance for the Mann-Whitney detector to fire.
pub const EFFECT_FLOOR_PROB: f64 = 0.55;

/// Sample sizes at or below this use the exact Mann-Whitney null distribution.
pub const EXACT_MWU_MAX_N: usize = 20;

// ============================================================================
// Bootstrap CI (C1, C6)
// ============================================================================

/// Default bootstrap resample count.
pub const BOOTSTRAP_B: usize = 5000;

/// Default two-sided alpha for the bootstrap confidence interval.
pub const BOOTSTRAP_ALPHA: f64 = 0.05;

/// Default PRNG seed.
pub const SEED: u64 = 0;

// ============================================================================
// Release / equivalence mode (C6)
// ============================================================================

/// Equivalence margin (ms) for the TOST check in release mode.
pub const EQUIVALENCE_MARGIN_MS: f64 = 30.0;
