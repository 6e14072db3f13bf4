//! Threshold engine (C3).
//!
//! Derives the `ThresholdSet` for a baseline sample: a fixed floor and a
//! relative floor compete for each of the median and tail thresholds, with
//! the stricter (larger) of the two regimes active. No CV multiplier is
//! applied — variance is handled upstream by the quality gate (§4.3
//! rationale): high CV yields `INCONCLUSIVE` rather than relaxed
//! thresholds.

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;

/// Derived, immutable-once-computed threshold set (`spec.md` §3).
///
/// `tail_practical_threshold_ms` is not named in §3's `ThresholdSet`
/// formula, but the JSON result schema (§6) and the override algebra (I3)
/// both need a tail-scale counterpart to `practical_threshold_ms`. This
/// crate derives it the same way — `PRACTICAL_PCT` of the baseline's tail
/// statistic, clamped to the same bounds — so the median and tail branches
/// of the override stay symmetric (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub median_threshold_ms: f64,
    pub tail_threshold_ms: f64,
    pub practical_threshold_ms: f64,
    pub tail_practical_threshold_ms: f64,
    /// Informational only (spec.md §9 open question a); carried through from
    /// `cfg.directionality_threshold` so it's surfaced in the JSON `details`
    /// alongside the `directionality_frac` it's compared against by eye.
    pub directionality_threshold: f64,
}

/// Compute the `ThresholdSet` from the baseline's median and tail statistic.
#[must_use]
pub fn compute(baseline_median: f64, baseline_tail_stat: f64, cfg: &GateConfig) -> ThresholdSet {
    let median_threshold_ms = f64::max(cfg.ms_floor, cfg.pct_floor * baseline_median);
    let tail_threshold_ms = f64::max(cfg.tail_ms_floor, cfg.tail_pct_floor * baseline_tail_stat);
    let practical_threshold_ms =
        (baseline_median * cfg.practical_pct).clamp(cfg.practical_min_ms, cfg.practical_max_ms);
    let tail_practical_threshold_ms =
        (baseline_tail_stat * cfg.practical_pct).clamp(cfg.practical_min_ms, cfg.practical_max_ms);

    ThresholdSet {
        median_threshold_ms,
        tail_threshold_ms,
        practical_threshold_ms,
        tail_practical_threshold_ms,
        directionality_threshold: cfg.directionality_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_operation_uses_fixed_floor() {
        let cfg = GateConfig::default();
        // baseline median of 10ms: 3% of 10 = 0.3ms, well below the 5ms floor.
        let t = compute(10.0, 150.0, &cfg);
        assert_eq!(t.median_threshold_ms, 5.0);
    }

    #[test]
    fn slow_operation_uses_relative_floor() {
        let cfg = GateConfig::default();
        // baseline median of 10_000ms: 3% = 300ms, well above the 5ms floor.
        let t = compute(10_000.0, 150.0, &cfg);
        assert_eq!(t.median_threshold_ms, 300.0);
    }

    #[test]
    fn practical_threshold_is_clamped() {
        let cfg = GateConfig::default();
        // median 50ms: 1% = 0.5ms, clamped up to the 2ms minimum.
        let low = compute(50.0, 150.0, &cfg);
        assert_eq!(low.practical_threshold_ms, 2.0);
        // median 5_000ms: 1% = 50ms, clamped down to the 20ms maximum.
        let high = compute(5_000.0, 150.0, &cfg);
        assert_eq!(high.practical_threshold_ms, 20.0);
    }

    #[test]
    fn tail_threshold_max_of_floor_and_percent() {
        let cfg = GateConfig::default();
        let t = compute(100.0, 2000.0, &cfg);
        // 5% of 2000 = 100, above the 75ms floor.
        assert_eq!(t.tail_threshold_ms, 100.0);
    }
}
