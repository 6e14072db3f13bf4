//! Gate configuration.
//!
//! `spec.md` §9 is explicit that configuration here is "value parameters
//! threaded through the gate call; no process-wide mutable configuration."
//! `GateConfig` is therefore a plain, `Clone`-able value built once (by the
//! CLI, or by a test) and passed by reference into every gate call — unlike
//! the teacher's `config::get()` global, there is no `OnceLock` here.

pub mod defaults;

use serde::{Deserialize, Serialize};

/// Which combination rule the verdict reducer applies (§4.5 vs §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// PR-mode cascade: median/tail/Mann-Whitney detectors with practical override.
    Pr,
    /// Release-mode equivalence check (TOST on the bootstrap CI).
    Release,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Pr
    }
}

/// All tunable parameters for a single gate invocation.
///
/// Every field has a default drawn from `spec.md` §6; the CLI overrides a
/// subset of them from flags (see `main.rs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub mode: Mode,

    // Data-quality gate (C2)
    pub min_n: usize,
    pub cv_max_pct: f64,

    // Threshold engine (C3)
    pub ms_floor: f64,
    pub pct_floor: f64,
    pub tail_ms_floor: f64,
    pub tail_pct_floor: f64,
    pub practical_pct: f64,
    pub practical_min_ms: f64,
    pub practical_max_ms: f64,

    // Detector cascade (C5)
    pub mann_whitney_alpha: f64,
    pub effect_floor_prob: f64,
    pub no_mann_whitney: bool,
    /// Informational threshold surfaced alongside `directionality_frac`; it
    /// never gates the verdict (spec.md §4.5 point 3, §9 open question a).
    pub directionality_threshold: f64,

    // Bootstrap (C1, C6)
    pub bootstrap_b: usize,
    pub bootstrap_alpha: f64,
    pub seed: u64,

    // Release mode (C6)
    pub equivalence_margin_ms: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        use defaults::*;
        Self {
            mode: Mode::Pr,
            min_n: MIN_N,
            cv_max_pct: CV_MAX_PCT,
            ms_floor: MS_FLOOR,
            pct_floor: PCT_FLOOR,
            tail_ms_floor: TAIL_MS_FLOOR,
            tail_pct_floor: TAIL_PCT_FLOOR,
            practical_pct: PRACTICAL_PCT,
            practical_min_ms: PRACTICAL_MIN_MS,
            practical_max_ms: PRACTICAL_MAX_MS,
            mann_whitney_alpha: ALPHA,
            effect_floor_prob: EFFECT_FLOOR_PROB,
            no_mann_whitney: false,
            directionality_threshold: 0.5,
            bootstrap_b: BOOTSTRAP_B,
            bootstrap_alpha: BOOTSTRAP_ALPHA,
            seed: SEED,
            equivalence_margin_ms: EQUIVALENCE_MARGIN_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let cfg = GateConfig::default();
        assert_eq!(cfg.min_n, 10);
        assert!((cfg.cv_max_pct - 15.0).abs() < f64::EPSILON);
        assert!((cfg.ms_floor - 5.0).abs() < f64::EPSILON);
        assert!((cfg.equivalence_margin_ms - 30.0).abs() < f64::EPSILON);
        assert_eq!(cfg.bootstrap_b, 5000);
        assert_eq!(cfg.seed, 0);
    }
}
