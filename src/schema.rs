//! Input/output JSON schema (`spec.md` §6).
//!
//! These types are the crate's only I/O boundary contract; everything else
//! in C1-C6 works over plain `&[f64]` samples. Unknown top-level fields in
//! the input document are ignored by `serde`'s default (non-`deny_unknown_fields`)
//! behavior; unknown per-trace fields are preserved opaquely via `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::gate::Status;
use crate::quality::QualityReport;

/// One named trace as it appears in an input document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceInput {
    pub name: String,
    pub values: Vec<f64>,
    /// Unknown per-trace fields, preserved but unused by the core.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Top-level input document (baseline and target share this shape).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputDocument {
    pub traces: Vec<TraceInput>,
    /// Unknown top-level fields, ignored by the core.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The `details` object of a per-trace gate result (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Details {
    pub n_baseline: usize,
    pub n_target: usize,
    pub baseline_median_ms: f64,
    pub target_median_ms: f64,
    pub median_delta_ms: f64,
    pub median_threshold_ms: f64,
    pub baseline_tail_ms: f64,
    pub target_tail_ms: f64,
    pub tail_delta_ms: f64,
    pub tail_threshold_ms: f64,
    pub tail_k: usize,
    pub directionality_frac: f64,
    pub directionality_threshold: f64,
    pub mann_whitney_u: f64,
    pub mann_whitney_p: f64,
    pub prob_target_gt_baseline: f64,
    pub bootstrap_ci_low_ms: f64,
    pub bootstrap_ci_high_ms: f64,
    pub bootstrap_point_ms: f64,
    pub practical_threshold_ms: f64,
    pub tail_practical_threshold_ms: f64,
    pub quality_baseline: QualityReport,
    pub quality_target: QualityReport,
    pub mode: Mode,
    pub overrides: Vec<String>,
}

/// The full per-trace gate result JSON object (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResultJson {
    pub name: String,
    pub status: Status,
    pub reason: String,
    pub inconclusive: bool,
    pub details: Details,
}
