//! Multi-trace orchestrator (C7).
//!
//! Parses baseline and target input documents, matches traces by name, runs
//! the gate per intersected pair, and reduces the per-trace results into one
//! aggregate exit status. Per `spec.md` §4.7, processing is in sorted-name
//! order for deterministic report layout; fan-out across traces is
//! embarrassingly parallel (here via `rayon`) since each gate call is pure
//! over its inputs and owns its own derived PRNG seed.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{self, GateResult, Status};
use crate::schema::{GateResultJson, InputDocument};

/// A single trace's verdict plus the name it was keyed by.
pub struct TraceVerdict {
    pub name: String,
    pub result: GateResult,
    pub n_baseline: usize,
    pub n_target: usize,
}

/// Outcome of running the orchestrator over two parsed documents.
pub struct RunOutcome {
    pub verdicts: Vec<TraceVerdict>,
    /// Trace names present on only one side (no verdict produced).
    pub missing: Vec<String>,
}

impl RunOutcome {
    /// §4.7 step 5: FAIL if any intersected trace is FAIL, else 0. Missing
    /// traces never affect the aggregate exit status. INCONCLUSIVE is not a
    /// failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.verdicts.iter().any(|v| v.result.status == Status::Fail) {
            1
        } else {
            0
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Vec<GateResultJson> {
        self.verdicts
            .iter()
            .map(|v| v.result.to_json(&v.name, v.n_baseline, v.n_target))
            .collect()
    }
}

/// Parse one side's JSON document, validating the §6 schema: non-empty,
/// unique trace names.
pub fn parse_document(raw: &str) -> Result<BTreeMap<String, Vec<f64>>, GateError> {
    let doc: InputDocument = serde_json::from_str(raw)
        .map_err(|e| GateError::SchemaError(format!("malformed input document: {e}")))?;

    let mut traces = BTreeMap::new();
    for trace in doc.traces {
        if trace.name.is_empty() {
            return Err(GateError::SchemaError(
                "trace with empty name".to_string(),
            ));
        }
        if trace.values.iter().any(|v| *v < 0.0) {
            return Err(GateError::SchemaError(format!(
                "trace '{}' contains a negative value",
                trace.name
            )));
        }
        if traces.insert(trace.name.clone(), trace.values).is_some() {
            return Err(GateError::SchemaError(format!(
                "duplicate trace name '{}'",
                trace.name
            )));
        }
    }
    Ok(traces)
}

/// Derive a per-trace PRNG seed deterministically from the master seed and
/// the trace name, so that two parallel gate calls never share a PRNG
/// stream while each trace's result stays reproducible for a fixed name
/// and master seed (`spec.md` §5, §9 "Randomness").
fn derive_seed(master_seed: u64, name: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    master_seed.hash(&mut hasher);
    name.hash(&mut hasher);
    hasher.finish()
}

/// Run the gate over every intersected trace name, in parallel, then
/// reassemble results in sorted-name order for deterministic report layout.
pub fn run_all(
    baseline: &BTreeMap<String, Vec<f64>>,
    target: &BTreeMap<String, Vec<f64>>,
    cfg: &GateConfig,
) -> RunOutcome {
    let baseline_names: BTreeSet<&String> = baseline.keys().collect();
    let target_names: BTreeSet<&String> = target.keys().collect();

    let intersected: Vec<&String> = baseline_names.intersection(&target_names).copied().collect();
    let missing: Vec<String> = baseline_names
        .symmetric_difference(&target_names)
        .map(|s| s.to_string())
        .collect();

    for name in &missing {
        warn!(trace = %name, "trace present on only one side, skipping");
    }

    let mut verdicts: Vec<TraceVerdict> = intersected
        .par_iter()
        .map(|&name| {
            let b = &baseline[name];
            let t = &target[name];
            let mut trace_cfg = cfg.clone();
            trace_cfg.seed = derive_seed(cfg.seed, name);

            let result = match gate::run_gate(b, t, &trace_cfg) {
                Ok(r) => r,
                Err(e) => {
                    warn!(trace = %name, error = %e, "internal error gating trace, marking inconclusive");
                    internal_error_result(&trace_cfg, e)
                }
            };
            info!(
                trace = %name,
                status = ?result.status,
                "gated trace"
            );
            TraceVerdict {
                name: name.to_string(),
                n_baseline: b.len(),
                n_target: t.len(),
                result,
            }
        })
        .collect();

    verdicts.sort_by(|a, b| a.name.cmp(&b.name));

    RunOutcome { verdicts, missing }
}

fn internal_error_result(cfg: &GateConfig, err: GateError) -> GateResult {
    use crate::quality::QualityReport;
    GateResult {
        status: Status::Inconclusive,
        reason: format!("{}: {err}", crate::gate::ReasonCode::InternalError),
        inconclusive: true,
        quality_baseline: QualityReport {
            n: 0,
            mean: 0.0,
            cv_pct: 0.0,
            outlier_count: 0,
            quality_score: 0.0,
            issues: Default::default(),
        },
        quality_target: QualityReport {
            n: 0,
            mean: 0.0,
            cv_pct: 0.0,
            outlier_count: 0,
            quality_score: 0.0,
            issues: Default::default(),
        },
        mode: cfg.mode,
        metrics: None,
        thresholds: None,
        overrides: Vec::new(),
    }
}
