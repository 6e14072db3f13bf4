//! Error taxonomy for the gating engine.
//!
//! Mirrors `spec.md` §7: most variants are recoverable and are converted
//! into an `INCONCLUSIVE` `GateResult` by the orchestrator rather than
//! propagated as hard failures. Only `SchemaError` aborts a whole run.

use thiserror::Error;

/// Errors produced while computing a single gate verdict.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateError {
    /// Non-numeric, negative, NaN, infinite, or empty sample.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `n < MIN_N` for one of the two samples.
    #[error("insufficient data: n={n} < minimum {min}")]
    InsufficientData { n: usize, min: usize },

    /// `cv(sample) > CV_MAX_PCT`.
    #[error("unreliable data: cv={cv_pct:.2}% exceeds maximum {max:.2}%")]
    UnreliableData { cv_pct: f64, max: f64 },

    /// Unexpected numeric failure (e.g. degenerate all-equal sample feeding
    /// a ratio that divides by zero downstream of what the caller checked).
    #[error("internal error: {0}")]
    InternalError(String),

    /// Malformed input document. Fatal at the CLI boundary (exit 2).
    #[error("schema error: {0}")]
    SchemaError(String),
}

impl GateError {
    /// The machine-readable token used in `GateResult::reason` and logs.
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InsufficientData { .. } => "TOO_FEW_SAMPLES",
            Self::UnreliableData { .. } => "HIGH_CV",
            Self::InternalError(_) => "INTERNAL_ERROR",
            Self::SchemaError(_) => "SCHEMA_ERROR",
        }
    }
}
