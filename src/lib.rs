//! perfgate: statistical performance-regression gating for CI pipelines.
//!
//! Given a baseline and a target sample of timing measurements per named
//! trace, decides whether the target represents a regression, an
//! improvement, no significant change, or an inconclusive result due to
//! insufficient or noisy data.
//!
//! ## Pipeline
//!
//! - [`quality`]: data-quality pre-gate (sample size, coefficient of
//!   variation, outlier fraction).
//! - [`stats`]: percentile/median, Mann-Whitney U, bootstrap resampling.
//! - [`tail`]: adaptive tail statistic (trimmed mean of the worst-k samples).
//! - [`thresholds`]: per-trace threshold engine (median/tail/practical).
//! - [`detectors`]: the fixed-order detector cascade.
//! - [`gate`]: the verdict reducer tying C2-C5 together into one result.
//! - [`orchestrator`]: multi-trace fan-out, input parsing, aggregate exit
//!   status.

pub mod config;
pub mod detectors;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod quality;
pub mod schema;
pub mod stats;
pub mod tail;
pub mod thresholds;

pub use config::{GateConfig, Mode};
pub use error::GateError;
pub use gate::{run_gate, GateResult, ReasonCode, Status};
pub use orchestrator::{parse_document, run_all, RunOutcome, TraceVerdict};
pub use quality::{AdmissionDecision, QualityIssue, QualityReport};
pub use schema::{Details, GateResultJson, InputDocument, TraceInput};
