//! perfgate - statistical performance-regression gate for CI pipelines.
//!
//! # Usage
//!
//! ```bash
//! perfgate baseline.json target.json --mode pr
//! perfgate baseline.json target.json --mode release --equivalence-margin-ms 20
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (default: info)

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use perfgate::config::{GateConfig, Mode};
use perfgate::orchestrator;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "perfgate")]
#[command(about = "Statistical performance-regression gate for CI pipelines")]
#[command(version)]
struct CliArgs {
    /// Path to the baseline input document (JSON).
    baseline: PathBuf,

    /// Path to the target input document (JSON).
    target: PathBuf,

    /// Write a `results.json` array of per-trace results into this directory,
    /// in addition to the newline-delimited JSON written to stdout.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Gating mode: `pr` runs the detector cascade, `release` runs the
    /// equivalence check.
    #[arg(long, value_enum, default_value = "pr")]
    mode: CliMode,

    /// Minimum detectable median delta, in milliseconds.
    #[arg(long)]
    ms_floor: Option<f64>,

    /// Minimum detectable median delta, as a fraction of the baseline median.
    #[arg(long)]
    pct_floor: Option<f64>,

    /// Minimum detectable tail delta, in milliseconds.
    #[arg(long)]
    tail_ms_floor: Option<f64>,

    /// Minimum detectable tail delta, as a fraction of the baseline tail statistic.
    #[arg(long)]
    tail_pct_floor: Option<f64>,

    /// Fraction of target samples that must exceed the baseline median for
    /// the directionality check to corroborate a regression.
    #[arg(long)]
    directionality: Option<f64>,

    /// Significance level for the Mann-Whitney U test.
    #[arg(long)]
    mann_whitney_alpha: Option<f64>,

    /// Skip the Mann-Whitney detector entirely.
    #[arg(long)]
    no_mann_whitney: bool,

    /// Equivalence margin for release mode, in milliseconds.
    #[arg(long)]
    equivalence_margin_ms: Option<f64>,

    /// Master PRNG seed for the bootstrap; per-trace seeds are derived from it.
    #[arg(long, env = "PERFGATE_SEED")]
    seed: Option<u64>,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum CliMode {
    Pr,
    Release,
}

impl From<CliMode> for Mode {
    fn from(m: CliMode) -> Self {
        match m {
            CliMode::Pr => Mode::Pr,
            CliMode::Release => Mode::Release,
        }
    }
}

impl CliArgs {
    fn to_gate_config(&self) -> GateConfig {
        let mut cfg = GateConfig {
            mode: self.mode.into(),
            no_mann_whitney: self.no_mann_whitney,
            ..GateConfig::default()
        };
        if let Some(v) = self.ms_floor {
            cfg.ms_floor = v;
        }
        if let Some(v) = self.pct_floor {
            cfg.pct_floor = v;
        }
        if let Some(v) = self.tail_ms_floor {
            cfg.tail_ms_floor = v;
        }
        if let Some(v) = self.tail_pct_floor {
            cfg.tail_pct_floor = v;
        }
        if let Some(v) = self.directionality {
            cfg.directionality_threshold = v;
        }
        if let Some(v) = self.mann_whitney_alpha {
            cfg.mann_whitney_alpha = v;
        }
        if let Some(v) = self.equivalence_margin_ms {
            cfg.equivalence_margin_ms = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        cfg
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let cfg = args.to_gate_config();

    let baseline_raw = fs::read_to_string(&args.baseline)
        .with_context(|| format!("reading baseline document {}", args.baseline.display()))?;
    let target_raw = fs::read_to_string(&args.target)
        .with_context(|| format!("reading target document {}", args.target.display()))?;

    let baseline = match orchestrator::parse_document(&baseline_raw) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: baseline document: {e}");
            return Ok(ExitCode::from(2));
        }
    };
    let target = match orchestrator::parse_document(&target_raw) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: target document: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    let outcome = orchestrator::run_all(&baseline, &target, &cfg);
    let results = outcome.to_json();

    for result in &results {
        println!("{}", serde_json::to_string(result)?);
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let path = dir.join("results.json");
        fs::write(&path, serde_json::to_string_pretty(&results)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let pass = results.iter().filter(|r| r.status == perfgate::Status::Pass).count();
    let fail = results.iter().filter(|r| r.status == perfgate::Status::Fail).count();
    let no_change = results.iter().filter(|r| r.status == perfgate::Status::NoChange).count();
    let inconclusive = results.iter().filter(|r| r.status == perfgate::Status::Inconclusive).count();

    info!(
        "{} traces: {} pass, {} fail, {} no-change, {} inconclusive, {} missing",
        results.len(),
        pass,
        fail,
        no_change,
        inconclusive,
        outcome.missing.len()
    );

    Ok(ExitCode::from(u8::try_from(outcome.exit_code()).unwrap_or(1)))
}
