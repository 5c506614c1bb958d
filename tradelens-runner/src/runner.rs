//! Analysis runner — wires ingestion, fingerprinting, and the core pipeline.
//!
//! Two entry points:
//! - `run_analysis()`: loads the execution log from disk, then runs. Used by CLI.
//! - `analyze_legs()`: takes already-loaded records. Used by tests and callers
//!   with their own source.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use tradelens_core::{run_pipeline, PipelineError, PipelineOutput};

use crate::config::{AnalysisConfig, ConfigError};
use crate::fingerprint::{dataset_hash, run_dir_name, run_id};
use crate::ingest::{load_legs, LoadError, LoadedLegs};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    /// Where the records came from (file path or caller label).
    pub source: String,
    pub config: AnalysisConfig,
    pub config_hash: String,
    pub dataset_hash: String,
    pub output: PipelineOutput,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load an execution log and analyze it.
pub fn run_analysis(input: &Path, config: &AnalysisConfig) -> Result<AnalysisResult, RunError> {
    let loaded = load_legs(input, &config.columns)?;
    analyze_legs(loaded, input.display().to_string(), config)
}

/// Analyze records that are already in memory. Does no I/O.
///
/// Rows the loader could not read are folded into the report's parse errors,
/// so the counts cover the whole input.
pub fn analyze_legs(
    loaded: LoadedLegs,
    source: String,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, RunError> {
    let dataset_hash = dataset_hash(&loaded.legs);
    let config_hash = config.config_hash()?;
    let run_id = run_id(&config_hash, &dataset_hash);
    let unreadable = loaded.unreadable.len();

    let mut output = match run_pipeline(&loaded.legs, &config.pipeline_options()) {
        Ok(output) => output,
        Err(PipelineError::NoTrades {
            legs,
            rejected,
            unmatched,
            duplicates,
        }) => {
            return Err(RunError::Pipeline(PipelineError::NoTrades {
                legs: legs + unreadable,
                rejected: rejected + unreadable,
                unmatched,
                duplicates,
            }))
        }
    };

    if unreadable > 0 {
        let report = &mut output.report;
        report.input_rows += unreadable;
        report.parse_errors.extend(loaded.unreadable);
        report.parse_errors.sort_by_key(|e| e.row());
    }

    info!(
        run_id = %run_dir_name(&run_id),
        source = %source,
        trades = output.report.matched_trades,
        skipped = output.report.skipped_rows(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        source,
        config: config.clone(),
        config_hash,
        dataset_hash,
        output,
    })
}
