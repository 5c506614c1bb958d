//! Run manifest export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tradelens_core::{PerformanceSummary, PipelineReport};

use crate::config::AnalysisConfig;
use crate::runner::AnalysisResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub config_hash: String,
    pub dataset_hash: String,
    pub config: AnalysisConfig,
    pub summary: PerformanceSummary,
    pub report: PipelineReport,
}

impl RunManifest {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            schema_version: result.schema_version,
            run_id: result.run_id.clone(),
            timestamp: chrono::Utc::now(),
            source: result.source.clone(),
            config_hash: result.config_hash.clone(),
            dataset_hash: result.dataset_hash.clone(),
            config: result.config.clone(),
            summary: result.output.summary.clone(),
            report: result.output.report.clone(),
        }
    }
}

pub fn write_manifest(path: &Path, result: &AnalysisResult) -> Result<()> {
    let manifest = RunManifest::from_result(result);
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
