//! Artifact bundle for persisting run outputs.
//!
//! Layout: `{output_dir}/{run_id[..16]}/`
//! - `manifest.json` — config, hashes, summary, data-quality report
//! - `trades.csv`, `sequence.csv`, `capital.csv`, `hourly.csv`
//! - `series.json` — every chart series
//! - `trades.parquet` (optional)
//! - `report.md` (optional)
//! - `<series>.html` per chart (optional)

mod manifest;
mod trades;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use tradelens_core::export_series;

use crate::charts::HtmlChartSink;
use crate::config::OutputConfig;
use crate::export::{
    export_capital_csv, export_hourly_csv, export_sequence_csv, export_series_json,
    export_trades_csv, generate_report,
};
use crate::fingerprint::run_dir_name;
use crate::runner::AnalysisResult;

pub use manifest::{write_manifest, RunManifest};
pub use trades::{trades_dataframe, write_trades_parquet};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub trades_csv: PathBuf,
    pub sequence_csv: PathBuf,
    pub capital_csv: PathBuf,
    pub hourly_csv: PathBuf,
    pub series_json: PathBuf,
    pub trades_parquet: Option<PathBuf>,
    pub report_markdown: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Save the full artifact set for one analysis run.
///
/// Re-running with the same input and config writes into the same
/// directory, replacing the previous files.
pub fn save_artifacts(result: &AnalysisResult, output: &OutputConfig) -> Result<ArtifactPaths> {
    let run_dir = output.dir.join(run_dir_name(&result.run_id));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create artifact dir: {}", run_dir.display()))?;
    let out = &result.output;

    let manifest = run_dir.join("manifest.json");
    write_manifest(&manifest, result)?;

    let trades_csv = run_dir.join("trades.csv");
    write(&trades_csv, &export_trades_csv(&out.trades)?)?;

    let sequence_csv = run_dir.join("sequence.csv");
    write(&sequence_csv, &export_sequence_csv(&out.sequence)?)?;

    let capital_csv = run_dir.join("capital.csv");
    write(&capital_csv, &export_capital_csv(&out.sequence)?)?;

    let hourly_csv = run_dir.join("hourly.csv");
    write(&hourly_csv, &export_hourly_csv(&out.hourly)?)?;

    let series_json = run_dir.join("series.json");
    write(&series_json, &export_series_json(&out.series)?)?;

    let trades_parquet = if output.parquet {
        let path = run_dir.join("trades.parquet");
        write_trades_parquet(&path, &out.trades)?;
        Some(path)
    } else {
        None
    };

    let report_markdown = if output.report {
        let path = run_dir.join("report.md");
        write(&path, &generate_report(result))?;
        Some(path)
    } else {
        None
    };

    let charts = if output.charts {
        let mut sink = HtmlChartSink::new(&run_dir);
        export_series(&mut sink, &out.series)?;
        sink.into_written()
    } else {
        Vec::new()
    };

    info!(
        dir = %run_dir.display(),
        charts = charts.len(),
        parquet = trades_parquet.is_some(),
        "artifacts written"
    );

    Ok(ArtifactPaths {
        run_dir,
        manifest,
        trades_csv,
        sequence_csv,
        capital_csv,
        hourly_csv,
        series_json,
        trades_parquet,
        report_markdown,
        charts,
    })
}

/// Read the manifest back from an artifact directory.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}
