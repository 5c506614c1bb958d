//! TradeLens Runner — analysis orchestration and artifacts.
//!
//! This crate builds on `tradelens-core` to provide:
//! - TOML configuration (column mapping, timestamp formats, matching policy)
//! - CSV ingestion of execution logs
//! - Dataset and run fingerprinting
//! - Artifact export (CSV, JSON, Parquet, Markdown)
//! - HTML chart rendering behind the core `ChartSink` trait

pub mod artifacts;
pub mod charts;
pub mod config;
pub mod export;
pub mod fingerprint;
pub mod ingest;
pub mod runner;

pub use artifacts::{load_manifest, save_artifacts, ArtifactPaths, RunManifest};
pub use charts::{ChartError, HtmlChartSink};
pub use config::{AnalysisConfig, ColumnMap, ConfigError, MatchingConfig, OutputConfig};
pub use fingerprint::{dataset_hash, run_dir_name, run_id};
pub use ingest::{load_legs, read_legs, LoadError, LoadedLegs};
pub use runner::{analyze_legs, run_analysis, AnalysisResult, RunError, SCHEMA_VERSION};
