//! Analysis configuration, loaded from TOML.
//!
//! Every section is optional; an empty file yields the defaults:
//!
//! ```toml
//! [columns]
//! trade_ref = "Trade_Ref"
//! side = "Buy/Sell"
//!
//! [timestamps]
//! time = ["%H:%M:%S", "%H:%M"]
//!
//! [matching]
//! duplicate_policy = "merge_partial_fills"
//!
//! [output]
//! dir = "reports"
//! charts = true
//! parquet = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradelens_core::{DuplicatePolicy, PipelineOptions, TimestampFormats};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("column mapping for {field} is empty")]
    EmptyColumn { field: &'static str },
}

/// Header names of the nine input columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub date: String,
    pub trigger_time: String,
    pub trade_ref: String,
    pub side: String,
    pub symbol: String,
    pub price: String,
    pub quantity: String,
    pub brokerage: String,
    pub other_charges: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "Date".into(),
            trigger_time: "Trigger Time".into(),
            trade_ref: "Trade_Ref".into(),
            side: "Buy/Sell".into(),
            symbol: "Symbol".into(),
            price: "Trade Price".into(),
            quantity: "Qty".into(),
            brokerage: "Brokerage".into(),
            other_charges: "Other_Charges".into(),
        }
    }
}

impl ColumnMap {
    /// `(field, header)` pairs in `RawLeg` field order.
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("date", self.date.as_str()),
            ("trigger_time", self.trigger_time.as_str()),
            ("trade_ref", self.trade_ref.as_str()),
            ("side", self.side.as_str()),
            ("symbol", self.symbol.as_str()),
            ("price", self.price.as_str()),
            ("quantity", self.quantity.as_str()),
            ("brokerage", self.brokerage.as_str()),
            ("other_charges", self.other_charges.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub duplicate_policy: DuplicatePolicy,
}

/// Where and what to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Render one HTML file per chart series.
    pub charts: bool,
    /// Also write the trade table as Parquet.
    pub parquet: bool,
    /// Write a Markdown summary report.
    pub report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("tradelens-output"),
            charts: true,
            parquet: true,
            report: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnMap,
    pub timestamps: TimestampFormats,
    pub matching: MatchingConfig,
    pub output: OutputConfig,
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, header) in self.columns.entries() {
            if header.trim().is_empty() {
                return Err(ConfigError::EmptyColumn { field });
            }
        }
        Ok(())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            formats: self.timestamps.clone(),
            duplicate_policy: self.matching.duplicate_policy,
        }
    }

    /// BLAKE3 over the settings that affect results.
    ///
    /// Output settings are left out: moving the output directory or
    /// toggling charts does not change what a run computes.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(&(&self.columns, &self.timestamps, &self.matching))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.columns.side, "Buy/Sell");
        assert_eq!(config.matching.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.output.charts);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            [columns]
            trade_ref = "Order ID"

            [matching]
            duplicate_policy = "merge_partial_fills"

            [output]
            dir = "reports"
            parquet = false
            "#,
        )
        .unwrap();
        assert_eq!(config.columns.trade_ref, "Order ID");
        assert_eq!(config.columns.price, "Trade Price");
        assert_eq!(
            config.matching.duplicate_policy,
            DuplicatePolicy::MergePartialFills
        );
        assert_eq!(config.output.dir, PathBuf::from("reports"));
        assert!(!config.output.parquet);
        assert!(config.output.report);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = AnalysisConfig::from_toml("[matching]\nduplicate_policy = \"sum\"\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn blank_column_is_rejected() {
        let err = AnalysisConfig::from_toml("[columns]\nsymbol = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyColumn { field: "symbol" }));
    }

    #[test]
    fn config_hash_ignores_output_settings() {
        let a = AnalysisConfig::default();
        let mut b = a.clone();
        b.output.dir = PathBuf::from("elsewhere");
        b.output.charts = false;
        assert_eq!(a.config_hash().unwrap(), b.config_hash().unwrap());

        b.matching.duplicate_policy = DuplicatePolicy::MergePartialFills;
        assert_ne!(a.config_hash().unwrap(), b.config_hash().unwrap());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/tradelens.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tradelens.toml"));
    }
}
