//! TradeLens Core — trade reconciliation and performance metrics.
//!
//! This crate holds the pure pipeline that turns an execution log into
//! round-trip trades and the series behind the charts:
//! - Leg normalization (typed timestamps, Buy/Sell enum)
//! - Trade matching on `trade_ref` with cardinality checks
//! - Per-trade metrics (PnL, costs, capital, duration, return)
//! - Chronological sequence with cumulative PnL, peak, drawdown, capital
//! - Hourly aggregation by entry hour
//! - Chart series and the `ChartSink` seam for renderers
//!
//! No file or network I/O happens here.

pub mod domain;
pub mod error;
pub mod hourly;
pub mod matcher;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod sequence;
pub mod series;
pub mod summary;

pub use domain::{LegPair, RawLeg, Side, Trade, TradeLeg, TradeRef};
pub use error::{LegError, MatchIssue, MetricError, PipelineError};
pub use hourly::{hourly_buckets, HourlyBucket};
pub use matcher::{match_legs, DuplicatePolicy, MatchOutcome};
pub use metrics::{compute_trade, compute_trades, MetricsOutcome};
pub use normalize::{normalize_leg, normalize_legs, NormalizeOutcome, TimestampFormats};
pub use pipeline::{run_pipeline, PipelineOptions, PipelineOutput};
pub use report::PipelineReport;
pub use sequence::{build_sequence, CapitalRecord, Sequence, SequencedTrade};
pub use series::{export_series, ChartSeries, ChartSink, SeriesKind, SeriesPoint, SeriesX};
pub use summary::PerformanceSummary;
