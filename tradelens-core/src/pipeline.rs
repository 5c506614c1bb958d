//! End-to-end pipeline: raw records → normalize → match → metrics →
//! {sequence, hourly} → chart series.
//!
//! Each stage takes the previous stage's output by value and returns a new
//! collection; there is no shared mutable state between stages.

use crate::domain::{RawLeg, Trade};
use crate::error::{LegError, MatchIssue, PipelineError};
use crate::hourly::{hourly_buckets, HourlyBucket};
use crate::matcher::{match_legs, DuplicatePolicy};
use crate::metrics::compute_trades;
use crate::normalize::{normalize_legs, TimestampFormats};
use crate::report::PipelineReport;
use crate::sequence::{build_sequence, Sequence};
use crate::series::{standard_series, ChartSeries};
use crate::summary::PerformanceSummary;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub formats: TimestampFormats,
    pub duplicate_policy: DuplicatePolicy,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Matched trades in match order (first buy appearance).
    pub trades: Vec<Trade>,
    pub sequence: Sequence,
    pub hourly: Vec<HourlyBucket>,
    pub series: Vec<ChartSeries>,
    pub summary: PerformanceSummary,
    pub report: PipelineReport,
}

/// Run the full pipeline over raw records.
///
/// Row-level problems are recorded in the report. Fails only when not a
/// single trade could be matched.
pub fn run_pipeline(
    raws: &[RawLeg],
    opts: &PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let mut report = PipelineReport {
        input_rows: raws.len(),
        ..Default::default()
    };

    let normalized = normalize_legs(raws, &opts.formats);
    report.normalized_legs = normalized.legs.len();
    report.invalid_timestamps = normalized.timestamp_warnings;
    let (invalid_sides, parse_errors): (Vec<LegError>, Vec<LegError>) = normalized
        .rejected
        .into_iter()
        .partition(|e| matches!(e, LegError::InvalidSide { .. }));
    report.invalid_sides = invalid_sides;
    report.parse_errors = parse_errors;
    info!(
        rows = report.input_rows,
        legs = report.normalized_legs,
        skipped = report.skipped_rows(),
        "legs normalized"
    );

    let matched = match_legs(normalized.legs, opts.duplicate_policy);
    let (unmatched, duplicates): (Vec<MatchIssue>, Vec<MatchIssue>) = matched
        .issues
        .into_iter()
        .partition(|i| matches!(i, MatchIssue::Unmatched { .. }));
    report.unmatched = unmatched;
    report.duplicates = duplicates;

    if matched.pairs.is_empty() {
        return Err(PipelineError::NoTrades {
            legs: raws.len(),
            rejected: report.skipped_rows(),
            unmatched: report.unmatched_legs(),
            duplicates: report.duplicates.len(),
        });
    }

    let metrics = compute_trades(matched.pairs);
    let trades = metrics.trades;
    report.matched_trades = trades.len();
    report.division_by_zero = metrics.errors;
    report.negative_durations = trades
        .iter()
        .filter(|t| t.has_negative_duration())
        .map(|t| t.trade_ref.clone())
        .collect();
    report.unbucketed_trades = trades
        .iter()
        .filter(|t| t.entry_hour.is_none())
        .map(|t| t.trade_ref.clone())
        .collect();

    let hourly = hourly_buckets(&trades);
    let sequence = build_sequence(trades.clone());
    report.undated_trades = sequence.undated.clone();

    let series = standard_series(&sequence, &hourly);
    let summary = PerformanceSummary::compute(&sequence, &trades);

    info!(
        trades = report.matched_trades,
        net_pnl = summary.total_net_pnl,
        hours = hourly.len(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        trades,
        sequence,
        hourly,
        series,
        summary,
        report,
    })
}
