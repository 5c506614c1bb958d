//! Data-quality report for one pipeline run.
//!
//! Collects every row-level problem the stages recovered from, so nothing
//! is dropped silently.

use crate::domain::TradeRef;
use crate::error::{LegError, MatchIssue, MetricError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Raw records received.
    pub input_rows: usize,
    /// Legs that survived normalization.
    pub normalized_legs: usize,
    pub matched_trades: usize,
    /// Unparseable or out-of-range numeric/identifier fields (row skipped).
    pub parse_errors: Vec<LegError>,
    /// Side outside {Buy, Sell} (row skipped).
    pub invalid_sides: Vec<LegError>,
    /// Leg kept with an invalid timestamp marker.
    pub invalid_timestamps: Vec<LegError>,
    pub unmatched: Vec<MatchIssue>,
    pub duplicates: Vec<MatchIssue>,
    /// Trades with zero capital: no return or efficiency, PnL kept.
    pub division_by_zero: Vec<MetricError>,
    /// Trades whose exit is stamped before their entry.
    pub negative_durations: Vec<TradeRef>,
    /// Trades left out of the equity sequence for lack of an entry date.
    pub undated_trades: Vec<TradeRef>,
    /// Trades left out of the hourly table for lack of an entry time.
    pub unbucketed_trades: Vec<TradeRef>,
}

impl PipelineReport {
    /// Rows dropped before matching.
    pub fn skipped_rows(&self) -> usize {
        self.parse_errors.len() + self.invalid_sides.len()
    }

    pub fn unmatched_legs(&self) -> usize {
        self.unmatched.iter().map(MatchIssue::leg_count).sum()
    }

    pub fn duplicate_legs(&self) -> usize {
        self.duplicates.iter().map(MatchIssue::leg_count).sum()
    }

    /// True when no row-level problem of any kind was recorded.
    pub fn is_clean(&self) -> bool {
        self.parse_errors.is_empty()
            && self.invalid_sides.is_empty()
            && self.invalid_timestamps.is_empty()
            && self.unmatched.is_empty()
            && self.duplicates.is_empty()
            && self.division_by_zero.is_empty()
            && self.negative_durations.is_empty()
            && self.undated_trades.is_empty()
            && self.unbucketed_trades.is_empty()
    }

    /// Human-readable lines, one per problem category present.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut push = |count: usize, what: &str| {
            if count > 0 {
                lines.push(format!("{count} {what}"));
            }
        };
        push(self.parse_errors.len(), "row(s) skipped: unparseable field");
        push(self.invalid_sides.len(), "row(s) skipped: invalid side");
        push(self.invalid_timestamps.len(), "invalid timestamp(s)");
        push(self.unmatched_legs(), "unmatched leg(s)");
        push(self.duplicates.len(), "trade reference(s) with duplicate legs");
        push(
            self.division_by_zero.len(),
            "trade(s) with zero capital (no return)",
        );
        push(self.negative_durations.len(), "trade(s) with negative duration");
        push(self.undated_trades.len(), "trade(s) without entry date");
        push(self.unbucketed_trades.len(), "trade(s) without entry hour");
        lines
    }
}
