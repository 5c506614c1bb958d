//! Error taxonomy for the reconciliation pipeline.
//!
//! Row-level errors (`LegError`, `MatchIssue`, `MetricError`) are recovered
//! locally: the offending leg or trade is excluded and recorded in the
//! `PipelineReport`. Only `PipelineError` terminates a run.

use crate::domain::{RowNumber, Side, TradeRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems with a single source record.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LegError {
    #[error("row {row}: cannot parse {field} from '{value}'")]
    Parse {
        row: RowNumber,
        field: String,
        value: String,
    },

    #[error("row {row}: {field} value {value} is out of range")]
    OutOfRange {
        row: RowNumber,
        field: String,
        value: String,
    },

    #[error("row {row}: side '{value}' is neither Buy nor Sell")]
    InvalidSide { row: RowNumber, value: String },
}

impl LegError {
    pub fn row(&self) -> RowNumber {
        match self {
            LegError::Parse { row, .. }
            | LegError::OutOfRange { row, .. }
            | LegError::InvalidSide { row, .. } => *row,
        }
    }
}

/// Cardinality problems found while pairing legs on their trade reference.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum MatchIssue {
    #[error("trade_ref {trade_ref}: {side} leg(s) at rows {rows:?} have no counterpart")]
    Unmatched {
        trade_ref: TradeRef,
        side: Side,
        rows: Vec<RowNumber>,
    },

    #[error("trade_ref {trade_ref}: {} {side} legs at rows {rows:?}, expected one", .rows.len())]
    DuplicateLeg {
        trade_ref: TradeRef,
        side: Side,
        rows: Vec<RowNumber>,
    },
}

impl MatchIssue {
    pub fn trade_ref(&self) -> &TradeRef {
        match self {
            MatchIssue::Unmatched { trade_ref, .. } | MatchIssue::DuplicateLeg { trade_ref, .. } => {
                trade_ref
            }
        }
    }

    /// Number of source legs this issue kept out of the trade set.
    pub fn leg_count(&self) -> usize {
        match self {
            MatchIssue::Unmatched { rows, .. } | MatchIssue::DuplicateLeg { rows, .. } => {
                rows.len()
            }
        }
    }
}

/// Per-trade metric failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MetricError {
    #[error("trade_ref {trade_ref}: capital used is zero, return is undefined")]
    DivisionByZero { trade_ref: TradeRef },
}

/// Run-level failure: the pipeline produced nothing usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(
        "no trades matched from {legs} input rows ({rejected} rejected, {unmatched} unmatched, {duplicates} duplicate references)"
    )]
    NoTrades {
        legs: usize,
        rejected: usize,
        unmatched: usize,
        duplicates: usize,
    },
}
