//! Sequence aggregation — chronological ordering and running state.
//!
//! Ordering key: `entry_date` ascending. The sort is stable, so trades on
//! the same date keep their input order. Trades without an entry date
//! cannot be placed and are listed in `Sequence::undated` instead.
//!
//! One forward pass computes cumulative PnL, its running peak, drawdown,
//! and the cumulative capital series.

use crate::domain::{Trade, TradeRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A trade annotated with the equity state after it closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedTrade {
    pub trade: Trade,
    /// Sum of `net_pnl` up to and including this trade.
    pub cumulative_pnl: f64,
    /// Highest `cumulative_pnl` so far, inclusive. Non-decreasing.
    pub running_peak: f64,
    /// `cumulative_pnl - running_peak`, always <= 0.
    pub drawdown: f64,
}

/// Capital usage for one trade in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalRecord {
    pub trade_ref: TradeRef,
    pub entry_date: NaiveDate,
    pub capital_used: f64,
    pub net_pnl: f64,
    pub cumulative_capital: f64,
    /// `net_pnl / capital_used`; `None` when no capital was used.
    pub capital_efficiency: Option<f64>,
}

/// Chronologically ordered trades with cumulative state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub trades: Vec<SequencedTrade>,
    pub capital: Vec<CapitalRecord>,
    pub undated: Vec<TradeRef>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Most negative drawdown in the sequence (0.0 if none).
    pub fn max_drawdown(&self) -> f64 {
        self.trades
            .iter()
            .map(|s| s.drawdown)
            .fold(0.0_f64, f64::min)
    }

    pub fn final_pnl(&self) -> f64 {
        self.trades.last().map_or(0.0, |s| s.cumulative_pnl)
    }
}

/// Order trades by entry date and attach cumulative fields.
pub fn build_sequence(trades: Vec<Trade>) -> Sequence {
    let (mut dated, undated): (Vec<Trade>, Vec<Trade>) =
        trades.into_iter().partition(|t| t.entry_date.is_some());

    if !undated.is_empty() {
        warn!(
            count = undated.len(),
            "trades without an entry date left out of the equity sequence"
        );
    }

    dated.sort_by_key(|t| t.entry_date);

    let mut seq = Vec::with_capacity(dated.len());
    let mut capital = Vec::with_capacity(dated.len());
    let mut cumulative_pnl = 0.0_f64;
    let mut running_peak = f64::NEG_INFINITY;
    let mut cumulative_capital = 0.0_f64;

    for trade in dated {
        cumulative_pnl += trade.net_pnl;
        running_peak = running_peak.max(cumulative_pnl);
        cumulative_capital += trade.capital_used;

        if let Some(entry_date) = trade.entry_date {
            capital.push(CapitalRecord {
                trade_ref: trade.trade_ref.clone(),
                entry_date,
                capital_used: trade.capital_used,
                net_pnl: trade.net_pnl,
                cumulative_capital,
                capital_efficiency: trade.capital_efficiency().ok(),
            });
        }

        seq.push(SequencedTrade {
            trade,
            cumulative_pnl,
            running_peak,
            drawdown: cumulative_pnl - running_peak,
        });
    }

    Sequence {
        trades: seq,
        capital,
        undated: undated.into_iter().map(|t| t.trade_ref).collect(),
    }
}
