//! Aggregate performance summary — pure functions over the trade set.
//!
//! Trade-count and PnL figures cover every matched trade. Drawdown comes
//! from the ordered sequence; streaks follow sequence order too.

use crate::domain::Trade;
use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};

/// Headline statistics for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub trade_count: usize,
    pub winners: usize,
    pub losers: usize,
    pub win_rate_pct: f64,
    pub total_gross_pnl: f64,
    pub total_brokerage: f64,
    pub total_other_charges: f64,
    pub total_net_pnl: f64,
    pub avg_net_pnl: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub total_capital_used: f64,
    pub avg_return_pct: Option<f64>,
    pub avg_duration_minutes: Option<f64>,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl PerformanceSummary {
    pub fn compute(sequence: &Sequence, trades: &[Trade]) -> Self {
        let ordered: Vec<&Trade> = sequence.trades.iter().map(|s| &s.trade).collect();
        let total_net: f64 = trades.iter().map(|t| t.net_pnl).sum();
        let winners = trades.iter().filter(|t| t.is_winner()).count();
        Self {
            trade_count: trades.len(),
            winners,
            losers: trades.iter().filter(|t| t.net_pnl < 0.0).count(),
            win_rate_pct: win_rate_pct(trades),
            total_gross_pnl: trades.iter().map(|t| t.gross_pnl).sum(),
            total_brokerage: trades.iter().map(|t| t.total_brokerage).sum(),
            total_other_charges: trades.iter().map(|t| t.total_other_charges).sum(),
            total_net_pnl: total_net,
            avg_net_pnl: if trades.is_empty() {
                0.0
            } else {
                total_net / trades.len() as f64
            },
            best_trade: extreme(trades, f64::max),
            worst_trade: extreme(trades, f64::min),
            profit_factor: profit_factor(trades),
            max_drawdown: sequence.max_drawdown(),
            total_capital_used: trades.iter().map(|t| t.capital_used).sum(),
            avg_return_pct: mean_defined(trades.iter().map(|t| t.return_pct)),
            avg_duration_minutes: mean_defined(trades.iter().map(|t| t.duration_minutes)),
            max_consecutive_wins: max_consecutive(&ordered, true),
            max_consecutive_losses: max_consecutive(&ordered, false),
        }
    }
}

/// Percentage of trades with positive net PnL.
pub fn win_rate_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Best or worst net PnL; 0.0 for an empty set.
fn extreme(trades: &[Trade], pick: fn(f64, f64) -> f64) -> f64 {
    trades.iter().map(|t| t.net_pnl).reduce(pick).unwrap_or(0.0)
}

fn mean_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn max_consecutive(trades: &[&Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
