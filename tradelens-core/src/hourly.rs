//! Hourly aggregation — trade statistics grouped by entry hour.
//!
//! Only hours with at least one trade produce a bucket; empty hours are
//! omitted rather than emitted as zero rows. Trades whose entry time is
//! invalid have no hour and are not bucketed.

use crate::domain::Trade;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics for trades entered during one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    /// Hour of day, 0..=23.
    pub entry_hour: u32,
    pub trade_count: usize,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub capital_used_sum: f64,
    /// Percentage (0..=100) of trades in the bucket with positive net PnL.
    pub win_rate_pct: f64,
}

#[derive(Default)]
struct Acc {
    count: usize,
    pnl: f64,
    capital: f64,
    wins: usize,
}

/// Group trades by entry hour. Buckets are returned in ascending hour order.
pub fn hourly_buckets(trades: &[Trade]) -> Vec<HourlyBucket> {
    let mut by_hour: BTreeMap<u32, Acc> = BTreeMap::new();

    for trade in trades {
        let Some(hour) = trade.entry_hour else {
            continue;
        };
        let acc = by_hour.entry(hour).or_default();
        acc.count += 1;
        acc.pnl += trade.net_pnl;
        acc.capital += trade.capital_used;
        if trade.is_winner() {
            acc.wins += 1;
        }
    }

    by_hour
        .into_iter()
        .map(|(hour, acc)| HourlyBucket {
            entry_hour: hour,
            trade_count: acc.count,
            total_pnl: acc.pnl,
            avg_pnl: acc.pnl / acc.count as f64,
            capital_used_sum: acc.capital,
            win_rate_pct: acc.wins as f64 / acc.count as f64 * 100.0,
        })
        .collect()
}
