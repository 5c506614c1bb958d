//! Trade — a matched buy/sell round trip with its derived metrics.

use super::ids::{RowNumber, TradeRef};
use super::leg::TradeLeg;
use crate::error::MetricError;
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// The two legs that make up one round trip, before metrics are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegPair {
    pub trade_ref: TradeRef,
    pub buy: TradeLeg,
    pub sell: TradeLeg,
}

/// A completed round trip: entry from the buy leg, exit from the sell leg.
///
/// Immutable once built by the metrics stage. Time-derived fields are
/// `None` when the underlying leg timestamp was invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub trade_ref: TradeRef,
    pub symbol: String,
    pub base_symbol: String,
    pub buy_row: RowNumber,
    pub sell_row: RowNumber,

    // ── Entry ──
    pub entry_price: f64,
    pub entry_time: Option<NaiveDateTime>,
    pub entry_date: Option<NaiveDate>,
    pub day_of_week: Option<Weekday>,
    pub entry_hour: Option<u32>,

    // ── Exit ──
    pub exit_price: f64,
    pub exit_time: Option<NaiveDateTime>,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    pub gross_pnl: f64,
    pub total_brokerage: f64,
    pub total_other_charges: f64,
    pub net_pnl: f64,
    pub capital_used: f64,

    // ── Derived ──
    /// Negative values mean the sell was stamped before the buy.
    pub duration_minutes: Option<f64>,
    /// `None` when `capital_used` is zero.
    pub return_pct: Option<f64>,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }

    /// Net PnL as a fraction of committed capital.
    pub fn capital_efficiency(&self) -> Result<f64, MetricError> {
        if self.capital_used == 0.0 {
            return Err(MetricError::DivisionByZero {
                trade_ref: self.trade_ref.clone(),
            });
        }
        Ok(self.net_pnl / self.capital_used)
    }

    /// Full English weekday name of the entry date ("Monday" ... "Sunday").
    pub fn day_name(&self) -> Option<&'static str> {
        self.day_of_week.map(weekday_name)
    }

    /// Weekday index of the entry date, Monday = 0.
    pub fn weekday_index(&self) -> Option<u32> {
        self.day_of_week.map(|d| d.num_days_from_monday())
    }

    pub fn has_negative_duration(&self) -> bool {
        self.duration_minutes.is_some_and(|d| d < 0.0)
    }
}

/// Locale-independent weekday naming.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
