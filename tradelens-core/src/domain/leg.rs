//! Trade legs — single execution fills, raw and normalized.

use super::ids::{RowNumber, TradeRef};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution side of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse free text into a side: surrounding whitespace is ignored and
    /// case does not matter. Anything other than buy/sell is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        if t.eq_ignore_ascii_case("buy") {
            Some(Side::Buy)
        } else if t.eq_ignore_ascii_case("sell") {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// One execution record as it arrives from the source, every field still text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLeg {
    pub row: RowNumber,
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

/// A normalized execution fill.
///
/// Timestamps are `None` when the source value could not be parsed. Such a
/// leg is still matched; stages that need the time skip the resulting trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLeg {
    pub row: RowNumber,
    pub trade_ref: TradeRef,
    pub side: Side,
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    /// Signed cost: negative values reduce PnL when added.
    pub brokerage: f64,
    /// Signed cost, same convention as `brokerage`.
    pub other_charges: f64,
    pub trigger_time: Option<NaiveDateTime>,
    pub date: Option<NaiveDate>,
}

impl TradeLeg {
    pub fn has_valid_timestamps(&self) -> bool {
        self.trigger_time.is_some() && self.date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Side::parse("Buy"), Some(Side::Buy));
        assert_eq!(Side::parse("  BUY "), Some(Side::Buy));
        assert_eq!(Side::parse("sell\t"), Some(Side::Sell));
        assert_eq!(Side::parse("SeLL"), Some(Side::Sell));
    }

    #[test]
    fn side_parse_rejects_other_values() {
        assert_eq!(Side::parse(""), None);
        assert_eq!(Side::parse("B"), None);
        assert_eq!(Side::parse("short"), None);
        assert_eq!(Side::parse("buy sell"), None);
    }

    #[test]
    fn side_display() {
        assert_eq!(Side::Buy.to_string(), "Buy");
        assert_eq!(Side::Sell.to_string(), "Sell");
    }
}
