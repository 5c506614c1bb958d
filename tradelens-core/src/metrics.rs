//! Per-trade metrics — pure functions from a matched leg pair to a `Trade`.
//!
//! Sign convention: brokerage and other charges arrive as signed costs and
//! are *added* to gross PnL, so a cost of -5 lowers net PnL by 5.

use crate::domain::{LegPair, Trade, TradeRef};
use crate::error::MetricError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use rayon::prelude::*;
use tracing::warn;

/// Trades with metrics plus the per-trade failures found while deriving them.
#[derive(Debug, Clone, Default)]
pub struct MetricsOutcome {
    /// Same order as the input pairs.
    pub trades: Vec<Trade>,
    pub errors: Vec<MetricError>,
}

/// Derive metrics for every pair.
///
/// Pairs are independent, so this fans out over the rayon pool; `collect`
/// keeps the input order.
pub fn compute_trades(pairs: Vec<LegPair>) -> MetricsOutcome {
    let trades: Vec<Trade> = pairs.into_par_iter().map(compute_trade).collect();

    let errors: Vec<MetricError> = trades
        .iter()
        .filter(|t| t.return_pct.is_none())
        .map(|t| MetricError::DivisionByZero {
            trade_ref: t.trade_ref.clone(),
        })
        .collect();
    if !errors.is_empty() {
        warn!(
            count = errors.len(),
            "trades with zero capital excluded from return and efficiency outputs"
        );
    }
    let negative = trades.iter().filter(|t| t.has_negative_duration()).count();
    if negative > 0 {
        warn!(count = negative, "trades exit before they enter");
    }

    MetricsOutcome { trades, errors }
}

/// Build a `Trade` from one buy leg and one sell leg.
///
/// Entry price, quantity and symbol come from the buy leg; exit price from
/// the sell leg.
pub fn compute_trade(pair: LegPair) -> Trade {
    let LegPair {
        trade_ref,
        buy,
        sell,
    } = pair;

    let entry_price = buy.price;
    let exit_price = sell.price;
    let quantity = buy.quantity;

    let gross = gross_pnl(entry_price, exit_price, quantity);
    let total_brokerage = buy.brokerage + sell.brokerage;
    let total_other_charges = buy.other_charges + sell.other_charges;
    let net = net_pnl(gross, total_brokerage, total_other_charges);
    let capital = capital_used(entry_price, quantity);

    Trade {
        return_pct: return_pct(&trade_ref, net, capital).ok(),
        trade_ref,
        base_symbol: base_symbol(&buy.symbol).to_string(),
        symbol: buy.symbol,
        buy_row: buy.row,
        sell_row: sell.row,
        entry_price,
        entry_time: buy.trigger_time,
        entry_date: buy.date,
        day_of_week: buy.date.map(|d| d.weekday()),
        entry_hour: buy.trigger_time.map(|t| t.hour()),
        exit_price,
        exit_time: sell.trigger_time,
        quantity,
        gross_pnl: gross,
        total_brokerage,
        total_other_charges,
        net_pnl: net,
        capital_used: capital,
        duration_minutes: duration_minutes(buy.trigger_time, sell.trigger_time),
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn gross_pnl(entry_price: f64, exit_price: f64, quantity: f64) -> f64 {
    (exit_price - entry_price) * quantity
}

pub fn net_pnl(gross_pnl: f64, total_brokerage: f64, total_other_charges: f64) -> f64 {
    gross_pnl + total_brokerage + total_other_charges
}

pub fn capital_used(entry_price: f64, quantity: f64) -> f64 {
    entry_price * quantity
}

/// Return on committed capital, in percent.
pub fn return_pct(trade_ref: &TradeRef, net_pnl: f64, capital_used: f64) -> Result<f64, MetricError> {
    if capital_used == 0.0 {
        return Err(MetricError::DivisionByZero {
            trade_ref: trade_ref.clone(),
        });
    }
    Ok(net_pnl / capital_used * 100.0)
}

/// Minutes from entry to exit, fractional. Negative when the exit is stamped
/// before the entry; `None` if either time is missing.
pub fn duration_minutes(entry: Option<NaiveDateTime>, exit: Option<NaiveDateTime>) -> Option<f64> {
    let (entry, exit) = (entry?, exit?);
    let delta = exit - entry;
    let millis = delta.num_milliseconds() as f64;
    Some(millis / 60_000.0)
}

/// Leading run of uppercase ASCII letters, e.g. "NIFTY" from "NIFTY24MAR22000CE".
pub fn base_symbol(symbol: &str) -> &str {
    let end = symbol
        .char_indices()
        .find(|(_, c)| !c.is_ascii_uppercase())
        .map(|(i, _)| i)
        .unwrap_or(symbol.len());
    &symbol[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Side, TradeLeg};
    use chrono::{NaiveDate, Weekday};

    fn leg(side: Side, price: f64, qty: f64, h: u32, m: u32) -> TradeLeg {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        TradeLeg {
            row: if side == Side::Buy { 1 } else { 2 },
            trade_ref: TradeRef::new("T1"),
            side,
            symbol: "BANKNIFTY24MARFUT".into(),
            price,
            quantity: qty,
            brokerage: -5.0,
            other_charges: -1.0,
            trigger_time: date.and_hms_opt(h, m, 0),
            date: Some(date),
        }
    }

    fn pair(buy: TradeLeg, sell: TradeLeg) -> LegPair {
        LegPair {
            trade_ref: TradeRef::new("T1"),
            buy,
            sell,
        }
    }

    #[test]
    fn reference_round_trip() {
        let t = compute_trade(pair(
            leg(Side::Buy, 100.0, 10.0, 9, 15),
            leg(Side::Sell, 110.0, 10.0, 9, 45),
        ));
        assert_eq!(t.gross_pnl, 100.0);
        assert_eq!(t.total_brokerage, -10.0);
        assert_eq!(t.total_other_charges, -2.0);
        assert_eq!(t.net_pnl, 88.0);
        assert_eq!(t.capital_used, 1000.0);
        assert_eq!(t.duration_minutes, Some(30.0));
        assert!((t.return_pct.unwrap() - 8.8).abs() < 1e-10);
        assert_eq!(t.base_symbol, "BANKNIFTY");
        assert_eq!(t.entry_hour, Some(9));
        assert_eq!(t.day_of_week, Some(Weekday::Mon));
    }

    #[test]
    fn fields_come_from_the_right_leg() {
        let mut sell = leg(Side::Sell, 90.0, 7.0, 10, 0);
        sell.symbol = "OTHER".into();
        let t = compute_trade(pair(leg(Side::Buy, 100.0, 10.0, 9, 0), sell));
        assert_eq!(t.entry_price, 100.0);
        assert_eq!(t.exit_price, 90.0);
        assert_eq!(t.quantity, 10.0);
        assert_eq!(t.symbol, "BANKNIFTY24MARFUT");
        assert_eq!(t.gross_pnl, -100.0);
    }

    #[test]
    fn zero_capital_has_no_return() {
        let t = compute_trade(pair(
            leg(Side::Buy, 0.0, 10.0, 9, 0),
            leg(Side::Sell, 5.0, 10.0, 10, 0),
        ));
        assert_eq!(t.capital_used, 0.0);
        assert_eq!(t.return_pct, None);
        assert_eq!(t.net_pnl, 38.0);
    }

    #[test]
    fn negative_duration_is_kept() {
        let t = compute_trade(pair(
            leg(Side::Buy, 100.0, 1.0, 10, 0),
            leg(Side::Sell, 100.0, 1.0, 9, 30),
        ));
        assert_eq!(t.duration_minutes, Some(-30.0));
        assert!(t.has_negative_duration());
    }

    #[test]
    fn missing_time_gives_no_duration_or_hour() {
        let mut buy = leg(Side::Buy, 100.0, 1.0, 10, 0);
        buy.trigger_time = None;
        let t = compute_trade(pair(buy, leg(Side::Sell, 101.0, 1.0, 11, 0)));
        assert_eq!(t.duration_minutes, None);
        assert_eq!(t.entry_hour, None);
        assert_eq!(t.day_of_week, Some(Weekday::Mon));
    }

    #[test]
    fn compute_trades_reports_division_by_zero_and_keeps_order() {
        let mut p2 = pair(
            leg(Side::Buy, 0.0, 1.0, 9, 0),
            leg(Side::Sell, 1.0, 1.0, 9, 5),
        );
        p2.trade_ref = TradeRef::new("T2");
        let out = compute_trades(vec![
            pair(leg(Side::Buy, 10.0, 1.0, 9, 0), leg(Side::Sell, 11.0, 1.0, 9, 1)),
            p2,
        ]);
        assert_eq!(out.trades.len(), 2);
        assert_eq!(out.trades[1].trade_ref.as_str(), "T2");
        assert_eq!(
            out.errors,
            vec![MetricError::DivisionByZero {
                trade_ref: TradeRef::new("T2")
            }]
        );
    }

    #[test]
    fn base_symbol_extraction() {
        assert_eq!(base_symbol("NIFTY24MAR22000CE"), "NIFTY");
        assert_eq!(base_symbol("RELIANCE"), "RELIANCE");
        assert_eq!(base_symbol("M&M"), "M");
        assert_eq!(base_symbol("24NIFTY"), "");
        assert_eq!(base_symbol("nifty"), "");
        assert_eq!(base_symbol(""), "");
    }

    #[test]
    fn fractional_minutes() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let m = duration_minutes(d.and_hms_opt(9, 0, 0), d.and_hms_opt(9, 1, 30));
        assert_eq!(m, Some(1.5));
    }
}
