//! Leg normalization — raw text records into typed `TradeLeg`s.
//!
//! Pure transform. Numeric fields must parse or the leg is rejected;
//! timestamps that do not parse become `None` and are reported as warnings.

use crate::domain::{RawLeg, Side, TradeLeg, TradeRef};
use crate::error::LegError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered `chrono` format lists tried when parsing timestamps.
///
/// The first format that parses wins, so list unambiguous formats first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampFormats {
    pub datetime: Vec<String>,
    pub date: Vec<String>,
    pub time: Vec<String>,
}

impl Default for TimestampFormats {
    fn default() -> Self {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            datetime: owned(&[
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%d-%m-%Y %H:%M:%S",
                "%d-%m-%Y %H:%M",
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%Y %H:%M",
                "%d-%b-%Y %H:%M:%S",
            ]),
            date: owned(&["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%d %b %Y"]),
            time: owned(&["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"]),
        }
    }
}

impl TimestampFormats {
    pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        self.datetime
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(t, f).ok())
    }

    /// Parse a calendar date; a full date-time is accepted and truncated.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        self.date
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(t, f).ok())
            .or_else(|| self.parse_datetime(t).map(|dt| dt.date()))
    }

    pub fn parse_time(&self, text: &str) -> Option<NaiveTime> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        self.time
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(t, f).ok())
    }
}

/// A normalized leg plus the non-fatal timestamp problems found on its row.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub leg: TradeLeg,
    pub warnings: Vec<LegError>,
}

/// Outcome of normalizing a whole batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    /// Legs in source order.
    pub legs: Vec<TradeLeg>,
    /// Rows rejected outright (bad numbers, invalid side).
    pub rejected: Vec<LegError>,
    /// Rows kept with an invalid timestamp marker.
    pub timestamp_warnings: Vec<LegError>,
}

/// Normalize a single raw record.
pub fn normalize_leg(raw: &RawLeg, formats: &TimestampFormats) -> Result<Normalized, LegError> {
    let side = Side::parse(&raw.side).ok_or_else(|| LegError::InvalidSide {
        row: raw.row,
        value: raw.side.clone(),
    })?;

    let trade_ref = raw.trade_ref.trim();
    if trade_ref.is_empty() {
        return Err(LegError::Parse {
            row: raw.row,
            field: "trade_ref".into(),
            value: raw.trade_ref.clone(),
        });
    }

    let price = parse_number(raw.row, "price", &raw.price)?;
    if price < 0.0 {
        return Err(out_of_range(raw.row, "price", &raw.price));
    }
    let quantity = parse_number(raw.row, "quantity", &raw.quantity)?;
    if quantity <= 0.0 {
        return Err(out_of_range(raw.row, "quantity", &raw.quantity));
    }
    let brokerage = parse_cost(raw.row, "brokerage", &raw.brokerage)?;
    let other_charges = parse_cost(raw.row, "other_charges", &raw.other_charges)?;

    let field_date = formats.parse_date(&raw.date);
    let trigger_time = formats.parse_datetime(&raw.trigger_time).or_else(|| {
        let time = formats.parse_time(&raw.trigger_time)?;
        field_date.map(|d| d.and_time(time))
    });
    let date = field_date.or_else(|| trigger_time.map(|t| t.date()));

    let mut warnings = Vec::new();
    if trigger_time.is_none() {
        warnings.push(LegError::Parse {
            row: raw.row,
            field: "trigger_time".into(),
            value: raw.trigger_time.clone(),
        });
    }
    if date.is_none() {
        warnings.push(LegError::Parse {
            row: raw.row,
            field: "date".into(),
            value: raw.date.clone(),
        });
    }

    Ok(Normalized {
        leg: TradeLeg {
            row: raw.row,
            trade_ref: TradeRef::new(trade_ref),
            side,
            symbol: raw.symbol.trim().to_string(),
            price,
            quantity,
            brokerage,
            other_charges,
            trigger_time,
            date,
        },
        warnings,
    })
}

/// Normalize every record, splitting usable legs from rejected rows.
pub fn normalize_legs(raws: &[RawLeg], formats: &TimestampFormats) -> NormalizeOutcome {
    let mut out = NormalizeOutcome::default();
    for raw in raws {
        match normalize_leg(raw, formats) {
            Ok(n) => {
                out.timestamp_warnings.extend(n.warnings);
                out.legs.push(n.leg);
            }
            Err(e) => {
                debug!(row = raw.row, error = %e, "rejected leg");
                out.rejected.push(e);
            }
        }
    }
    out
}

fn parse_number(row: usize, field: &str, text: &str) -> Result<f64, LegError> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LegError::Parse {
            row,
            field: field.into(),
            value: text.to_string(),
        }),
    }
}

/// Costs may be left blank in exports; blank means zero.
fn parse_cost(row: usize, field: &str, text: &str) -> Result<f64, LegError> {
    if text.trim().is_empty() {
        return Ok(0.0);
    }
    parse_number(row, field, text)
}

fn out_of_range(row: usize, field: &str, text: &str) -> LegError {
    LegError::OutOfRange {
        row,
        field: field.into(),
        value: text.to_string(),
    }
}
