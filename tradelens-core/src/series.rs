//! Named chart series handed to a chart exporter.
//!
//! The core only builds `(x, y)` series with titles and axis labels;
//! rendering happens behind the `ChartSink` trait.

use crate::hourly::HourlyBucket;
use crate::sequence::Sequence;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// X coordinate of a series point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesX {
    Date(NaiveDate),
    Hour(u32),
}

impl fmt::Display for SeriesX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesX::Date(d) => write!(f, "{d}"),
            SeriesX::Hour(h) => write!(f, "{h}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: SeriesX,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Line,
    Bar,
}

/// One chart worth of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Stable identifier, also used as the artifact file stem.
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: SeriesKind,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    fn new(name: &str, title: &str, x_label: &str, y_label: &str, kind: SeriesKind) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            kind,
            points: Vec::new(),
        }
    }

    fn with_points(mut self, points: impl IntoIterator<Item = SeriesPoint>) -> Self {
        self.points = points.into_iter().collect();
        self
    }

    pub fn y_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Consumer of chart series (HTML renderer, plotting backend, test recorder).
pub trait ChartSink {
    type Error;

    fn emit(&mut self, series: &ChartSeries) -> Result<(), Self::Error>;
}

/// Push every series into a sink, stopping at the first failure.
pub fn export_series<S: ChartSink>(sink: &mut S, series: &[ChartSeries]) -> Result<(), S::Error> {
    for s in series {
        sink.emit(s)?;
    }
    Ok(())
}

pub fn equity_curve(seq: &Sequence) -> ChartSeries {
    ChartSeries::new(
        "equity_curve",
        "Equity Curve (Cumulative PnL)",
        "Date",
        "Cumulative PnL",
        SeriesKind::Line,
    )
    .with_points(seq.trades.iter().filter_map(|s| {
        s.trade.entry_date.map(|d| SeriesPoint {
            x: SeriesX::Date(d),
            y: s.cumulative_pnl,
        })
    }))
}

pub fn drawdown(seq: &Sequence) -> ChartSeries {
    ChartSeries::new(
        "drawdown",
        "Drawdown Over Time",
        "Date",
        "Drawdown",
        SeriesKind::Line,
    )
    .with_points(seq.trades.iter().filter_map(|s| {
        s.trade.entry_date.map(|d| SeriesPoint {
            x: SeriesX::Date(d),
            y: s.drawdown,
        })
    }))
}

pub fn hourly_pnl(buckets: &[HourlyBucket]) -> ChartSeries {
    ChartSeries::new("hourly_pnl", "Hourly PnL", "Hour", "Total PnL", SeriesKind::Bar).with_points(
        buckets.iter().map(|b| SeriesPoint {
            x: SeriesX::Hour(b.entry_hour),
            y: b.total_pnl,
        }),
    )
}

pub fn capital_utilisation(seq: &Sequence) -> ChartSeries {
    ChartSeries::new(
        "capital_utilisation",
        "Capital Utilisation Over Time",
        "Date",
        "Capital Used",
        SeriesKind::Line,
    )
    .with_points(seq.capital.iter().map(|c| SeriesPoint {
        x: SeriesX::Date(c.entry_date),
        y: c.capital_used,
    }))
}

/// Net PnL per unit of capital; zero-capital trades are left out.
pub fn capital_efficiency(seq: &Sequence) -> ChartSeries {
    ChartSeries::new(
        "capital_efficiency",
        "Capital Efficiency",
        "Date",
        "Net PnL / Capital Used",
        SeriesKind::Line,
    )
    .with_points(seq.capital.iter().filter_map(|c| {
        c.capital_efficiency.map(|e| SeriesPoint {
            x: SeriesX::Date(c.entry_date),
            y: e,
        })
    }))
}

/// The full chart set in export order.
pub fn standard_series(seq: &Sequence, buckets: &[HourlyBucket]) -> Vec<ChartSeries> {
    vec![
        equity_curve(seq),
        drawdown(seq),
        hourly_pnl(buckets),
        capital_utilisation(seq),
        capital_efficiency(seq),
    ]
}
