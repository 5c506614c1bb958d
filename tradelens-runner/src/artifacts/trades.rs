//! Trade table export (Parquet).
//!
//! Columns mirror `trades.csv`; undefined values are nulls.

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, ParquetWriter};
use std::fs::File;
use std::path::Path;
use tradelens_core::Trade;

pub fn trades_dataframe(trades: &[Trade]) -> Result<DataFrame> {
    let text = |f: fn(&Trade) -> String| trades.iter().map(f).collect::<Vec<String>>();
    let num = |f: fn(&Trade) -> f64| trades.iter().map(f).collect::<Vec<f64>>();

    let entry_date: Vec<Option<String>> = trades
        .iter()
        .map(|t| t.entry_date.map(|d| d.to_string()))
        .collect();
    let entry_time: Vec<Option<String>> = trades
        .iter()
        .map(|t| t.entry_time.map(|d| d.to_string()))
        .collect();
    let exit_time: Vec<Option<String>> = trades
        .iter()
        .map(|t| t.exit_time.map(|d| d.to_string()))
        .collect();
    let day_of_week: Vec<Option<&str>> = trades.iter().map(|t| t.day_name()).collect();
    let entry_hour: Vec<Option<u32>> = trades.iter().map(|t| t.entry_hour).collect();
    let duration: Vec<Option<f64>> = trades.iter().map(|t| t.duration_minutes).collect();
    let return_pct: Vec<Option<f64>> = trades.iter().map(|t| t.return_pct).collect();

    DataFrame::new(vec![
        Column::new("trade_ref".into(), text(|t| t.trade_ref.to_string())),
        Column::new("symbol".into(), text(|t| t.symbol.clone())),
        Column::new("base_symbol".into(), text(|t| t.base_symbol.clone())),
        Column::new("entry_date".into(), entry_date),
        Column::new("day_of_week".into(), day_of_week),
        Column::new("entry_hour".into(), entry_hour),
        Column::new("entry_time".into(), entry_time),
        Column::new("exit_time".into(), exit_time),
        Column::new("entry_price".into(), num(|t| t.entry_price)),
        Column::new("exit_price".into(), num(|t| t.exit_price)),
        Column::new("quantity".into(), num(|t| t.quantity)),
        Column::new("gross_pnl".into(), num(|t| t.gross_pnl)),
        Column::new("total_brokerage".into(), num(|t| t.total_brokerage)),
        Column::new("total_other_charges".into(), num(|t| t.total_other_charges)),
        Column::new("net_pnl".into(), num(|t| t.net_pnl)),
        Column::new("capital_used".into(), num(|t| t.capital_used)),
        Column::new("duration_minutes".into(), duration),
        Column::new("return_pct".into(), return_pct),
    ])
    .context("Failed to build trades dataframe")
}

pub fn write_trades_parquet(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut df = trades_dataframe(trades)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create trades parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write trades parquet")?;
    Ok(())
}
