//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for analysis results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape, equity sequence, capital usage, hourly table
//! - **Markdown**: human-readable single-run report
//!
//! Optional values (invalid timestamps, zero-capital returns) are written as
//! empty CSV cells.

use anyhow::{bail, Context, Result};
use tradelens_core::{ChartSeries, HourlyBucket, Sequence, Trade};

use crate::runner::{AnalysisResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisResult` to pretty JSON.
pub fn export_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize AnalysisResult to JSON")
}

/// Deserialize an `AnalysisResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisResult> {
    let result: AnalysisResult =
        serde_json::from_str(json).context("failed to deserialize AnalysisResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Serialize chart series to pretty JSON.
pub fn export_series_json(series: &[ChartSeries]) -> Result<String> {
    serde_json::to_string_pretty(series).context("failed to serialize chart series to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_f(v: Option<f64>, precision: usize) -> String {
    v.map(|v| format!("{v:.precision$}")).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export matched trades as CSV, one row per trade in match order.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "trade_ref",
        "symbol",
        "base_symbol",
        "entry_date",
        "day_of_week",
        "entry_hour",
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "quantity",
        "gross_pnl",
        "total_brokerage",
        "total_other_charges",
        "net_pnl",
        "capital_used",
        "duration_minutes",
        "return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            t.trade_ref.to_string(),
            t.symbol.clone(),
            t.base_symbol.clone(),
            opt(t.entry_date),
            t.day_name().unwrap_or("").to_string(),
            opt(t.entry_hour),
            opt(t.entry_time),
            opt(t.exit_time),
            format!("{:.4}", t.entry_price),
            format!("{:.4}", t.exit_price),
            t.quantity.to_string(),
            format!("{:.2}", t.gross_pnl),
            format!("{:.2}", t.total_brokerage),
            format!("{:.2}", t.total_other_charges),
            format!("{:.2}", t.net_pnl),
            format!("{:.2}", t.capital_used),
            opt_f(t.duration_minutes, 2),
            opt_f(t.return_pct, 4),
        ])?;
    }

    finish(wtr)
}

/// Export the chronological sequence with cumulative PnL, peak, and drawdown.
pub fn export_sequence_csv(sequence: &Sequence) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "position",
        "trade_ref",
        "entry_date",
        "net_pnl",
        "cumulative_pnl",
        "running_peak",
        "drawdown",
    ])?;
    for (i, s) in sequence.trades.iter().enumerate() {
        wtr.write_record([
            i.to_string(),
            s.trade.trade_ref.to_string(),
            opt(s.trade.entry_date),
            format!("{:.2}", s.trade.net_pnl),
            format!("{:.2}", s.cumulative_pnl),
            format!("{:.2}", s.running_peak),
            format!("{:.2}", s.drawdown),
        ])?;
    }
    finish(wtr)
}

/// Export capital usage per trade in sequence order.
pub fn export_capital_csv(sequence: &Sequence) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "trade_ref",
        "entry_date",
        "capital_used",
        "net_pnl",
        "cumulative_capital",
        "capital_efficiency",
    ])?;
    for c in &sequence.capital {
        wtr.write_record([
            c.trade_ref.to_string(),
            c.entry_date.to_string(),
            format!("{:.2}", c.capital_used),
            format!("{:.2}", c.net_pnl),
            format!("{:.2}", c.cumulative_capital),
            opt_f(c.capital_efficiency, 6),
        ])?;
    }
    finish(wtr)
}

/// Export the hourly aggregation table.
pub fn export_hourly_csv(buckets: &[HourlyBucket]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_hour",
        "trade_count",
        "total_pnl",
        "avg_pnl",
        "capital_used_sum",
        "win_rate_pct",
    ])?;
    for b in buckets {
        wtr.write_record([
            b.entry_hour.to_string(),
            b.trade_count.to_string(),
            format!("{:.2}", b.total_pnl),
            format!("{:.2}", b.avg_pnl),
            format!("{:.2}", b.capital_used_sum),
            format!("{:.1}", b.win_rate_pct),
        ])?;
    }
    finish(wtr)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single analysis run.
pub fn generate_report(result: &AnalysisResult) -> String {
    let mut md = String::with_capacity(2048);
    let out = &result.output;

    md.push_str("# Trade Analysis Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Source | {} |\n", result.source));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!(
        "| Duplicate Policy | {:?} |\n",
        result.config.matching.duplicate_policy
    ));
    if let (Some(first), Some(last)) = (out.sequence.trades.first(), out.sequence.trades.last()) {
        md.push_str(&format!(
            "| Period | {} to {} |\n",
            opt(first.trade.entry_date),
            opt(last.trade.entry_date)
        ));
    }
    md.push('\n');

    // Performance Summary
    let s = &out.summary;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Trades | {} |\n", s.trade_count));
    md.push_str(&format!(
        "| Winners / Losers | {} / {} |\n",
        s.winners, s.losers
    ));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", s.win_rate_pct));
    md.push_str(&format!("| Gross PnL | {:.2} |\n", s.total_gross_pnl));
    md.push_str(&format!("| Brokerage | {:.2} |\n", s.total_brokerage));
    md.push_str(&format!("| Other Charges | {:.2} |\n", s.total_other_charges));
    md.push_str(&format!("| Net PnL | {:.2} |\n", s.total_net_pnl));
    md.push_str(&format!("| Avg Net PnL | {:.2} |\n", s.avg_net_pnl));
    md.push_str(&format!("| Best Trade | {:.2} |\n", s.best_trade));
    md.push_str(&format!("| Worst Trade | {:.2} |\n", s.worst_trade));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", s.profit_factor));
    md.push_str(&format!("| Max Drawdown | {:.2} |\n", s.max_drawdown));
    md.push_str(&format!("| Capital Used | {:.2} |\n", s.total_capital_used));
    if let Some(r) = s.avg_return_pct {
        md.push_str(&format!("| Avg Return | {r:.2}% |\n"));
    }
    if let Some(d) = s.avg_duration_minutes {
        md.push_str(&format!("| Avg Duration | {d:.1} min |\n"));
    }
    md.push_str(&format!(
        "| Max Consecutive Wins | {} |\n",
        s.max_consecutive_wins
    ));
    md.push_str(&format!(
        "| Max Consecutive Losses | {} |\n",
        s.max_consecutive_losses
    ));
    md.push('\n');

    // Hourly
    if !out.hourly.is_empty() {
        md.push_str("## Hourly Breakdown\n\n");
        md.push_str("| Hour | Trades | Total PnL | Avg PnL | Capital | Win Rate |\n");
        md.push_str("| ---: | ---: | ---: | ---: | ---: | ---: |\n");
        for b in &out.hourly {
            md.push_str(&format!(
                "| {:02}:00 | {} | {:.2} | {:.2} | {:.2} | {:.1}% |\n",
                b.entry_hour,
                b.trade_count,
                b.total_pnl,
                b.avg_pnl,
                b.capital_used_sum,
                b.win_rate_pct
            ));
        }
        md.push('\n');
    }

    // Data Quality
    let r = &out.report;
    md.push_str("## Data Quality\n\n");
    md.push_str(&format!(
        "{} input rows, {} legs normalized, {} trades matched.\n\n",
        r.input_rows, r.normalized_legs, r.matched_trades
    ));
    if r.is_clean() {
        md.push_str("No data problems found.\n");
    } else {
        for line in r.summary_lines() {
            md.push_str(&format!("- {line}\n"));
        }
        md.push('\n');
        md.push_str("### Details\n\n");
        let details = r
            .parse_errors
            .iter()
            .chain(&r.invalid_sides)
            .chain(&r.invalid_timestamps)
            .map(ToString::to_string)
            .chain(r.unmatched.iter().chain(&r.duplicates).map(ToString::to_string))
            .chain(r.division_by_zero.iter().map(ToString::to_string));
        for d in details {
            md.push_str(&format!("- {d}\n"));
        }
        for t in &r.negative_durations {
            md.push_str(&format!("- trade_ref {t}: exit is stamped before entry\n"));
        }
    }

    md
}
