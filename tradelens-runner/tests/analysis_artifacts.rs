//! Integration tests: CSV file on disk → analysis → artifact directory.

use std::path::{Path, PathBuf};

use tradelens_core::{DuplicatePolicy, PipelineError};
use tradelens_runner::{
    load_manifest, run_analysis, save_artifacts, AnalysisConfig, LoadError, RunError,
};

const LOG: &str = "\
Date,Trigger Time,Trade_Ref,Buy/Sell,Symbol,Trade Price,Qty,Brokerage,Other_Charges
2024-03-04,09:15:00,T1,Buy,NIFTY24MARFUT,100,10,-5,-1
2024-03-04,09:45:00,T1,Sell,NIFTY24MARFUT,110,10,-5,-1
2024-03-05,10:05:00,T2,BUY,BANKNIFTY24MARFUT,200,5,-5,-1
2024-03-05,10:35:00,T2,sell,BANKNIFTY24MARFUT,190,5,-5,-1
2024-03-06,11:00:00,T3,Buy,SBIN,600,1,-2,0
2024-03-06,11:20:00,T4,Hold,SBIN,600,1,-2,0
2024-03-07,14:00:00,T5,Buy,RELIANCE,2900,2,-3,-1
2024-03-07,14:01:00,T5,Buy,RELIANCE,2902,2,-3,-1
2024-03-07,14:30:00,T5,Sell,RELIANCE,2910,4,-3,-1
";

fn write_log(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("tradebook.csv");
    std::fs::write(&path, body).unwrap();
    path
}

fn config(out: &Path) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.output.dir = out.to_path_buf();
    config
}

#[test]
fn analyze_file_and_report_problems() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), LOG);

    let result = run_analysis(&input, &config(dir.path())).unwrap();
    let out = &result.output;

    assert_eq!(out.trades.len(), 2);
    assert_eq!(out.trades[0].net_pnl, 88.0);
    // (190 - 200) * 5 - 10 - 2
    assert_eq!(out.trades[1].net_pnl, -62.0);
    assert_eq!(out.sequence.final_pnl(), 26.0);
    assert_eq!(out.summary.max_drawdown, -62.0);

    let r = &out.report;
    assert_eq!(r.input_rows, 9);
    assert_eq!(r.invalid_sides.len(), 1);
    assert_eq!(r.unmatched.len(), 1);
    assert_eq!(r.unmatched[0].trade_ref().as_str(), "T3");
    assert_eq!(r.duplicates.len(), 1);
    assert_eq!(r.duplicate_legs(), 2);
}

#[test]
fn merge_policy_pairs_partial_fills() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), LOG);
    let mut config = config(dir.path());
    config.matching.duplicate_policy = DuplicatePolicy::MergePartialFills;

    let result = run_analysis(&input, &config).unwrap();
    let t5 = result
        .output
        .trades
        .iter()
        .find(|t| t.trade_ref.as_str() == "T5")
        .unwrap();
    assert_eq!(t5.quantity, 4.0);
    assert_eq!(t5.entry_price, 2901.0);
    assert!(result.output.report.duplicates.is_empty());
}

#[test]
fn artifacts_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), LOG);
    let config = config(&dir.path().join("out"));

    let result = run_analysis(&input, &config).unwrap();
    let paths = save_artifacts(&result, &config.output).unwrap();

    assert!(paths.run_dir.starts_with(dir.path().join("out")));
    for p in [
        &paths.manifest,
        &paths.trades_csv,
        &paths.sequence_csv,
        &paths.capital_csv,
        &paths.hourly_csv,
        &paths.series_json,
    ] {
        assert!(p.exists(), "missing {}", p.display());
    }
    assert!(paths.trades_parquet.as_ref().unwrap().exists());
    assert!(paths.report_markdown.as_ref().unwrap().exists());

    let chart_names: Vec<String> = paths
        .charts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        chart_names,
        vec![
            "equity_curve.html",
            "drawdown.html",
            "hourly_pnl.html",
            "capital_utilisation.html",
            "capital_efficiency.html",
        ]
    );

    let manifest = load_manifest(&paths.run_dir).unwrap();
    assert_eq!(manifest.run_id, result.run_id);
    assert_eq!(manifest.summary.trade_count, 2);

    let trades_csv = std::fs::read_to_string(&paths.trades_csv).unwrap();
    assert_eq!(trades_csv.lines().count(), 3);
}

#[test]
fn optional_artifacts_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), LOG);
    let mut config = config(dir.path());
    config.output.charts = false;
    config.output.parquet = false;
    config.output.report = false;

    let result = run_analysis(&input, &config).unwrap();
    let paths = save_artifacts(&result, &config.output).unwrap();
    assert!(paths.charts.is_empty());
    assert!(paths.trades_parquet.is_none());
    assert!(paths.report_markdown.is_none());
    assert!(!paths.run_dir.join("equity_curve.html").exists());
}

#[test]
fn rerun_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), LOG);
    let config = config(dir.path());

    let a = run_analysis(&input, &config).unwrap();
    let pa = save_artifacts(&a, &config.output).unwrap();
    let series_a = std::fs::read_to_string(&pa.series_json).unwrap();

    let b = run_analysis(&input, &config).unwrap();
    let pb = save_artifacts(&b, &config.output).unwrap();
    let series_b = std::fs::read_to_string(&pb.series_json).unwrap();

    assert_eq!(a.run_id, b.run_id);
    assert_eq!(pa.run_dir, pb.run_dir);
    assert_eq!(series_a, series_b);
}

#[test]
fn missing_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(dir.path(), "Date,Trade_Ref\n2024-03-04,T1\n");
    let err = run_analysis(&input, &config(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        RunError::Load(LoadError::MissingColumn { field: "trigger_time", .. })
    ));
}

#[test]
fn nothing_matched_is_run_level_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_log(
        dir.path(),
        "Date,Trigger Time,Trade_Ref,Buy/Sell,Symbol,Trade Price,Qty,Brokerage,Other_Charges\n\
         2024-03-04,09:15:00,T1,Buy,SBIN,100,1,0,0\n",
    );
    let err = run_analysis(&input, &config(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        RunError::Pipeline(PipelineError::NoTrades { legs: 1, .. })
    ));
}
