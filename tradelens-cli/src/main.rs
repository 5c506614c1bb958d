//! TradeLens CLI — analyze execution logs and check their data quality.
//!
//! Commands:
//! - `analyze` — reconcile legs into trades, print a summary, write artifacts
//! - `check` — run ingestion and the pipeline, print only the data-quality report

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tradelens_core::{DuplicatePolicy, PipelineReport};
use tradelens_runner::{
    run_analysis, run_dir_name, save_artifacts, AnalysisConfig, AnalysisResult,
};

#[derive(Parser)]
#[command(
    name = "tradelens",
    about = "TradeLens CLI — trade reconciliation and performance analytics"
)]
struct Cli {
    /// Debug-level logging on stderr (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile an execution log, print a summary, and save artifacts.
    Analyze {
        /// Execution log (CSV with a header row).
        input: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts (overrides the config).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// How to treat several legs on one side of a trade reference.
        #[arg(long, value_enum)]
        duplicate_policy: Option<PolicyArg>,

        /// Skip HTML chart rendering.
        #[arg(long, default_value_t = false)]
        no_charts: bool,
    },
    /// Report data-quality problems without writing artifacts.
    Check {
        /// Execution log (CSV with a header row).
        input: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Exclude the reference and report it.
    Reject,
    /// Sum partial fills before pairing.
    Merge,
}

impl From<PolicyArg> for DuplicatePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Reject => DuplicatePolicy::Reject,
            PolicyArg::Merge => DuplicatePolicy::MergePartialFills,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            input,
            config,
            output_dir,
            duplicate_policy,
            no_charts,
        } => run_analyze_cmd(
            &input,
            config.as_deref(),
            output_dir,
            duplicate_policy,
            no_charts,
        ),
        Commands::Check {
            input,
            config,
            json,
        } => run_check_cmd(&input, config.as_deref(), json),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn ensure_input(input: &Path) -> Result<()> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn run_analyze_cmd(
    input: &Path,
    config_path: Option<&Path>,
    output_dir: Option<PathBuf>,
    duplicate_policy: Option<PolicyArg>,
    no_charts: bool,
) -> Result<()> {
    ensure_input(input)?;
    let mut config = load_config(config_path)?;
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
    if let Some(policy) = duplicate_policy {
        config.matching.duplicate_policy = policy.into();
    }
    if no_charts {
        config.output.charts = false;
    }
    debug!(?config, "effective configuration");

    let result = run_analysis(input, &config)?;

    print_summary(&result);
    print_report(&result.output.report);

    let paths = save_artifacts(&result, &config.output)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn run_check_cmd(input: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    ensure_input(input)?;
    let config = load_config(config_path)?;
    let result = run_analysis(input, &config)?;
    let report = &result.output.report;

    if json {
        let out = serde_json::to_string_pretty(report).context("serializing report")?;
        println!("{out}");
    } else {
        println!(
            "{}: {} rows, {} legs, {} trades",
            input.display(),
            report.input_rows,
            report.normalized_legs,
            report.matched_trades
        );
        print_report(report);
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let s = &result.output.summary;
    let seq = &result.output.sequence;
    println!();
    println!("=== Trade Analysis ===");
    println!("Source:         {}", result.source);
    if let (Some(first), Some(last)) = (
        seq.trades.first().and_then(|t| t.trade.entry_date),
        seq.trades.last().and_then(|t| t.trade.entry_date),
    ) {
        println!("Period:         {first} to {last}");
    }
    println!("Run ID:         {}", run_dir_name(&result.run_id));
    println!("Trades:         {}", s.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Net PnL:        {:.2}", s.total_net_pnl);
    println!("Gross PnL:      {:.2}", s.total_gross_pnl);
    println!(
        "Costs:          {:.2}",
        s.total_brokerage + s.total_other_charges
    );
    println!("Win Rate:       {:.1}%", s.win_rate_pct);
    println!("Profit Factor:  {:.2}", s.profit_factor);
    println!("Max Drawdown:   {:.2}", s.max_drawdown);
    println!("Best Trade:     {:.2}", s.best_trade);
    println!("Worst Trade:    {:.2}", s.worst_trade);
    if let Some(r) = s.avg_return_pct {
        println!("Avg Return:     {r:.2}%");
    }
    if let Some(d) = s.avg_duration_minutes {
        println!("Avg Duration:   {d:.1} min");
    }
    println!("Max Consec Win: {}", s.max_consecutive_wins);
    println!("Max Consec Loss:{}", s.max_consecutive_losses);
    println!();
}

fn print_report(report: &PipelineReport) {
    if report.is_clean() {
        println!("Data quality:   no problems found");
        return;
    }
    for line in report.summary_lines() {
        println!("WARNING: {line}");
    }
    println!();
}
