//! StockDash CLI — run backtests, list strategies, generate synthetic prices.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file or a single CSV
//! - `strategies` — list every strategy with its parameter table
//! - `synth` — write a synthetic random-walk price CSV

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stockdash_core::strategy::{param_specs, StrategyKind, StrategyParameters};
use stockdash_runner::data_loader::{generate_synthetic_bars, write_bars};
use stockdash_runner::{
    generate_comparison, generate_report, load_csv, run_all, run_series, save_artifacts,
    BacktestConfig, BacktestResult,
};

#[derive(Parser)]
#[command(name = "stockdash", about = "StockDash CLI — strategy backtesting on daily prices")]
struct Cli {
    /// Emit logs as JSON instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or a single CSV.
    Run {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with_all = ["strategy", "csv"])]
        config: Option<PathBuf>,

        /// Strategy name, e.g. "MACD" or bollinger_bands (required with --csv).
        #[arg(long)]
        strategy: Option<String>,

        /// Price CSV with date,open,high,low,close,volume columns.
        #[arg(long, requires = "strategy")]
        csv: Option<PathBuf>,

        /// Symbol label for a --csv run. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Strategy parameter override, repeatable: --param rsi_period=10
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// List strategies and their parameters.
    Strategies,
    /// Write synthetic daily bars to a CSV file.
    Synth {
        /// Symbol used to seed the random walk.
        #[arg(long)]
        symbol: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = "2020-01-02")]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long, default_value = "2024-12-31")]
        end: String,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Run {
            config,
            strategy,
            csv,
            symbol,
            params,
            output_dir,
        } => run_cmd(config, strategy, csv, symbol, params, output_dir),
        Commands::Strategies => {
            print_strategies();
            Ok(())
        }
        Commands::Synth {
            symbol,
            start,
            end,
            out,
        } => run_synth(&symbol, &start, &end, out),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    Ok((key.trim().to_string(), value))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn run_cmd(
    config_path: Option<PathBuf>,
    strategy: Option<String>,
    csv: Option<PathBuf>,
    symbol: Option<String>,
    params: Vec<(String, f64)>,
    output_dir: PathBuf,
) -> Result<()> {
    let results = match (config_path, csv) {
        (Some(path), _) => {
            let mut config = BacktestConfig::from_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            for (key, value) in params {
                config = config.with_param(key, value);
            }
            collect_results(run_all(&config))?
        }
        (None, Some(csv_path)) => {
            let name = strategy.unwrap_or_default();
            let kind: StrategyKind = name.parse()?;
            let params: StrategyParameters = params
                .into_iter()
                .collect::<StrategyParameters>()
                .or_defaults(kind);
            let symbol = symbol
                .or_else(|| {
                    csv_path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| "UNKNOWN".to_string());
            let series = load_csv(&csv_path)
                .with_context(|| format!("loading {}", csv_path.display()))?;
            vec![run_series(&symbol, &series, kind, &params, false)?]
        }
        (None, None) => bail!("one of --config or --csv is required"),
    };

    for result in &results {
        println!("{}", generate_report(result));
        let dir = save_artifacts(result, &output_dir)?;
        info!(symbol = %result.symbol, dir = %dir.display(), "artifacts saved");
    }
    if results.len() > 1 {
        println!("{}", generate_comparison(&results));
    }
    Ok(())
}

/// Keep successful runs; log each failure. Fails only if every run failed.
fn collect_results(
    results: Vec<(String, Result<BacktestResult, stockdash_runner::RunError>)>,
) -> Result<Vec<BacktestResult>> {
    let total = results.len();
    let mut ok = Vec::with_capacity(total);
    for (symbol, result) in results {
        match result {
            Ok(r) => ok.push(r),
            Err(e) => error!(symbol = %symbol, error = %e, "backtest failed"),
        }
    }
    if ok.is_empty() {
        bail!("all {total} backtests failed");
    }
    Ok(ok)
}

fn print_strategies() {
    for kind in StrategyKind::ALL {
        println!("{} ({})", kind, kind.key());
        let specs = param_specs(kind);
        if specs.is_empty() {
            println!("    (no parameters)");
        }
        for spec in specs {
            println!(
                "    {:<12} {:<40} default {:<6} min {}",
                spec.key, spec.label, spec.default, spec.min
            );
        }
    }
}

fn run_synth(symbol: &str, start: &str, end: &str, out: PathBuf) -> Result<()> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        bail!("--start {start} is after --end {end}");
    }
    let bars = generate_synthetic_bars(symbol, start, end);
    let file = std::fs::File::create(&out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    write_bars(&bars, file)?;
    info!(symbol, bars = bars.len(), out = %out.display(), "synthetic prices written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_param_accepts_key_value() {
        assert_eq!(parse_param("rsi_period=10"), Ok(("rsi_period".into(), 10.0)));
        assert_eq!(parse_param(" bb_std = 2.5 "), Ok(("bb_std".into(), 2.5)));
        assert!(parse_param("rsi_period").is_err());
        assert!(parse_param("rsi_period=ten").is_err());
    }

    #[test]
    fn run_args_parse() {
        let cli = Cli::try_parse_from([
            "stockdash",
            "run",
            "--strategy",
            "MACD",
            "--csv",
            "prices/SPY.csv",
            "--param",
            "macd_fast=8",
            "--param",
            "macd_slow=21",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                strategy, params, ..
            } => {
                assert_eq!(strategy.as_deref(), Some("MACD"));
                assert_eq!(params.len(), 2);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn config_conflicts_with_csv() {
        let res = Cli::try_parse_from([
            "stockdash",
            "run",
            "--config",
            "a.toml",
            "--csv",
            "b.csv",
            "--strategy",
            "rsi",
        ]);
        assert!(res.is_err());
    }
}
