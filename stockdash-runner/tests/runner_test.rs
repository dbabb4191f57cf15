//! Integration tests for the runner: config file → CSV load → run → artifacts.

use std::path::Path;

use chrono::NaiveDate;
use stockdash_core::strategy::StrategyKind;
use stockdash_runner::data_loader::{generate_synthetic_bars, write_bars};
use stockdash_runner::{
    load_artifacts, run_all, run_symbol, save_artifacts, BacktestConfig, RunError,
};

fn write_symbol_csv(dir: &Path, symbol: &str) {
    let bars = generate_synthetic_bars(
        symbol,
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
    );
    let file = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
    write_bars(&bars, file).unwrap();
}

fn config_for(dir: &Path, strategy: &str, symbols: &[&str]) -> BacktestConfig {
    let symbols = symbols
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let toml = format!(
        r#"[backtest]
symbols = [{symbols}]
strategy = "{strategy}"
data_dir = "{}"
"#,
        dir.display()
    );
    BacktestConfig::from_toml(&toml).unwrap()
}

#[test]
fn csv_backed_run_and_artifacts() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_symbol_csv(data.path(), "AAPL");

    let config = config_for(data.path(), "Moving Average Crossover", &["AAPL"]);
    let result = run_symbol(&config, "AAPL").unwrap();
    assert_eq!(result.strategy, StrategyKind::MovingAverageCrossover);
    assert!(!result.has_synthetic);
    assert!(result.bar_count > 200);

    let dir = save_artifacts(&result, out.path()).unwrap();
    assert_eq!(dir, out.path().join("AAPL"));
    for name in ["result.json", "frame.csv", "trades.csv", "report.md"] {
        assert!(dir.join(name).exists(), "missing {name}");
    }

    let frame = std::fs::read_to_string(dir.join("frame.csv")).unwrap();
    let header = frame.lines().next().unwrap();
    assert!(header.contains(",EMA,SMA,Signal,"));
    assert_eq!(frame.lines().count(), result.bar_count + 1);

    let loaded = load_artifacts(&dir).unwrap();
    assert_eq!(loaded.report, result.report);
    assert_eq!(loaded.fingerprint, result.fingerprint);
}

#[test]
fn same_data_same_fingerprint() {
    let data = tempfile::tempdir().unwrap();
    write_symbol_csv(data.path(), "SPY");
    let config = config_for(data.path(), "rsi", &["SPY"]);
    let a = run_symbol(&config, "SPY").unwrap();
    let b = run_symbol(&config, "SPY").unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.report, b.report);
}

#[test]
fn run_all_isolates_failures() {
    let data = tempfile::tempdir().unwrap();
    write_symbol_csv(data.path(), "MSFT");
    let config = config_for(data.path(), "Bollinger Bands", &["MSFT", "NOPE"]);

    let results = run_all(&config);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "MSFT");
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, "NOPE");
    assert!(matches!(results[1].1, Err(RunError::Data(_))));
}

#[test]
fn invalid_params_surface_as_engine_error() {
    let data = tempfile::tempdir().unwrap();
    write_symbol_csv(data.path(), "QQQ");
    let config = config_for(data.path(), "MACD", &["QQQ"]).with_param("macd_fast", 0.0);
    let err = run_symbol(&config, "QQQ").unwrap_err();
    assert!(err.to_string().contains("macd_fast"), "{err}");
}
