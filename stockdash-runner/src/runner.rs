//! Backtest runner — wires together config, data loading and the engine.
//!
//! Entry points:
//! - `run_symbol()`: loads one symbol per the config, then runs. Used by the CLI.
//! - `run_all()`: every configured symbol, in parallel.
//! - `run_series()`: takes a pre-loaded series. Used for ad hoc CSV runs.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use stockdash_core::domain::PriceSeries;
use stockdash_core::engine::{run_backtest, BacktestOutput};
use stockdash_core::error::EngineError;
use stockdash_core::fingerprint::RunFingerprint;
use stockdash_core::performance::PerformanceReport;
use stockdash_core::strategy::{StrategyKind, StrategyParameters};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_symbol, LoadError, LoadOptions};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Result of one backtest run on one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub strategy: StrategyKind,
    /// Canonical parameters the engine ran with.
    pub params: StrategyParameters,
    pub bar_count: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub has_synthetic: bool,
    pub report: PerformanceReport,
    pub fingerprint: RunFingerprint,
    /// Full engine output (frame, signals, equity). Not persisted in JSON;
    /// the CSV artifacts carry it.
    #[serde(skip)]
    pub output: Option<BacktestOutput>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    fn from_output(symbol: &str, output: BacktestOutput, has_synthetic: bool) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            symbol: symbol.to_string(),
            strategy: output.strategy,
            params: output.params.clone(),
            bar_count: output.len(),
            start_date: output.bars.first().map(|b| b.date),
            end_date: output.bars.last().map(|b| b.date),
            has_synthetic,
            report: output.report.clone(),
            fingerprint: output.fingerprint.clone(),
            output: Some(output),
        }
    }
}

/// Load options implied by a config.
pub fn load_options(config: &BacktestConfig) -> LoadOptions {
    LoadOptions {
        data_dir: config.backtest.data_dir.clone(),
        synthetic: config.backtest.synthetic,
        start: config.backtest.start_date,
        end: config.backtest.end_date,
    }
}

/// Run the configured strategy on an already loaded series.
pub fn run_series(
    symbol: &str,
    series: &PriceSeries,
    kind: StrategyKind,
    params: &StrategyParameters,
    has_synthetic: bool,
) -> Result<BacktestResult, EngineError> {
    let output = run_backtest(series, kind, params)?;
    info!(
        symbol,
        strategy = %kind,
        bars = output.len(),
        total_return = output.report.total_return,
        trade_count = output.report.trade_count,
        fingerprint = output.fingerprint.short(),
        "backtest complete"
    );
    Ok(BacktestResult::from_output(symbol, output, has_synthetic))
}

/// Load `symbol` per the config and run the configured strategy on it.
pub fn run_symbol(config: &BacktestConfig, symbol: &str) -> Result<BacktestResult, RunError> {
    let kind = config.strategy_kind()?;
    let params = config.parameters()?;
    let loaded = load_symbol(symbol, &load_options(config))?;
    Ok(run_series(
        symbol,
        &loaded.series,
        kind,
        &params,
        loaded.is_synthetic(),
    )?)
}

/// Run every configured symbol in parallel. Results keep the config's
/// symbol order; one symbol failing does not affect the others.
pub fn run_all(config: &BacktestConfig) -> Vec<(String, Result<BacktestResult, RunError>)> {
    config
        .backtest
        .symbols
        .par_iter()
        .map(|symbol| (symbol.clone(), run_symbol(config, symbol)))
        .collect()
}
