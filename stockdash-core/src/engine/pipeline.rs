//! The backtest pipeline: validate → indicators → signals → returns → report.
//!
//! Each call is a pure function of its arguments. Nothing is cached between
//! calls and the caller's price series is never mutated; the output owns a
//! copy of the bars it was computed from.

use serde::Serialize;
use tracing::debug;

use super::precompute::{precompute_indicators, required_indicators};
use super::returns::ReturnsFrame;
use crate::domain::{Bar, PriceSeries};
use crate::error::EngineError;
use crate::fingerprint::RunFingerprint;
use crate::indicators::IndicatorFrame;
use crate::performance::PerformanceReport;
use crate::signals::{generate_signals, position_changes, trade_events, TradeEvent};
use crate::strategy::{validate, StrategyKind, StrategyParameters};

/// Everything one engine run produces.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutput {
    pub strategy: StrategyKind,
    /// Canonical parameters actually used (declared keys only).
    pub params: StrategyParameters,
    pub bars: PriceSeries,
    pub indicators: IndicatorFrame,
    pub signals: Vec<i8>,
    pub position_changes: Vec<Option<i8>>,
    pub returns: ReturnsFrame,
    pub report: PerformanceReport,
    pub fingerprint: RunFingerprint,
}

impl BacktestOutput {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars where the position changed, for buy/sell markers.
    pub fn trade_events(&self) -> Vec<TradeEvent> {
        trade_events(self.bars.bars(), &self.position_changes)
    }

    /// Indicator column names, in the order `augmented_rows` emits them.
    pub fn indicator_columns(&self) -> Vec<&str> {
        self.indicators.names().collect()
    }

    /// The price frame with every derived column attached, one row per bar.
    pub fn augmented_rows(&self) -> Vec<AugmentedRow> {
        let columns = self.indicator_columns();
        self.bars
            .bars()
            .iter()
            .enumerate()
            .map(|(t, bar)| AugmentedRow {
                bar: bar.clone(),
                indicators: columns
                    .iter()
                    .map(|name| self.indicators.get(name, t).unwrap_or(f64::NAN))
                    .collect(),
                signal: self.signals[t],
                position: self.position_changes[t],
                raw_return: self.returns.raw_returns[t],
                strategy_return: self.returns.strategy_returns[t],
                cumulative_strategy: self.returns.cumulative_strategy[t],
                cumulative_benchmark: self.returns.cumulative_benchmark[t],
            })
            .collect()
    }
}

/// One bar of the augmented frame. `indicators` follows
/// `BacktestOutput::indicator_columns`; NaN marks an undefined value.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedRow {
    pub bar: Bar,
    pub indicators: Vec<f64>,
    pub signal: i8,
    pub position: Option<i8>,
    pub raw_return: Option<f64>,
    pub strategy_return: Option<f64>,
    pub cumulative_strategy: f64,
    pub cumulative_benchmark: f64,
}

/// Run one backtest of `kind` over `series`.
///
/// Fails with `EmptyInput` for an empty series (for every kind, `None`
/// included), with `MissingParameters` / `InvalidParameter` when the
/// parameters do not satisfy the strategy's schema, and with
/// `InsufficientData` when the series is shorter than the strategy's
/// required window.
pub fn run_backtest(
    series: &PriceSeries,
    kind: StrategyKind,
    params: &StrategyParameters,
) -> Result<BacktestOutput, EngineError> {
    if series.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let strategy = validate(kind, params)?;

    let required = strategy.required_bars();
    if series.len() < required {
        return Err(EngineError::InsufficientData {
            required,
            available: series.len(),
        });
    }

    let bars = series.bars();
    let closes = series.closes();

    let specs = required_indicators(&strategy);
    let warmup = specs.iter().map(|i| i.lookback()).max().unwrap_or(0);
    let indicators = precompute_indicators(bars, &specs);
    debug!(
        strategy = %kind,
        columns = indicators.len(),
        bars = bars.len(),
        warmup,
        "indicators computed"
    );

    let signals = generate_signals(&strategy, &indicators, &closes)?;
    let position_changes = position_changes(&signals);

    let returns = ReturnsFrame::compute(&closes, &signals);
    let report = PerformanceReport::summarize(&returns, &position_changes);
    debug!(
        strategy = %kind,
        total_return = report.total_return,
        trade_count = report.trade_count,
        "backtest summarized"
    );

    let params = strategy.parameters();
    let fingerprint = RunFingerprint::compute(kind, &params, bars);

    Ok(BacktestOutput {
        strategy: kind,
        params,
        bars: series.clone(),
        indicators,
        signals,
        position_changes,
        returns,
        report,
        fingerprint,
    })
}

/// Parse `strategy_name` and run it. Unknown names fail with `InvalidStrategy`.
pub fn run_named(
    series: &PriceSeries,
    strategy_name: &str,
    params: &StrategyParameters,
) -> Result<BacktestOutput, EngineError> {
    let kind: StrategyKind = strategy_name.parse()?;
    run_backtest(series, kind, params)
}
