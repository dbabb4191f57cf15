//! Signal generation — per-bar desired position from indicator columns.
//!
//! Signals live in {-1, 0, 1}. Each rule starts from an all-zero series and
//! overwrites only the bars where its condition holds, so comparisons against
//! undefined (NaN) indicator values leave the bar at 0.
//!
//! Dispatch is an exhaustive match over `ResolvedStrategy`; adding a strategy
//! breaks the build here until it has a rule.

pub mod bollinger;
pub mod ma_crossover;
pub mod macd;
pub mod rsi;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::EngineError;
use crate::indicators::IndicatorFrame;
use crate::strategy::ResolvedStrategy;

/// Compute the signal series for `strategy` from its indicator columns.
pub fn generate_signals(
    strategy: &ResolvedStrategy,
    frame: &IndicatorFrame,
    closes: &[f64],
) -> Result<Vec<i8>, EngineError> {
    let signal = match *strategy {
        ResolvedStrategy::MovingAverageCrossover { sma_period, .. } => {
            ma_crossover::signals(frame.column("EMA")?, frame.column("SMA")?, sma_period)
        }
        ResolvedStrategy::BollingerBands { .. } => bollinger::signals(
            closes,
            frame.column("Lower_Band")?,
            frame.column("Upper_Band")?,
        ),
        ResolvedStrategy::Macd { .. } => {
            macd::signals(frame.column("MACD")?, frame.column("Signal_Line")?)
        }
        ResolvedStrategy::Rsi { .. } => rsi::signals(frame.column("RSI")?),
        ResolvedStrategy::None => vec![0; closes.len()],
    };
    Ok(signal)
}

/// First difference of the signal series. Undefined at bar 0.
///
/// A nonzero entry marks a trade event; its magnitude is 1 or 2.
pub fn position_changes(signals: &[i8]) -> Vec<Option<i8>> {
    let mut changes = Vec::with_capacity(signals.len());
    if !signals.is_empty() {
        changes.push(None);
    }
    changes.extend(signals.windows(2).map(|w| Some(w[1] - w[0])));
    changes
}

/// Direction of a trade event, for chart markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A bar where the position changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub index: usize,
    pub date: NaiveDate,
    pub side: TradeSide,
    pub change: i8,
    pub close: f64,
}

/// Extract every nonzero position change as a `TradeEvent`.
pub fn trade_events(bars: &[Bar], changes: &[Option<i8>]) -> Vec<TradeEvent> {
    bars.iter()
        .zip(changes)
        .enumerate()
        .filter_map(|(index, (bar, change))| {
            let change = (*change)?;
            let side = match change.signum() {
                1 => TradeSide::Buy,
                -1 => TradeSide::Sell,
                _ => return None,
            };
            Some(TradeEvent {
                index,
                date: bar.date,
                side,
                change,
                close: bar.close,
            })
        })
        .collect()
}
