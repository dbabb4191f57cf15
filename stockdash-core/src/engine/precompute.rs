//! Indicator precomputation.
//!
//! All indicators a strategy needs are computed once, up front, over the
//! whole price history. Results land in a fresh `IndicatorFrame` per run.

use crate::domain::Bar;
use crate::indicators::{
    Bollinger, BollingerBand, Ema, Indicator, IndicatorFrame, Macd, MacdOutput, Rsi, Sma,
};
use crate::strategy::ResolvedStrategy;

/// Indicators whose columns the strategy's signal rule reads or the chart
/// layer plots.
pub fn required_indicators(strategy: &ResolvedStrategy) -> Vec<Box<dyn Indicator>> {
    match *strategy {
        ResolvedStrategy::MovingAverageCrossover {
            sma_period,
            ema_period,
        } => vec![Box::new(Sma::new(sma_period)), Box::new(Ema::new(ema_period))],
        ResolvedStrategy::BollingerBands {
            period,
            std_multiplier,
        } => [
            BollingerBand::Middle,
            BollingerBand::Upper,
            BollingerBand::Lower,
        ]
        .into_iter()
        .map(|band| Box::new(Bollinger::new(band, period, std_multiplier)) as Box<dyn Indicator>)
        .collect(),
        ResolvedStrategy::Macd { fast, slow, signal } => {
            [MacdOutput::Line, MacdOutput::Signal, MacdOutput::Histogram]
                .into_iter()
                .map(|out| Box::new(Macd::new(out, fast, slow, signal)) as Box<dyn Indicator>)
                .collect()
        }
        ResolvedStrategy::Rsi { period } => vec![Box::new(Rsi::new(period))],
        ResolvedStrategy::None => Vec::new(),
    }
}

/// Compute every indicator over `bars` into a new frame.
pub fn precompute_indicators(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorFrame {
    let mut frame = IndicatorFrame::new();
    for indicator in indicators {
        frame.compute_into(indicator.as_ref(), bars);
        debug_assert_eq!(
            frame.column(indicator.name()).map(|c| c.len()),
            Ok(bars.len()),
            "indicator '{}' is not aligned with the bars",
            indicator.name()
        );
    }
    frame
}
