//! Moving Average Convergence Divergence (MACD).
//!
//! - Line: EMA(close, fast) - EMA(close, slow), each EMA masked until it has
//!   seen `period` closes.
//! - Signal: EMA(line, signal), seeded at the first defined line value and
//!   masked until `signal` defined line values.
//! - Histogram: line - signal.
//!
//! Lookback: max(fast, slow) - 1 for the line, plus signal - 1 for the
//! signal line and histogram.

use super::ema::ema_of_series;
use super::indicator::Indicator;
use crate::domain::Bar;

/// Which MACD output series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
    Histogram,
}

impl MacdOutput {
    pub fn column(&self) -> &'static str {
        match self {
            MacdOutput::Line => "MACD",
            MacdOutput::Signal => "Signal_Line",
            MacdOutput::Histogram => "MACD_Histogram",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
}

impl Macd {
    pub fn new(output: MacdOutput, fast: usize, slow: usize, signal: usize) -> Self {
        assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "MACD periods must be >= 1"
        );
        Self {
            fast,
            slow,
            signal,
            output,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        self.output.column()
    }

    fn lookback(&self) -> usize {
        let line = self.fast.max(self.slow) - 1;
        match self.output {
            MacdOutput::Line => line,
            MacdOutput::Signal | MacdOutput::Histogram => line + self.signal - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let (line, signal, histogram) =
            macd_of_series(&super::closes(bars), self.fast, self.slow, self.signal);
        match self.output {
            MacdOutput::Line => line,
            MacdOutput::Signal => signal,
            MacdOutput::Histogram => histogram,
        }
    }
}

/// MACD line, signal line and histogram of a close series.
pub fn macd_of_series(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let ema_fast = ema_of_series(closes, fast, fast);
    let ema_slow = ema_of_series(closes, slow, slow);
    let line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_series(&line, signal, signal);
    let histogram = line.iter().zip(&signal_line).map(|(l, s)| l - s).collect();
    (line, signal_line, histogram)
}
