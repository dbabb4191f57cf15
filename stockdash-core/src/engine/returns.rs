//! Returns — raw, strategy and cumulative equity series.
//!
//! Lag-one rule: the position decided at bar t-1's close earns the return
//! realized over bar t. Both equity curves start at exactly 1.0 on bar 0.

use serde::{Deserialize, Serialize};

/// Per-bar return and equity columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsFrame {
    /// close[t] / close[t-1] - 1; `None` at bar 0.
    pub raw_returns: Vec<Option<f64>>,
    /// raw_return[t] * signal[t-1]; `None` at bar 0.
    pub strategy_returns: Vec<Option<f64>>,
    pub cumulative_strategy: Vec<f64>,
    pub cumulative_benchmark: Vec<f64>,
}

impl ReturnsFrame {
    /// Compute the frame from closes and the signal series.
    ///
    /// `closes` and `signals` must be the same length.
    pub fn compute(closes: &[f64], signals: &[i8]) -> Self {
        debug_assert_eq!(closes.len(), signals.len());

        let raw_returns = raw_returns(closes);
        let strategy_returns: Vec<Option<f64>> = raw_returns
            .iter()
            .enumerate()
            .map(|(t, r)| r.map(|r| r * f64::from(signals[t - 1])))
            .collect();
        let cumulative_strategy = compound(&strategy_returns);
        let cumulative_benchmark = compound(&raw_returns);

        Self {
            raw_returns,
            strategy_returns,
            cumulative_strategy,
            cumulative_benchmark,
        }
    }

    pub fn len(&self) -> usize {
        self.raw_returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_returns.is_empty()
    }

    /// Final value of the strategy equity curve (1.0 for an empty frame).
    pub fn final_strategy_equity(&self) -> f64 {
        self.cumulative_strategy.last().copied().unwrap_or(1.0)
    }

    /// Final value of the buy-and-hold equity curve (1.0 for an empty frame).
    pub fn final_benchmark_equity(&self) -> f64 {
        self.cumulative_benchmark.last().copied().unwrap_or(1.0)
    }

    /// Strategy returns with the undefined first bar dropped.
    pub fn defined_strategy_returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.strategy_returns.iter().flatten().copied()
    }
}

/// Simple percentage change of a close series.
pub fn raw_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(closes.len());
    if !closes.is_empty() {
        returns.push(None);
    }
    returns.extend(closes.windows(2).map(|w| Some(w[1] / w[0] - 1.0)));
    returns
}

/// Running product of (1 + r), seeded at 1.0. Undefined returns count as 0.
pub fn compound(returns: &[Option<f64>]) -> Vec<f64> {
    let mut equity = 1.0;
    returns
        .iter()
        .enumerate()
        .map(|(t, r)| {
            if t > 0 {
                equity *= 1.0 + r.unwrap_or(0.0);
            }
            equity
        })
        .collect()
}
