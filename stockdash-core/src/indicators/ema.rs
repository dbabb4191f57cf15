//! Exponential Moving Average (EMA).
//!
//! Recursive form: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (period + 1), seeded with the first defined value
//! (no simple-average seed window).
//!
//! `min_periods` masks the output until that many defined observations
//! have been folded in. The recursion itself still starts at the seed.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    /// EMA column named `EMA`, as used by the moving average crossover.
    pub fn new(period: usize) -> Self {
        Self::named(period, "EMA")
    }

    pub fn named(period: usize, name: impl Into<String>) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: name.into(),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&super::closes(bars), self.period, 0)
    }
}

/// EMA of an arbitrary series.
///
/// Leading NaNs are skipped; the first defined value seeds the recursion.
/// A NaN after the seed repeats the previous average at that bar and leaves
/// the state untouched, as pandas `ewm(adjust=False).mean()` does.
pub fn ema_of_series(values: &[f64], period: usize, min_periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    let mut observed = 0usize;

    for (i, &x) in values.iter().enumerate() {
        if x.is_nan() {
            if let Some(p) = prev {
                if observed >= min_periods {
                    result[i] = p;
                }
            }
            continue;
        }
        let ema = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        prev = Some(ema);
        observed += 1;
        if observed >= min_periods {
            result[i] = ema;
        }
    }

    result
}
