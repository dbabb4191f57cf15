//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses the sample stddev (divide by N - 1), so a period of 1 leaves the
//! upper and lower bands undefined.
//! Lookback: period - 1.

use super::indicator::Indicator;
use super::sma::sma_of_series;
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

impl BollingerBand {
    pub fn column(&self) -> &'static str {
        match self {
            BollingerBand::Upper => "Upper_Band",
            BollingerBand::Middle => "Middle_Band",
            BollingerBand::Lower => "Lower_Band",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
}

impl Bollinger {
    pub fn new(band: BollingerBand, period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            band,
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Upper, period, multiplier)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Middle, period, multiplier)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Lower, period, multiplier)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        self.band.column()
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = super::closes(bars);
        let middle = sma_of_series(&closes, self.period);
        if self.band == BollingerBand::Middle {
            return middle;
        }

        let stddev = rolling_sample_std(&closes, self.period);
        let sign = if self.band == BollingerBand::Upper {
            1.0
        } else {
            -1.0
        };
        middle
            .iter()
            .zip(&stddev)
            .map(|(&m, &sd)| m + sign * sd * self.multiplier)
            .collect()
    }
}

/// Rolling sample standard deviation (N - 1 denominator).
pub fn rolling_sample_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period < 2 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let sum_sq: f64 = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();
        result[i] = (sum_sq / (period - 1) as f64).sqrt();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Bollinger::middle(3, 2.0).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_uses_sample_stddev() {
        // Window (10, 11, 12): mean 11, sample variance (1 + 0 + 1) / 2 = 1
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);
        assert_approx(upper[2], 13.0, DEFAULT_EPSILON);
        assert_approx(lower[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let bars = make_bars(&[10.0, 11.5, 12.0, 10.5, 14.0]);
        let upper = Bollinger::upper(3, 1.5).compute(&bars);
        let middle = Bollinger::middle(3, 1.5).compute(&bars);
        let lower = Bollinger::lower(3, 1.5).compute(&bars);

        for i in 2..5 {
            let half_width = upper[i] - middle[i];
            assert_approx(middle[i] - lower[i], half_width, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);
        assert_approx(upper[2], 100.0, DEFAULT_EPSILON);
        assert_approx(lower[2], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_period_one_has_no_bands() {
        let bars = make_bars(&[10.0, 11.0]);
        let upper = Bollinger::upper(1, 2.0).compute(&bars);
        let middle = Bollinger::middle(1, 2.0).compute(&bars);
        assert!(upper.iter().all(|v| v.is_nan()));
        assert_approx(middle[1], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_column_names() {
        assert_eq!(Bollinger::upper(20, 2.0).name(), "Upper_Band");
        assert_eq!(Bollinger::middle(20, 2.0).name(), "Middle_Band");
        assert_eq!(Bollinger::lower(20, 2.0).name(), "Lower_Band");
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
    }
}
