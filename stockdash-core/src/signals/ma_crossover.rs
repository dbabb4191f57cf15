//! Moving average crossover — long while the EMA sits above the SMA.
//!
//! Bars before index `sma_period` keep the neutral 0, even though the SMA is
//! already defined at `sma_period - 1`.

/// Signal series: 1 where EMA > SMA from bar `sma_period` onward, else 0.
pub fn signals(ema: &[f64], sma: &[f64], sma_period: usize) -> Vec<i8> {
    let mut signal = vec![0i8; ema.len()];
    for i in sma_period..ema.len() {
        signal[i] = if ema[i] > sma[i] { 1 } else { 0 };
    }
    signal
}
