//! Bollinger Bands mean reversion — buy below the lower band, sell above the
//! upper band.

/// 1 where close < lower, -1 where close > upper, 0 elsewhere.
///
/// The series starts at 0 and only trigger bars are overwritten; a bar
/// between the bands does not inherit the previous bar's signal.
pub fn signals(closes: &[f64], lower: &[f64], upper: &[f64]) -> Vec<i8> {
    let mut signal = vec![0i8; closes.len()];
    for (i, s) in signal.iter_mut().enumerate() {
        if closes[i] < lower[i] {
            *s = 1;
        }
        if closes[i] > upper[i] {
            *s = -1;
        }
    }
    signal
}
