//! RSI mean reversion — buy oversold, sell overbought.

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

/// 1 where RSI < 30, -1 where RSI > 70, 0 elsewhere.
pub fn signals(rsi: &[f64]) -> Vec<i8> {
    rsi.iter()
        .map(|&v| {
            if v < OVERSOLD {
                1
            } else if v > OVERBOUGHT {
                -1
            } else {
                0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_strict() {
        let rsi = [f64::NAN, 29.9, 30.0, 50.0, 70.0, 70.1];
        assert_eq!(signals(&rsi), vec![0, 1, 0, 0, 0, -1]);
    }
}
