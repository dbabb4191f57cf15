//! MACD crossover — long above the signal line, short below it.

/// 1 where line > signal, -1 where line < signal, 0 on ties or undefined bars.
pub fn signals(line: &[f64], signal_line: &[f64]) -> Vec<i8> {
    line.iter()
        .zip(signal_line)
        .map(|(&l, &s)| {
            if l > s {
                1
            } else if l < s {
                -1
            } else {
                0
            }
        })
        .collect()
}
