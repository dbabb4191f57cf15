//! Performance summary — a pure reduction of the returns frame.
//!
//! Ratios with an empty denominator are `None` ("undefined"), never 0 and
//! never a panic.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::engine::returns::ReturnsFrame;
use crate::error::EngineError;
use crate::strategy::StrategyKind;

/// Scalar metrics for one engine run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_return: f64,
    pub benchmark_return: f64,
    /// Σ|position change| / 2, truncated. This undercounts when the signal
    /// flips straight from 1 to -1; kept for comparability with the dashboard.
    pub trade_count: usize,
    pub win_rate: Option<f64>,
    pub avg_profit: Option<f64>,
    pub avg_loss: Option<f64>,
}

impl PerformanceReport {
    pub fn summarize(returns: &ReturnsFrame, position_changes: &[Option<i8>]) -> Self {
        let total_changes: u64 = position_changes
            .iter()
            .flatten()
            .map(|c| u64::from(c.unsigned_abs()))
            .sum();

        let mut wins = 0usize;
        let mut nonzero = 0usize;
        let mut profits = Vec::new();
        let mut losses = Vec::new();
        for r in returns.defined_strategy_returns() {
            if r != 0.0 {
                nonzero += 1;
            }
            if r > 0.0 {
                wins += 1;
                profits.push(r);
            } else if r < 0.0 {
                losses.push(r);
            }
        }

        Self {
            total_return: returns.final_strategy_equity() - 1.0,
            benchmark_return: returns.final_benchmark_equity() - 1.0,
            trade_count: (total_changes / 2) as usize,
            win_rate: ratio(wins, nonzero),
            avg_profit: mean(&profits),
            avg_loss: mean(&losses),
        }
    }

    /// Win rate, or `DegenerateMetric` when the strategy never had a nonzero
    /// return.
    pub fn win_rate_strict(&self) -> Result<f64, EngineError> {
        self.win_rate
            .ok_or(EngineError::DegenerateMetric("win_rate"))
    }

    /// The dashboard's "Backtest Results" text for this report.
    pub fn to_markdown(&self, strategy: StrategyKind) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "**{strategy} Backtest Results**");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Total Return : {}**. It represents the percentage increase or decrease in the value of the investment from the start to the end of the period.",
            fmt_pct(Some(self.total_return))
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Benchmark Return : {}**, which in this case is the closing price of the stock without any strategy. It serves as a reference point to compare the performance of the strategy against simply holding the stock.",
            fmt_pct(Some(self.benchmark_return))
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Total Trades : {}**. It includes both buy and sell actions executed during the backtest.",
            self.trade_count
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Win Rate : {}**. It indicates how often the {strategy} strategy made a profit.",
            fmt_pct(self.win_rate)
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Average Profit : {}**. It provides insight into the typical profit generated by successful trades.",
            fmt_pct(self.avg_profit)
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**Average Loss per Trade : {}**. Average loss incurred on losing trades. It helps to understand the typical loss experienced by unsuccessful trades.",
            fmt_pct(self.avg_loss)
        );
        out
    }
}

/// Format a fraction as a percentage with two decimals; `n/a` if undefined.
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => "n/a".to_string(),
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use crate::signals::position_changes;

    fn report(closes: &[f64], signals: &[i8]) -> PerformanceReport {
        let frame = ReturnsFrame::compute(closes, signals);
        PerformanceReport::summarize(&frame, &position_changes(signals))
    }

    #[test]
    fn never_trading_leaves_ratios_undefined() {
        let r = report(&[100.0, 101.0, 99.0, 102.0], &[0, 0, 0, 0]);
        assert_eq!(r.total_return, 0.0);
        assert_approx(r.benchmark_return, 0.02, DEFAULT_EPSILON);
        assert_eq!(r.trade_count, 0);
        assert_eq!(r.win_rate, None);
        assert_eq!(r.avg_profit, None);
        assert_eq!(r.avg_loss, None);
        assert_eq!(
            r.win_rate_strict(),
            Err(EngineError::DegenerateMetric("win_rate"))
        );
    }

    #[test]
    fn win_rate_and_averages() {
        // strategy returns: -, 0 (flat), +0.1, -0.1/1.1, +0.05
        let closes = [100.0, 100.0, 110.0, 100.0, 105.0];
        let r = report(&closes, &[0, 1, 1, 1, 0]);
        assert_approx(r.win_rate.unwrap(), 2.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(r.avg_profit.unwrap(), (0.1 + 0.05) / 2.0, DEFAULT_EPSILON);
        assert_approx(r.avg_loss.unwrap(), 100.0 / 110.0 - 1.0, DEFAULT_EPSILON);
        assert_approx(r.total_return, 0.05, 1e-12);
        assert_eq!(r.win_rate_strict().unwrap(), r.win_rate.unwrap());
    }

    #[test]
    fn trade_count_is_half_absolute_changes() {
        // changes: 1, 0, -1 → Σ = 2 → 1 trade
        let r = report(&[1.0, 2.0, 3.0, 4.0], &[0, 1, 1, 0]);
        assert_eq!(r.trade_count, 1);

        // changes: 1, -2 → Σ = 3 → 1 (truncated)
        let r = report(&[1.0, 2.0, 3.0], &[0, 1, -1]);
        assert_eq!(r.trade_count, 1);

        // single entry, never exited: Σ = 1 → 0
        let r = report(&[1.0, 2.0, 3.0], &[0, 1, 1]);
        assert_eq!(r.trade_count, 0);
    }

    #[test]
    fn fmt_pct_two_decimals() {
        assert_eq!(fmt_pct(Some(0.12345)), "12.35%");
        assert_eq!(fmt_pct(Some(-0.1)), "-10.00%");
        assert_eq!(fmt_pct(None), "n/a");
        assert_eq!(fmt_pct(Some(f64::NAN)), "n/a");
    }

    #[test]
    fn markdown_mentions_every_metric() {
        let r = report(&[100.0, 100.0, 110.0, 100.0, 105.0], &[0, 1, 1, 1, 0]);
        let md = r.to_markdown(StrategyKind::Rsi);
        assert!(md.starts_with("**RSI Backtest Results**"));
        assert!(md.contains("**Total Return : 5.00%**"));
        assert!(md.contains("**Total Trades : 1**"));
        assert!(md.contains("**Win Rate : 66.67%**"));
    }

    #[test]
    fn markdown_undefined_metrics() {
        let r = report(&[100.0, 101.0], &[0, 0]);
        let md = r.to_markdown(StrategyKind::None);
        assert!(md.contains("**Win Rate : n/a**"));
        assert!(md.contains("**Average Loss per Trade : n/a**"));
    }
}
