//! Backtesting engine — a straight-line, vectorized pipeline.
//!
//! 1. Validate the strategy parameters
//! 2. Precompute indicator columns over the full history
//! 3. Derive the signal and position-change series
//! 4. Compute returns and equity curves (lag-one rule)
//! 5. Reduce to a `PerformanceReport`

pub mod pipeline;
pub mod precompute;
pub mod returns;

pub use pipeline::{run_backtest, run_named, AugmentedRow, BacktestOutput};
pub use precompute::{precompute_indicators, required_indicators};
pub use returns::ReturnsFrame;
