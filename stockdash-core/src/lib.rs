//! StockDash Core — indicators, signals, returns and performance reporting.
//!
//! This crate contains the backtesting engine behind the dashboard:
//! - Domain types (bars, validated price series)
//! - Indicator library (SMA, EMA, Bollinger, MACD, RSI)
//! - Strategy configuration and parameter validation
//! - Signal generation and position changes
//! - Lag-one returns, equity curves and the performance summary
//!
//! Everything here is a pure function of its inputs. No I/O, no global state.

pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod performance;
pub mod signals;
pub mod strategy;

pub use domain::{Bar, PriceSeries};
pub use engine::{run_backtest, run_named, BacktestOutput, ReturnsFrame};
pub use error::EngineError;
pub use fingerprint::RunFingerprint;
pub use performance::PerformanceReport;
pub use strategy::{StrategyKind, StrategyParameters};
