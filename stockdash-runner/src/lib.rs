//! StockDash Runner — backtest orchestration and artifact export.
//!
//! This crate builds on `stockdash-core` to provide:
//! - TOML run configuration with per-strategy parameter defaults
//! - Price loading from CSV with a synthetic fallback
//! - Single-symbol and parallel multi-symbol runners
//! - JSON, CSV and Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{BacktestConfig, ConfigError};
pub use data_loader::{load_csv, load_symbol, DataSource, LoadError, LoadOptions, LoadedSeries};
pub use export::{
    export_frame_csv, export_json, export_trades_csv, generate_comparison, generate_report,
    import_json, load_artifacts, save_artifacts,
};
pub use runner::{run_all, run_series, run_symbol, BacktestResult, RunError, SCHEMA_VERSION};
