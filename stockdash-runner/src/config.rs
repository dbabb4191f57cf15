//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! symbols = ["AAPL", "MSFT"]
//! strategy = "MACD"
//! data_dir = "data"
//! synthetic = false
//! start_date = "2023-01-02"
//! end_date = "2024-12-31"
//!
//! [params]
//! macd_fast = 12
//! macd_slow = 26
//! macd_signal = 9
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockdash_core::error::EngineError;
use stockdash_core::strategy::{StrategyKind, StrategyParameters};

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Strategy(#[source] EngineError),

    #[error("config lists no symbols")]
    NoSymbols,

    #[error("start_date {start} is after end_date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
}

/// Top-level config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,

    /// Strategy parameters by key. Keys the strategy declares but this table
    /// omits are filled from the defaults.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

/// The `[backtest]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub symbols: Vec<String>,

    /// Strategy name: display name ("Bollinger Bands") or key (`bollinger_bands`).
    #[serde(default)]
    pub strategy: String,

    /// Directory holding `<SYMBOL>.csv` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Generate a random walk when a symbol has no CSV.
    #[serde(default)]
    pub synthetic: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl BacktestConfig {
    /// Config for one strategy over `symbols` with default settings.
    pub fn new(symbols: Vec<String>, strategy: StrategyKind) -> Self {
        Self {
            backtest: BacktestSection {
                symbols,
                strategy: strategy.key().to_string(),
                data_dir: default_data_dir(),
                synthetic: false,
                start_date: None,
                end_date: None,
            },
            params: BTreeMap::new(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Structural checks. Parameter values are checked by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        self.strategy_kind()?;
        if let (Some(start), Some(end)) = (self.backtest.start_date, self.backtest.end_date) {
            if start > end {
                return Err(ConfigError::DateRange { start, end });
            }
        }
        Ok(())
    }

    pub fn strategy_kind(&self) -> Result<StrategyKind, ConfigError> {
        self.backtest
            .strategy
            .parse()
            .map_err(ConfigError::Strategy)
    }

    /// The `[params]` table with strategy defaults filled in.
    pub fn parameters(&self) -> Result<StrategyParameters, ConfigError> {
        let kind = self.strategy_kind()?;
        Ok(self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect::<StrategyParameters>()
            .or_defaults(kind))
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}
