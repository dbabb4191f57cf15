//! Declarative per-strategy parameter schema and validation.
//!
//! The schema table is static and read-only. Callers use it to pre-fill
//! input widgets with defaults and to validate a parameter set before the
//! engine runs; the engine itself only accepts a `ResolvedStrategy`, the
//! typed result of validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StrategyKind;
use crate::error::EngineError;

/// Schema entry for one strategy parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub default: f64,
    /// Period lengths must be whole numbers.
    pub integral: bool,
}

const fn period(key: &'static str, label: &'static str, default: f64) -> ParamSpec {
    ParamSpec {
        key,
        label,
        min: 1.0,
        default,
        integral: true,
    }
}

const MA_CROSSOVER_PARAMS: &[ParamSpec] = &[
    period("sma_period", "SMA Period (days)", 50.0),
    period("ema_period", "EMA Period (days)", 20.0),
];

const BOLLINGER_PARAMS: &[ParamSpec] = &[
    period("bb_period", "Bollinger Bands Period (days)", 20.0),
    ParamSpec {
        key: "bb_std",
        label: "Bollinger Bands Standard Deviations",
        min: 0.01,
        default: 2.0,
        integral: false,
    },
];

const MACD_PARAMS: &[ParamSpec] = &[
    period("macd_fast", "MACD Fast Period (days)", 12.0),
    period("macd_slow", "MACD Slow Period (days)", 26.0),
    period("macd_signal", "MACD Signal Period (days)", 9.0),
];

const RSI_PARAMS: &[ParamSpec] = &[period("rsi_period", "RSI Period (days)", 14.0)];

/// Parameters required by `kind`, in display order.
pub fn param_specs(kind: StrategyKind) -> &'static [ParamSpec] {
    match kind {
        StrategyKind::MovingAverageCrossover => MA_CROSSOVER_PARAMS,
        StrategyKind::BollingerBands => BOLLINGER_PARAMS,
        StrategyKind::Macd => MACD_PARAMS,
        StrategyKind::Rsi => RSI_PARAMS,
        StrategyKind::None => &[],
    }
}

/// Raw parameter values keyed by name, as collected from user input.
///
/// Uses `BTreeMap` for deterministic key ordering (fingerprints, export).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParameters {
    values: BTreeMap<String, f64>,
}

impl StrategyParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every parameter of `kind` set to its default.
    pub fn defaults(kind: StrategyKind) -> Self {
        param_specs(kind)
            .iter()
            .map(|spec| (spec.key, spec.default))
            .collect()
    }

    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Fill every parameter of `kind` that is absent here with its default.
    pub fn or_defaults(mut self, kind: StrategyKind) -> Self {
        for spec in param_specs(kind) {
            self.values.entry(spec.key.to_string()).or_insert(spec.default);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for StrategyParameters {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A validated, typed strategy configuration. Constructed once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedStrategy {
    MovingAverageCrossover {
        sma_period: usize,
        ema_period: usize,
    },
    BollingerBands {
        period: usize,
        std_multiplier: f64,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Rsi {
        period: usize,
    },
    None,
}

impl ResolvedStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            ResolvedStrategy::MovingAverageCrossover { .. } => StrategyKind::MovingAverageCrossover,
            ResolvedStrategy::BollingerBands { .. } => StrategyKind::BollingerBands,
            ResolvedStrategy::Macd { .. } => StrategyKind::Macd,
            ResolvedStrategy::Rsi { .. } => StrategyKind::Rsi,
            ResolvedStrategy::None => StrategyKind::None,
        }
    }

    /// Longest lookback window; the price history must have at least this
    /// many bars. MACD's signal line is an EMA of the MACD line, so its
    /// window stacks on top of the slower price EMA.
    pub fn required_bars(&self) -> usize {
        match *self {
            ResolvedStrategy::MovingAverageCrossover {
                sma_period,
                ema_period,
            } => sma_period.max(ema_period),
            ResolvedStrategy::BollingerBands { period, .. } => period,
            ResolvedStrategy::Macd { fast, slow, signal } => fast.max(slow) + signal - 1,
            ResolvedStrategy::Rsi { period } => period,
            ResolvedStrategy::None => 0,
        }
    }

    /// Canonical parameter map: only the keys the strategy declares.
    pub fn parameters(&self) -> StrategyParameters {
        match *self {
            ResolvedStrategy::MovingAverageCrossover {
                sma_period,
                ema_period,
            } => StrategyParameters::new()
                .with("sma_period", sma_period as f64)
                .with("ema_period", ema_period as f64),
            ResolvedStrategy::BollingerBands {
                period,
                std_multiplier,
            } => StrategyParameters::new()
                .with("bb_period", period as f64)
                .with("bb_std", std_multiplier),
            ResolvedStrategy::Macd { fast, slow, signal } => StrategyParameters::new()
                .with("macd_fast", fast as f64)
                .with("macd_slow", slow as f64)
                .with("macd_signal", signal as f64),
            ResolvedStrategy::Rsi { period } => {
                StrategyParameters::new().with("rsi_period", period as f64)
            }
            ResolvedStrategy::None => StrategyParameters::new(),
        }
    }
}

/// Check `params` against the schema of `kind` and build the typed config.
///
/// Absent, non-finite and below-minimum values are all reported together as
/// `MissingParameters`. Unknown keys are ignored.
pub fn validate(
    kind: StrategyKind,
    params: &StrategyParameters,
) -> Result<ResolvedStrategy, EngineError> {
    let specs = param_specs(kind);

    let missing: Vec<String> = specs
        .iter()
        .filter(|spec| {
            !params
                .get(spec.key)
                .is_some_and(|v| v.is_finite() && v >= spec.min)
        })
        .map(|spec| spec.key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::MissingParameters {
            strategy: kind,
            params: missing,
        });
    }

    let value = |key: &str| params.get(key).unwrap_or_default();
    let whole = |key: &'static str| -> Result<usize, EngineError> {
        let v = value(key);
        if v.fract() != 0.0 {
            return Err(EngineError::InvalidParameter {
                name: key.to_string(),
                value: v,
                reason: "period must be a whole number of bars",
            });
        }
        Ok(v as usize)
    };

    let resolved = match kind {
        StrategyKind::MovingAverageCrossover => ResolvedStrategy::MovingAverageCrossover {
            sma_period: whole("sma_period")?,
            ema_period: whole("ema_period")?,
        },
        StrategyKind::BollingerBands => ResolvedStrategy::BollingerBands {
            period: whole("bb_period")?,
            std_multiplier: value("bb_std"),
        },
        StrategyKind::Macd => ResolvedStrategy::Macd {
            fast: whole("macd_fast")?,
            slow: whole("macd_slow")?,
            signal: whole("macd_signal")?,
        },
        StrategyKind::Rsi => ResolvedStrategy::Rsi {
            period: whole("rsi_period")?,
        },
        StrategyKind::None => ResolvedStrategy::None,
    };
    Ok(resolved)
}
