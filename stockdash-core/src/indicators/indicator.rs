//! Indicator trait and the per-run indicator frame.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! The frame is rebuilt from scratch on every engine run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Bar;
use crate::error::EngineError;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. Undefined (warmup) values are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Column name in the augmented frame (e.g., "SMA", "Upper_Band").
    fn name(&self) -> &str;

    /// Number of leading bars that are undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Named indicator columns aligned 1:1 with the input bars.
///
/// Column order is alphabetical so CSV export is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorFrame {
    columns: BTreeMap<String, Vec<f64>>,
}

impl IndicatorFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute `indicator` over `bars` and store it under its name.
    pub fn compute_into(&mut self, indicator: &dyn Indicator, bars: &[Bar]) {
        self.columns
            .insert(indicator.name().to_string(), indicator.compute(bars));
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    /// Value of a column at a bar index. NaN values are returned as-is.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.columns
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Full column, or `MissingColumn` if it was never computed.
    pub fn column(&self, name: &str) -> Result<&[f64], EngineError> {
        self.columns
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
