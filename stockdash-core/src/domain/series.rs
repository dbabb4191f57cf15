//! PriceSeries — a validated, date-ordered sequence of bars.

use serde::{Deserialize, Serialize};

use super::Bar;
use crate::error::EngineError;

/// Immutable price history handed to the engine.
///
/// Construction enforces strictly increasing dates and finite, positive
/// closes. An empty series is representable; the pipeline rejects it with
/// `EngineError::EmptyInput`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, EngineError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(EngineError::InvalidPrice {
                    index: i,
                    value: bar.close,
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(EngineError::UnorderedBars { index: i });
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bars = Vec::<Bar>::deserialize(deserializer)?;
        PriceSeries::new(bars).map_err(serde::de::Error::custom)
    }
}
