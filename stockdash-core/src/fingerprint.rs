//! Run fingerprinting — deterministic identification of a backtest run.
//!
//! A fingerprint covers the strategy, its canonical parameters and every
//! bar of the price history. Two runs with the same fingerprint produce
//! identical output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::strategy::{StrategyKind, StrategyParameters};

/// BLAKE3 hex digest identifying one (strategy, params, data) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunFingerprint(String);

impl RunFingerprint {
    pub fn compute(kind: StrategyKind, params: &StrategyParameters, bars: &[Bar]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.key().as_bytes());
        // Parameters iterate in sorted key order
        for (key, value) in params.iter() {
            hasher.update(key.as_bytes());
            hasher.update(&value.to_le_bytes());
        }
        hasher.update(&(bars.len() as u64).to_le_bytes());
        for bar in bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for logs and directory names.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for RunFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
