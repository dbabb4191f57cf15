//! Strategy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The strategies the engine knows how to backtest.
///
/// `None` is a valid selection: the engine runs with a flat signal so the
/// caller still gets the benchmark curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "ma_crossover")]
    MovingAverageCrossover,
    #[serde(rename = "bollinger_bands")]
    BollingerBands,
    #[serde(rename = "macd")]
    Macd,
    #[serde(rename = "rsi")]
    Rsi,
    #[serde(rename = "none")]
    None,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::MovingAverageCrossover,
        StrategyKind::BollingerBands,
        StrategyKind::Macd,
        StrategyKind::Rsi,
        StrategyKind::None,
    ];

    /// Human-readable name, as shown in the dashboard's strategy selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCrossover => "Moving Average Crossover",
            StrategyKind::BollingerBands => "Bollinger Bands",
            StrategyKind::Macd => "MACD",
            StrategyKind::Rsi => "RSI",
            StrategyKind::None => "None",
        }
    }

    /// Short machine key, also the serde representation.
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCrossover => "ma_crossover",
            StrategyKind::BollingerBands => "bollinger_bands",
            StrategyKind::Macd => "macd",
            StrategyKind::Rsi => "rsi",
            StrategyKind::None => "none",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StrategyKind {
    type Err = EngineError;

    /// Accepts display names and keys, case-insensitively. The empty string
    /// selects `None`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Ok(StrategyKind::None);
        }
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.key() == needle || k.display_name().to_ascii_lowercase() == needle)
            .ok_or_else(|| EngineError::InvalidStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_names() {
        assert_eq!(
            "Moving Average Crossover".parse::<StrategyKind>().unwrap(),
            StrategyKind::MovingAverageCrossover
        );
        assert_eq!(
            "Bollinger Bands".parse::<StrategyKind>().unwrap(),
            StrategyKind::BollingerBands
        );
        assert_eq!("MACD".parse::<StrategyKind>().unwrap(), StrategyKind::Macd);
        assert_eq!("RSI".parse::<StrategyKind>().unwrap(), StrategyKind::Rsi);
    }

    #[test]
    fn parses_keys_case_insensitively() {
        assert_eq!(
            "MA_CROSSOVER".parse::<StrategyKind>().unwrap(),
            StrategyKind::MovingAverageCrossover
        );
        assert_eq!("rsi".parse::<StrategyKind>().unwrap(), StrategyKind::Rsi);
    }

    #[test]
    fn empty_and_none_select_none() {
        assert_eq!("".parse::<StrategyKind>().unwrap(), StrategyKind::None);
        assert_eq!("none".parse::<StrategyKind>().unwrap(), StrategyKind::None);
    }

    #[test]
    fn unknown_name_is_invalid_strategy() {
        assert_eq!(
            "Ichimoku".parse::<StrategyKind>(),
            Err(EngineError::InvalidStrategy("Ichimoku".into()))
        );
    }

    #[test]
    fn serde_uses_keys() {
        let json = serde_json::to_string(&StrategyKind::BollingerBands).unwrap();
        assert_eq!(json, "\"bollinger_bands\"");
        let back: StrategyKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StrategyKind::BollingerBands);
    }
}
