//! Engine error taxonomy.
//!
//! Every failure the engine can hit is surfaced as an `EngineError` value.
//! Nothing in the pipeline indexes past the end of a short series or panics
//! on user-supplied input.

use thiserror::Error;

use crate::strategy::StrategyKind;

/// Errors produced by the backtesting engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("price series has no bars")]
    EmptyInput,

    #[error("not enough data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("{strategy}: missing or below-minimum parameters: {}", params.join(", "))]
    MissingParameters {
        strategy: StrategyKind,
        params: Vec<String>,
    },

    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid strategy: '{0}'")]
    InvalidStrategy(String),

    #[error("metric '{0}' is undefined (zero denominator)")]
    DegenerateMetric(&'static str),

    #[error("bar {index} is not strictly after the previous bar")]
    UnorderedBars { index: usize },

    #[error("bar {index} has an invalid close price: {value}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("indicator column '{0}' was not computed")]
    MissingColumn(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_lists_names() {
        let err = EngineError::MissingParameters {
            strategy: StrategyKind::BollingerBands,
            params: vec!["bb_std".into()],
        };
        assert_eq!(
            err.to_string(),
            "Bollinger Bands: missing or below-minimum parameters: bb_std"
        );
    }

    #[test]
    fn insufficient_data_message() {
        let err = EngineError::InsufficientData {
            required: 50,
            available: 10,
        };
        assert!(err.to_string().contains("50 bars required"));
    }
}
