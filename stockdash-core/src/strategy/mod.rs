//! Strategy selection and parameter configuration.

pub mod config;
pub mod kind;

pub use config::{param_specs, validate, ParamSpec, ResolvedStrategy, StrategyParameters};
pub use kind::StrategyKind;
