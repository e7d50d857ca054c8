use anyhow::Context as _;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors returned by the rating and prediction engine.
///
/// All variants are recoverable: callers fall back to a "no rating" /
/// "no prediction" state for the affected division.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Empty or insufficient corpus, or an unknown division/match/team
    #[error("missing data: {0}")]
    MissingData(String),

    /// Least-squares solve did not produce a finite result
    #[error("rating computation failed: {0}")]
    RatingComputationFailed(String),

    /// Prediction weight outside [0, 1]
    #[error("invalid {name}: {value} (expected a value in [0, 1])")]
    InvalidWeight { name: &'static str, value: f64 },
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to cache errors
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: std::result::Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}
