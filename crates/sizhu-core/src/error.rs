use thiserror::Error;

use crate::config::ConfigError;

/// Hard failures surfaced to callers.
///
/// Unknown symbols in table lookups never end up here; they resolve to
/// neutral values at the lookup site.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Invalid calendar input: {0}")]
    InvalidCalendarInput(String),
    #[error("Malformed stem-branch string: {0}")]
    MalformedGanZhiString(String),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
