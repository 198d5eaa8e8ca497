use polars::error::PolarsError;
use resilience::error::ResilienceError;

#[derive(thiserror::Error, Debug)]
pub enum ResilienceCliError {
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("serde JSON error: {0}")]
    SerdeJSONError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{0}")]
    ResilienceError(#[from] ResilienceError),
    #[error("std IO error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type ResilienceCliResult<T> = Result<T, ResilienceCliError>;
