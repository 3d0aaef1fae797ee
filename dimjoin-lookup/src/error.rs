//! Error types for configuration and lookups.

use dimjoin_store::FetchError;
use dimjoin_types::SchemaError;
use thiserror::Error;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid or missing settings. Always raised before any lookup runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("invalid value for option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("unsupported option '{0}'")]
    UnknownOption(String),

    #[error("invalid table schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Why a lookup produced no row, for callers that want to know.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("malformed lookup key: {0}")]
    MalformedKey(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
