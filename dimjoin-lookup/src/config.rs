//! Lookup table configuration.
//!
//! A [`LookupConfig`] can be read from a TOML file or built from a flat map
//! of connector options such as a table DDL `WITH (...)` clause provides:
//!
//! | option | default |
//! |---|---|
//! | `connector` | must be `dynamodb-lookup` if present |
//! | `table-name` | required |
//! | `aws.region` | required |
//! | `aws.endpoint` | SDK default |
//! | `lookup.cache.max-rows` | 10000 (0 disables the cache) |
//! | `lookup.cache.ttl` | 300000 ms (0 disables expiry) |
//! | `lookup.max-retries` | 3 |
//! | `lookup.retry.backoff` | 1000 ms |
//! | `lookup.request-timeout` | none |

use crate::error::{ConfigError, ConfigResult};
use dimjoin_cache::CacheConfig;
use dimjoin_store::{DynamoDbConfig, RetryPolicy};
use dimjoin_types::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Connector option keys.
pub mod options {
    pub const CONNECTOR: &str = "connector";
    pub const TABLE_NAME: &str = "table-name";
    pub const AWS_REGION: &str = "aws.region";
    pub const AWS_ENDPOINT: &str = "aws.endpoint";
    pub const LOOKUP_CACHE_MAX_ROWS: &str = "lookup.cache.max-rows";
    pub const LOOKUP_CACHE_TTL: &str = "lookup.cache.ttl";
    pub const LOOKUP_MAX_RETRIES: &str = "lookup.max-retries";
    pub const LOOKUP_RETRY_BACKOFF: &str = "lookup.retry.backoff";
    pub const LOOKUP_REQUEST_TIMEOUT: &str = "lookup.request-timeout";

    /// Value of the `connector` option this crate answers to.
    pub const IDENTIFIER: &str = "dynamodb-lookup";

    pub const REQUIRED: &[&str] = &[TABLE_NAME, AWS_REGION];

    pub const OPTIONAL: &[&str] = &[
        CONNECTOR,
        AWS_ENDPOINT,
        LOOKUP_CACHE_MAX_ROWS,
        LOOKUP_CACHE_TTL,
        LOOKUP_MAX_RETRIES,
        LOOKUP_RETRY_BACKOFF,
        LOOKUP_REQUEST_TIMEOUT,
    ];
}

pub const DEFAULT_CACHE_MAX_ROWS: usize = 10_000;
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;

/// Settings for one lookup table. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupConfig {
    /// Remote table name.
    #[serde(default)]
    pub table_name: String,
    /// AWS region of the table.
    #[serde(default)]
    pub region: String,
    /// Endpoint override (DynamoDB Local, LocalStack).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Output fields, in row order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Fields forming the store's primary key.
    #[serde(default)]
    pub key_fields: Vec<String>,
    #[serde(default = "default_cache_max_rows")]
    pub cache_max_rows: usize,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

fn default_cache_max_rows() -> usize {
    DEFAULT_CACHE_MAX_ROWS
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

impl LookupConfig {
    /// Creates a config with default cache and retry settings.
    pub fn new(
        table_name: impl Into<String>,
        region: impl Into<String>,
        fields: Vec<FieldSpec>,
        key_fields: Vec<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            region: region.into(),
            endpoint: None,
            fields,
            key_fields,
            cache_max_rows: DEFAULT_CACHE_MAX_ROWS,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            request_timeout_ms: None,
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builds a config from connector options plus the declared table schema.
    ///
    /// Rejects unknown option keys and unparsable values. Required options
    /// are checked here as well as in [`validate`](Self::validate).
    pub fn from_options(
        opts: &HashMap<String, String>,
        fields: Vec<FieldSpec>,
        key_fields: Vec<String>,
    ) -> ConfigResult<Self> {
        let mut unknown: Vec<&String> = opts
            .keys()
            .filter(|k| {
                !options::REQUIRED.contains(&k.as_str()) && !options::OPTIONAL.contains(&k.as_str())
            })
            .collect();
        unknown.sort();
        if let Some(key) = unknown.first() {
            return Err(ConfigError::UnknownOption((*key).clone()));
        }

        if let Some(connector) = opts.get(options::CONNECTOR) {
            if connector != options::IDENTIFIER {
                return Err(ConfigError::InvalidOption {
                    key: options::CONNECTOR.to_string(),
                    reason: format!("expected '{}', got '{connector}'", options::IDENTIFIER),
                });
            }
        }

        let required = |key: &'static str| {
            opts.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(ConfigError::MissingOption(key))
        };

        let mut config = Self::new(
            required(options::TABLE_NAME)?,
            required(options::AWS_REGION)?,
            fields,
            key_fields,
        );

        config.endpoint = opts
            .get(options::AWS_ENDPOINT)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let Some(v) = parse_option(opts, options::LOOKUP_CACHE_MAX_ROWS)? {
            config.cache_max_rows = v;
        }
        if let Some(v) = parse_option(opts, options::LOOKUP_CACHE_TTL)? {
            config.cache_ttl_ms = v;
        }
        if let Some(v) = parse_option(opts, options::LOOKUP_MAX_RETRIES)? {
            config.max_retries = v;
        }
        if let Some(v) = parse_option(opts, options::LOOKUP_RETRY_BACKOFF)? {
            config.retry_backoff_ms = v;
        }
        config.request_timeout_ms = parse_option(opts, options::LOOKUP_REQUEST_TIMEOUT)?;

        Ok(config)
    }

    /// Checks required settings and resolves the output schema.
    pub fn validate(&self) -> ConfigResult<Schema> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::MissingOption(options::TABLE_NAME));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::MissingOption(options::AWS_REGION));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidOption {
                key: options::LOOKUP_REQUEST_TIMEOUT.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Schema::new(self.fields.clone(), self.key_fields.clone())?)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_size: self.cache_max_rows,
            ttl: (self.cache_ttl_ms > 0).then(|| Duration::from_millis(self.cache_ttl_ms)),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn dynamodb_config(&self) -> DynamoDbConfig {
        DynamoDbConfig {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            timeout_ms: self.request_timeout_ms,
        }
    }
}

fn parse_option<T>(opts: &HashMap<String, String>, key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    opts.get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidOption {
                key: key.to_string(),
                reason: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}
