mod common;

use common::{product_config, product_fields};
use dimjoin_lookup::config::options;
use dimjoin_lookup::{ConfigError, LookupConfig, LookupFunction};
use dimjoin_types::{FieldType, SchemaError};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

fn opts(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn key_fields() -> Vec<String> {
    vec!["product_id".to_string()]
}

// ── Defaults ────────────────────────────────────────────────────

#[test]
fn new_uses_defaults() {
    let config = product_config();
    assert_eq!(config.cache_max_rows, 10_000);
    assert_eq!(config.cache_ttl_ms, 300_000);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_backoff_ms, 1_000);
    assert_eq!(config.endpoint, None);
    assert_eq!(config.request_timeout_ms, None);
}

#[test]
fn derived_settings() {
    let mut config = product_config();
    assert_eq!(config.cache_config().ttl, Some(Duration::from_secs(300)));
    assert_eq!(config.retry_policy().max_retries, 3);

    config.cache_ttl_ms = 0;
    assert_eq!(config.cache_config().ttl, None);

    config.endpoint = Some("http://localhost:8000".to_string());
    let ddb = config.dynamodb_config();
    assert_eq!(ddb.region, "ap-southeast-1");
    assert_eq!(ddb.endpoint.as_deref(), Some("http://localhost:8000"));
}

// ── Validation ──────────────────────────────────────────────────

#[test]
fn validate_resolves_schema() {
    let schema = product_config().validate().unwrap();
    assert_eq!(schema.key_indices(), &[0]);
}

#[test]
fn missing_table_name_fails() {
    let mut config = product_config();
    config.table_name = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingOption("table-name")));
    assert_eq!(err.to_string(), "missing required option 'table-name'");
}

#[test]
fn missing_region_fails() {
    let mut config = product_config();
    config.region = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingOption("aws.region"))
    ));
}

#[test]
fn key_not_in_schema_fails_at_construction() {
    let mut config = product_config();
    config.key_fields = vec!["sku".to_string()];
    let err = LookupFunction::new(config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Schema(SchemaError::UnknownKeyField(ref k)) if k == "sku"
    ));
}

#[test]
fn zero_request_timeout_is_invalid() {
    let mut config = product_config();
    config.request_timeout_ms = Some(0);
    assert!(matches!(config.validate(), Err(ConfigError::InvalidOption { .. })));
}

// ── Connector options ───────────────────────────────────────────

#[test]
fn from_options_minimal() {
    let config = LookupConfig::from_options(
        &opts(&[
            (options::TABLE_NAME, "products"),
            (options::AWS_REGION, "ap-southeast-1"),
        ]),
        product_fields(),
        key_fields(),
    )
    .unwrap();
    assert_eq!(config, product_config());
}

#[test]
fn from_options_all() {
    let config = LookupConfig::from_options(
        &opts(&[
            (options::CONNECTOR, "dynamodb-lookup"),
            (options::TABLE_NAME, "products"),
            (options::AWS_REGION, "us-west-2"),
            (options::AWS_ENDPOINT, "http://localhost:8000"),
            (options::LOOKUP_CACHE_MAX_ROWS, "500"),
            (options::LOOKUP_CACHE_TTL, "60000"),
            (options::LOOKUP_MAX_RETRIES, " 5 "),
            (options::LOOKUP_RETRY_BACKOFF, "250"),
            (options::LOOKUP_REQUEST_TIMEOUT, "2000"),
        ]),
        product_fields(),
        key_fields(),
    )
    .unwrap();

    assert_eq!(config.region, "us-west-2");
    assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8000"));
    assert_eq!(config.cache_max_rows, 500);
    assert_eq!(config.cache_ttl_ms, 60_000);
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_backoff_ms, 250);
    assert_eq!(config.request_timeout_ms, Some(2_000));
}

#[test]
fn from_options_missing_required() {
    let err = LookupConfig::from_options(
        &opts(&[(options::TABLE_NAME, "products")]),
        product_fields(),
        key_fields(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingOption("aws.region")));
}

#[test]
fn from_options_rejects_unknown_key() {
    let err = LookupConfig::from_options(
        &opts(&[
            (options::TABLE_NAME, "products"),
            (options::AWS_REGION, "ap-southeast-1"),
            ("lookup.cache.max-row", "10"),
        ]),
        product_fields(),
        key_fields(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownOption(ref k) if k == "lookup.cache.max-row"));
}

#[test]
fn from_options_rejects_bad_number() {
    let err = LookupConfig::from_options(
        &opts(&[
            (options::TABLE_NAME, "products"),
            (options::AWS_REGION, "ap-southeast-1"),
            (options::LOOKUP_MAX_RETRIES, "-1"),
        ]),
        product_fields(),
        key_fields(),
    )
    .unwrap_err();
    match err {
        ConfigError::InvalidOption { key, reason } => {
            assert_eq!(key, "lookup.max-retries");
            assert!(reason.contains("-1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn from_options_rejects_other_connector() {
    let err = LookupConfig::from_options(
        &opts(&[
            (options::CONNECTOR, "jdbc"),
            (options::TABLE_NAME, "products"),
            (options::AWS_REGION, "ap-southeast-1"),
        ]),
        product_fields(),
        key_fields(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOption { ref key, .. } if key == "connector"));
}

// ── TOML ────────────────────────────────────────────────────────

const PRODUCTS_TOML: &str = r#"
table_name = "products"
region = "ap-southeast-1"
key_fields = ["product_id"]
cache_max_rows = 100
max_retries = 1

[[fields]]
name = "product_id"
type = "STRING"

[[fields]]
name = "price"
type = "DOUBLE"
"#;

#[test]
fn from_toml_str_applies_defaults() {
    let config = LookupConfig::from_toml_str(PRODUCTS_TOML).unwrap();
    assert_eq!(config.table_name, "products");
    assert_eq!(config.cache_max_rows, 100);
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.cache_ttl_ms, 300_000);
    assert_eq!(config.fields.len(), 2);
    assert_eq!(config.fields[1].ty, FieldType::Double);
    config.validate().unwrap();
}

#[test]
fn from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PRODUCTS_TOML.as_bytes()).unwrap();
    let config = LookupConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config.region, "ap-southeast-1");
}

#[test]
fn from_toml_missing_table_fails_validation() {
    let config = LookupConfig::from_toml_str("region = \"ap-southeast-1\"").unwrap();
    assert!(matches!(
        LookupFunction::new(config),
        Err(ConfigError::MissingOption("table-name"))
    ));
}

#[test]
fn from_toml_bad_type_is_parse_error() {
    let err = LookupConfig::from_toml_str("max_retries = \"three\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn from_toml_rejects_misspelled_keys() {
    for line in ["cache_max_row = 5", "max-retries = 0"] {
        let doc = format!("table_name = \"products\"\nregion = \"ap-southeast-1\"\n{line}\n");
        let err = LookupConfig::from_toml_str(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{line}: {err:?}");
        assert!(err.to_string().contains("unknown field"), "{line}: {err}");
    }
}

#[test]
fn from_toml_rejects_unknown_field_spec_keys() {
    let doc = format!("{PRODUCTS_TOML}\n[[fields]]\nname = \"stock\"\ntype = \"DOUBLE\"\nnullable = true\n");
    assert!(matches!(
        LookupConfig::from_toml_str(&doc),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn from_toml_file_missing_is_io_error() {
    let err = LookupConfig::from_toml_file("/nonexistent/dimjoin.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
