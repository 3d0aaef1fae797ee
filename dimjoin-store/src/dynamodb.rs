//! Amazon DynamoDB item store.
//!
//! Uses the AWS SDK `GetItem`/`PutItem` operations. Credentials come from the
//! SDK default provider chain.

use crate::error::{StoreError, StoreResult};
use crate::store::ItemStore;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::AttributeValue as SdkValue;
use dimjoin_types::{AttributeValue, Item, KeyValue};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Error codes DynamoDB uses for throughput rejections.
const THROTTLING_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
];

/// Error codes for requests DynamoDB will refuse no matter how often they are
/// repeated.
const REJECTED_CODES: &[&str] = &[
    "ValidationException",
    "ResourceNotFoundException",
    "AccessDeniedException",
    "UnrecognizedClientException",
];

/// Connection settings for [`DynamoDbStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbConfig {
    /// AWS region, e.g. `ap-southeast-1`.
    pub region: String,
    /// Optional endpoint override (e.g. DynamoDB Local, LocalStack).
    pub endpoint: Option<String>,
    /// Per-operation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// DynamoDB-backed [`ItemStore`].
#[derive(Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl std::fmt::Debug for DynamoDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbStore")
            .field("region", &self.client.config().region())
            .finish()
    }
}

impl DynamoDbStore {
    /// Builds a client from the SDK defaults plus `config` overrides.
    ///
    /// SDK retries are disabled; callers wrap the store in a
    /// [`RetryingStore`](crate::RetryingStore).
    pub async fn connect(config: &DynamoDbConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config)
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        info!(
            "DynamoDB client created for region {} (endpoint: {})",
            config.region,
            config.endpoint.as_deref().unwrap_or("default")
        );

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wraps a pre-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    fn provider_name(&self) -> &'static str {
        "DynamoDB"
    }

    async fn get_item(&self, table: &str, key: &[(String, KeyValue)]) -> StoreResult<Option<Item>> {
        let mut request = self.client.get_item().table_name(table);
        for (name, value) in key {
            request = request.key(name, key_to_sdk(value));
        }

        let output = request
            .send()
            .await
            .map_err(|e| store_error("GetItem", e))?;

        debug!("DynamoDB GetItem on {} found item: {}", table, output.item().is_some());
        Ok(output.item().map(|item| {
            item.iter()
                .map(|(name, value)| (name.clone(), from_sdk(value)))
                .collect()
        }))
    }

    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        let sdk_item: HashMap<String, SdkValue> = item
            .into_iter()
            .map(|(name, value)| (name, to_sdk(value)))
            .collect();

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(sdk_item))
            .send()
            .await
            .map_err(|e| store_error("PutItem", e))?;
        Ok(())
    }
}

/// Converts an SDK attribute. Types the lookup path does not model are kept
/// as their debug text.
pub fn from_sdk(value: &SdkValue) -> AttributeValue {
    match value {
        SdkValue::S(s) => AttributeValue::String(s.clone()),
        SdkValue::N(n) => AttributeValue::Number(n.clone()),
        SdkValue::Bool(b) => AttributeValue::Boolean(*b),
        other => AttributeValue::Other(format!("{other:?}")),
    }
}

/// Converts an attribute for writing. `Other` is written as a string.
pub fn to_sdk(value: AttributeValue) -> SdkValue {
    match value {
        AttributeValue::String(s) | AttributeValue::Other(s) => SdkValue::S(s),
        AttributeValue::Number(n) => SdkValue::N(n),
        AttributeValue::Boolean(b) => SdkValue::Bool(b),
    }
}

fn key_to_sdk(value: &KeyValue) -> SdkValue {
    match value {
        KeyValue::String(s) => SdkValue::S(s.clone()),
        KeyValue::Number(n) => SdkValue::N(n.clone()),
    }
}

fn store_error<E, R>(operation: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = format!("DynamoDB {operation} failed: {}", DisplayErrorContext(&err));
    if matches!(err, SdkError::TimeoutError(_)) {
        return StoreError::Timeout(message);
    }

    let code = err.as_service_error().and_then(|e| e.code());
    match code {
        Some(c) if THROTTLING_CODES.contains(&c) => StoreError::Throttled(message),
        Some(c) if REJECTED_CODES.contains(&c) => StoreError::Rejected(message),
        _ => StoreError::Request(message),
    }
}
