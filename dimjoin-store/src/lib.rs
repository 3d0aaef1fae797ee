//! Remote key-value store access for dimjoin.
//!
//! - [`ItemStore`]: the outbound point-lookup interface (one item by key)
//! - [`DynamoDbStore`]: Amazon DynamoDB backend
//! - [`MemoryStore`]: in-process backend for local runs and tests
//! - [`RetryingStore`]: bounded retry with linear backoff around any store
//!
//! Retries are owned by [`RetryingStore`]; the DynamoDB client is built with
//! SDK-level retries disabled so attempts are never multiplied.

pub mod dynamodb;
mod error;
pub mod memory;
mod retry;
mod store;

pub use dynamodb::{DynamoDbConfig, DynamoDbStore};
pub use error::{FetchError, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use retry::{RetryPolicy, RetryingStore};
pub use store::{item_key, ItemKey, ItemStore};
