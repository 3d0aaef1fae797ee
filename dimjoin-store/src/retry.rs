//! Bounded retry around a single point lookup.

use crate::error::FetchError;
use crate::store::ItemStore;
use dimjoin_types::{Item, KeyValue};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Backoff unit: the wait before retry `n` (1-based) is `n * backoff`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(1_000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Delay before the retry following failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Fetches items from one table, retrying failed calls with linear backoff.
///
/// A "not found" answer is a success and is returned immediately. Backoff
/// waits are cooperative tokio sleeps and end early with
/// [`FetchError::Cancelled`] once the store's shutdown token, or the token
/// passed to [`fetch_with`](Self::fetch_with), fires.
pub struct RetryingStore {
    inner: Arc<dyn ItemStore>,
    table: String,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl RetryingStore {
    pub fn new(inner: Arc<dyn ItemStore>, table: impl Into<String>, policy: RetryPolicy) -> Self {
        Self::with_cancellation(inner, table, policy, CancellationToken::new())
    }

    pub fn with_cancellation(
        inner: Arc<dyn ItemStore>,
        table: impl Into<String>,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner,
            table: table.into(),
            policy,
            cancel,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &Arc<dyn ItemStore> {
        &self.inner
    }

    /// Looks up one item, making at most `max_retries + 1` attempts.
    pub async fn fetch(&self, key: &[(String, KeyValue)]) -> Result<Option<Item>, FetchError> {
        self.fetch_until(key, None).await
    }

    /// Like [`fetch`](Self::fetch), with backoff also interrupted by
    /// `cancel`. Cancelling `cancel` affects this call only.
    pub async fn fetch_with(
        &self,
        key: &[(String, KeyValue)],
        cancel: &CancellationToken,
    ) -> Result<Option<Item>, FetchError> {
        self.fetch_until(key, Some(cancel)).await
    }

    async fn fetch_until(
        &self,
        key: &[(String, KeyValue)],
        call_cancel: Option<&CancellationToken>,
    ) -> Result<Option<Item>, FetchError> {
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let err = match self.inner.get_item(&self.table, key).await {
                Ok(item) => return Ok(item),
                Err(err) => err,
            };

            if attempt > max_retries || !err.is_retryable() {
                error!(
                    "Failed to query {} table {} after {} retries: {}",
                    self.inner.provider_name(),
                    self.table,
                    attempt - 1,
                    err
                );
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }

            warn!(
                "Error querying {} table {}, retrying ({}/{}): {}",
                self.inner.provider_name(),
                self.table,
                attempt,
                max_retries,
                err
            );

            let delay = self.policy.delay_after(attempt);
            let call_cancelled = async {
                match call_cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Backoff for table {} interrupted by shutdown", self.table);
                    return Err(FetchError::Cancelled);
                }
                _ = call_cancelled => {
                    warn!("Backoff for table {} interrupted by cancellation", self.table);
                    return Err(FetchError::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
