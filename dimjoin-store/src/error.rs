//! Store error types.

use thiserror::Error;

/// Result type for a single store call.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one store call.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Transport or server-side failure.
    #[error("store request failed: {0}")]
    Request(String),

    /// The store rejected the call for exceeding its throughput.
    #[error("store throttled the request: {0}")]
    Throttled(String),

    #[error("store request timed out: {0}")]
    Timeout(String),

    /// The request itself is malformed; repeating it cannot succeed.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// The store refused the request (bad key type, missing table, denied
    /// access). Repeating it cannot succeed.
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Returns true if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StoreError::InvalidItem(_) | StoreError::Rejected(_))
    }
}

/// Failure of a retried fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Every attempt failed, or the last failure was not retryable.
    #[error("lookup failed after {attempts} attempt(s): {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// Backoff was interrupted by cancellation.
    #[error("lookup cancelled during backoff")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
