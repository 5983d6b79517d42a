//! Review API contract.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::cursor::TimeCursor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout and other transport failures.
    #[error("API проверки недоступен: {0}")]
    Network(String),

    #[error("API проверки вернул HTTP {code}")]
    ApiStatus { code: u16 },

    #[error("API проверки вернул некорректный JSON: {0}")]
    MalformedPayload(String),
}

/// Source of review statuses.
///
/// One call is one HTTP round trip; implementations must not retry.
/// Timeouts are whatever the underlying transport enforces.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Fetch review items updated at or after `from`, decoded but not yet
    /// validated.
    async fn fetch(&self, from: TimeCursor) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: ReviewApi + ?Sized> ReviewApi for std::sync::Arc<T> {
    async fn fetch(&self, from: TimeCursor) -> Result<Value, FetchError> {
        (**self).fetch(from).await
    }
}
