use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Keyed-store operation error.
///
/// Store failures are propagated untouched and never retried here; the caller
/// decides whether to fail closed or try again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Keyed string store with per-entry TTL.
///
/// The refresh-token side of the session core stores one value per user
/// through this seam. Implementations must guarantee per-key atomicity of the
/// individual operations; no cross-key coordination is ever required.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Look up a value; expired or never-written keys read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value with a TTL, unconditionally replacing any prior value.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remove a key; removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).put(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }
}
