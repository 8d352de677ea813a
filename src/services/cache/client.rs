//! Key/value backend behind the identity cache.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Backend faults. Mapped to `AuthError::CacheUnavailable` one layer up, so a
/// broken cache always denies.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// String values with backend-owned expiry.
///
/// A key past its TTL must read as `None`; callers never compare timestamps
/// themselves. Implementations are cloned freely, so keep them `Arc`-backed.
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Overwrites any previous value and restarts its TTL.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Number of keys removed (0 or 1).
    async fn del(&self, key: &str) -> CacheResult<u64>;
}

/// Whole seconds for `EX`; sub-second TTLs round up to 1.
pub(crate) fn clamp_ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
