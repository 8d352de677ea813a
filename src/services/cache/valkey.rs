use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult, clamp_ttl_secs};

/// Identity cache backend on Valkey (Redis protocol).
///
/// `ConnectionManager` reconnects on its own; a clone per command is cheap.
#[derive(Clone)]
pub struct ValkeyClient {
    manager: ConnectionManager,
}

impl std::fmt::Debug for ValkeyClient {
    // URL may embed a password
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyClient").finish_non_exhaustive()
    }
}

impl ValkeyClient {
    /// Connects eagerly so a bad `VALKEY_URL` fails startup.
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let manager = redis::Client::open(url)
            .map_err(connection_error)?
            .get_connection_manager()
            .await
            .map_err(connection_error)?;

        Ok(Self { manager })
    }

    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> CacheResult<T> {
        let mut conn = self.manager.clone();
        cmd.query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))
    }
}

fn connection_error(e: redis::RedisError) -> CacheError {
    CacheError::BackendConnection(e.to_string())
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        self.query(redis::cmd("GET").arg(key)).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let reply: Option<String> = self
            .query(
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(clamp_ttl_secs(ttl)),
            )
            .await?;

        match reply.as_deref() {
            Some("OK") => Ok(()),
            other => Err(CacheError::InvalidValue(format!(
                "unexpected SET reply: {other:?}"
            ))),
        }
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        self.query(redis::cmd("DEL").arg(key)).await
    }
}
