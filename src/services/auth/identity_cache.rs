use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use crate::services::cache::{CacheClient, CacheError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Token → serialised identity, with backend-enforced TTL.
///
/// Any backend failure is returned as `Err`; callers must treat it as a denial.
pub trait IdentityCache: Send + Sync {
    fn put<'a>(
        &'a self,
        token: &'a str,
        identity_json: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>>;

    fn get<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<String>, CacheError>>;

    // Returns true when an entry was removed.
    fn evict<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<bool, CacheError>>;
}

/// Identity cache over any [`CacheClient`], namespacing keys as `<prefix>:<token>`.
#[derive(Clone)]
pub struct KeyedIdentityCache<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions with other users of the same backend
    prefix: String,
}

impl<C: CacheClient> KeyedIdentityCache<C> {
    pub fn new(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, token)
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }
}

impl<C: CacheClient> IdentityCache for KeyedIdentityCache<C> {
    fn put<'a>(
        &'a self,
        token: &'a str,
        identity_json: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            let key = self.key(token);
            self.cache.set_with_ttl(&key, identity_json, ttl).await
        })
    }

    fn get<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<String>, CacheError>> {
        Box::pin(async move {
            let key = self.key(token);
            self.cache.get_string(&key).await
        })
    }

    fn evict<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<bool, CacheError>> {
        Box::pin(async move {
            let key = self.key(token);
            Ok(self.cache.del(&key).await? > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryCache;

    #[tokio::test]
    async fn keys_are_prefixed_in_the_backend() {
        let backend = Arc::new(MemoryCache::new());
        let cache = KeyedIdentityCache::new(backend.clone(), "identity");

        cache
            .put("tok", r#"{"sub":"1"}"#, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            backend.get_string("identity:tok").await.unwrap().as_deref(),
            Some(r#"{"sub":"1"}"#)
        );
        assert_eq!(
            cache.get("tok").await.unwrap().as_deref(),
            Some(r#"{"sub":"1"}"#)
        );
        assert_eq!(backend.get_string("tok").await.unwrap(), None);
    }

    #[tokio::test]
    async fn evict_removes_entry() {
        let cache = KeyedIdentityCache::new(Arc::new(MemoryCache::new()), "identity");
        cache.put("tok", "{}", Duration::from_secs(60)).await.unwrap();

        assert!(cache.evict("tok").await.unwrap());
        assert!(!cache.evict("tok").await.unwrap());
        assert_eq!(cache.get("tok").await.unwrap(), None);
    }
}
