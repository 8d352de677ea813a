use chrono::Utc;
use std::{future::Future, pin::Pin, sync::Arc};
use tracing::{debug, error};

use crate::repos::identity_repo::IdentityRepo;
use crate::services::auth::{
    credentials::Credentials,
    error::AuthError,
    identity::{GrantRow, Identity, subject_hash},
    identity_cache::IdentityCache,
};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type LookupOutput = Result<Vec<GrantRow>, AuthError>;

/// Minimal lookup interface over the identity store.
///
/// Implementations return the (app, key) rows granted to the credentials,
/// or `StoreUnavailable` on any I/O failure.
pub trait IdentityLookup: Send + Sync {
    fn grant_rows<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, LookupOutput>;
}

impl IdentityLookup for IdentityRepo {
    fn grant_rows<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, LookupOutput> {
        Box::pin(async move {
            let rows = self
                .login_rows(&credentials.userid, &credentials.password)
                .await
                .map_err(|e| {
                    error!(error = %e, "identity store query failed");
                    AuthError::StoreUnavailable(e.to_string())
                })?;

            Ok(rows
                .into_iter()
                .map(|r| GrantRow::new(r.app, r.role))
                .collect())
        })
    }
}

/// Resolves identities from a fresh login or from the identity cache.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn IdentityLookup>,
    cache: Arc<dyn IdentityCache>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityLookup>, cache: Arc<dyn IdentityCache>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &dyn IdentityCache {
        self.cache.as_ref()
    }

    /// Query the identity store and assemble a fresh identity.
    pub async fn resolve_by_login(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let rows = self.store.grant_rows(credentials).await?;
        let subject = subject_hash(&credentials.userid);

        let identity = Identity::from_rows(subject, &rows, Utc::now().timestamp())
            .ok_or(AuthError::IdentityNotFound)?;

        debug!(
            sub = %identity.subject,
            apps = identity.grants.len(),
            "resolved identity from store"
        );

        Ok(identity)
    }

    /// Look up the identity cached under `token`.
    pub async fn resolve_by_token(&self, token: &str) -> Result<Identity, AuthError> {
        let raw = self
            .cache
            .get(token)
            .await
            .map_err(|e| {
                error!(error = %e, "identity cache read failed");
                AuthError::CacheUnavailable(e.to_string())
            })?
            .ok_or(AuthError::CacheMiss)?;

        // An entry we cannot read back is as good as absent.
        Identity::from_json(&raw).map_err(|e| {
            error!(error = %e, "cached identity is not valid JSON");
            AuthError::CacheMiss
        })
    }
}
