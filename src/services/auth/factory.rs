/// Factory: build the `Authorizer` and its collaborators from application `Config`.
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::error::AppError;
use crate::repos::identity_repo::IdentityRepo;
use crate::services::auth::{
    Authorizer,
    identity_cache::{IdentityCache, KeyedIdentityCache},
    resolver::IdentityResolver,
    token::{MIN_SECRET_LEN, TokenService},
};
use crate::services::cache::{MemoryCache, ValkeyClient};

pub async fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(&config.database_url)
        .map_err(|e| {
            warn!(error = %e, "invalid DATABASE_URL");
            AppError::Internal
        })?;
    let store = Arc::new(IdentityRepo::new(pool, config.login_query.clone()));

    let cache: Arc<dyn IdentityCache> = match &config.valkey_url {
        Some(url) => {
            let client = ValkeyClient::new(url).await.map_err(|e| {
                warn!(error = %e, "failed to connect to valkey");
                AppError::Internal
            })?;
            Arc::new(KeyedIdentityCache::new(
                Arc::new(client),
                config.identity_cache_prefix.clone(),
            ))
        }
        None => {
            warn!("VALKEY_URL not set; identities are cached in-process only");
            Arc::new(KeyedIdentityCache::new(
                Arc::new(MemoryCache::new()),
                config.identity_cache_prefix.clone(),
            ))
        }
    };

    // Misconfiguration still denies every request; surface it early.
    if config.jwt_signing_key.len() < MIN_SECRET_LEN {
        warn!(
            min_bytes = MIN_SECRET_LEN,
            "JWT_SIGNING_KEY is shorter than the HS512 minimum; token issuance will fail"
        );
    }

    let tokens = TokenService::new(
        config.jwt_signing_key.as_bytes(),
        config.jwt_issuer.clone(),
        config.identity_ttl_seconds,
    );

    let resolver = IdentityResolver::new(store, cache);

    Ok(Arc::new(Authorizer::new(
        resolver,
        tokens,
        config.auth_header_names.clone(),
    )))
}
