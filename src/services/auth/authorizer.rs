//! Request-level orchestration.
//!
//! START → CREDENTIALS_RESOLVED → IDENTITY_RESOLVED → LOCKS_RESOLVED → EVALUATED → TOKEN_ISSUED,
//! with any failure short-circuiting to a uniform [`Denied`]. The real cause is
//! logged here, once, and never returned to the caller.
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::services::auth::{
    credentials::{Credentials, HeaderLookup, extract_bearer, extract_credentials},
    error::{AuthError, Denied},
    grants::evaluate,
    identity::Identity,
    locks::{AccessPolicy, resolve_locks},
    payload::protected_resource,
    resolver::IdentityResolver,
    token::{TokenClaims, TokenService},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Start,
    CredentialsResolved,
    IdentityResolved,
    LocksResolved,
    Evaluated,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CredentialsResolved => "credentials_resolved",
            Self::IdentityResolved => "identity_resolved",
            Self::LocksResolved => "locks_resolved",
            Self::Evaluated => "evaluated",
        }
    }
}

/// What an authorization check established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authorized {
    pub app: String,
    pub resource: String,
}

#[derive(Debug)]
enum Presented {
    Token(String),
    Credentials(Credentials),
}

/// The authorization engine. Cheap to clone; holds no per-request state.
#[derive(Clone, Debug)]
pub struct Authorizer {
    resolver: IdentityResolver,
    tokens: TokenService,
    header_names: Vec<String>,
}

impl Authorizer {
    pub fn new(resolver: IdentityResolver, tokens: TokenService, header_names: Vec<String>) -> Self {
        Self {
            resolver,
            tokens,
            header_names,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Bearer token from the configured headers, if any.
    pub fn bearer_token<H>(&self, headers: &H) -> Option<String>
    where
        H: HeaderLookup + ?Sized,
    {
        extract_bearer(headers, self.header_names.as_slice())
    }

    /// Full flow: resolve the caller, check the locks against the payload's
    /// resource, and return the token that replaces the payload.
    ///
    /// A presented bearer token takes precedence over Basic credentials. When it
    /// resolves nothing from the cache the request is denied; there is no
    /// fallback to a fresh login.
    pub async fn engage<H, S>(&self, headers: &H, args: &[S], payload: &str) -> Result<String, Denied>
    where
        H: HeaderLookup + Sync + ?Sized,
        S: AsRef<str> + Sync,
    {
        let mut stage = Stage::Start;
        let result = self.run_engage(headers, args, payload, &mut stage).await;
        result.map_err(|e| deny(stage, e))
    }

    async fn run_engage<H, S>(
        &self,
        headers: &H,
        args: &[S],
        payload: &str,
        stage: &mut Stage,
    ) -> Result<String, AuthError>
    where
        H: HeaderLookup + Sync + ?Sized,
        S: AsRef<str> + Sync,
    {
        let presented = self.presented(headers)?;
        *stage = Stage::CredentialsResolved;

        let (identity, existing_token) = match presented {
            Presented::Token(token) => {
                let (_, identity) = self.identity_for_token(&token).await?;
                (identity, Some(token))
            }
            Presented::Credentials(credentials) => {
                (self.resolver.resolve_by_login(&credentials).await?, None)
            }
        };
        *stage = Stage::IdentityResolved;

        let authorized = check(&identity, args, payload, stage)?;

        let token = match existing_token {
            Some(token) => token,
            None => self.issue_and_cache(&identity).await?,
        };

        info!(
            sub = %identity.subject,
            app = %authorized.app,
            resource = %authorized.resource,
            "authorized"
        );

        Ok(token)
    }

    /// Lock and grant evaluation for an already resolved identity.
    pub fn authorize<S: AsRef<str>>(
        &self,
        identity: &Identity,
        args: &[S],
        payload: &str,
    ) -> Result<Authorized, Denied> {
        let mut stage = Stage::IdentityResolved;
        check(identity, args, payload, &mut stage).map_err(|e| deny(stage, e))
    }

    /// Login only: Basic credentials → identity → token, with the identity cached
    /// under the token for the configured TTL.
    pub async fn obtain_token<H>(&self, headers: &H) -> Result<String, Denied>
    where
        H: HeaderLookup + Sync + ?Sized,
    {
        let mut stage = Stage::Start;
        let result = async {
            let credentials = extract_credentials(headers, self.header_names.as_slice())
                .ok_or(AuthError::CredentialParseFailure)?;
            stage = Stage::CredentialsResolved;

            let identity = self.resolver.resolve_by_login(&credentials).await?;
            stage = Stage::IdentityResolved;

            self.issue_and_cache(&identity).await
        }
        .await;

        result.map_err(|e| deny(stage, e))
    }

    /// Signature, issuer and expiry check. No cache interaction.
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, Denied> {
        self.tokens
            .validate(token)
            .map_err(|e| deny(Stage::CredentialsResolved, e))
    }

    /// Validation plus a live cache entry: a revoked or expired identity fails
    /// even while the signature is still good.
    pub async fn check_token(&self, token: &str) -> Result<TokenClaims, Denied> {
        self.identity_for_token(token)
            .await
            .map(|(claims, _)| claims)
            .map_err(|e| deny(Stage::CredentialsResolved, e))
    }

    /// The identity a presented token stands for.
    pub async fn identity<H>(&self, headers: &H) -> Result<Identity, Denied>
    where
        H: HeaderLookup + Sync + ?Sized,
    {
        let mut stage = Stage::Start;
        let result = async {
            let token = extract_bearer(headers, self.header_names.as_slice())
                .ok_or(AuthError::CredentialParseFailure)?;
            stage = Stage::CredentialsResolved;
            self.identity_for_token(&token)
                .await
                .map(|(_, identity)| identity)
        }
        .await;

        result.map_err(|e| deny(stage, e))
    }

    /// Logout: drop the cached identity so the token stops resolving.
    pub async fn revoke(&self, token: &str) -> Result<(), Denied> {
        let result = async {
            self.tokens.validate(token)?;
            let removed = self.resolver.cache().evict(token).await.map_err(|e| {
                error!(error = %e, "identity cache evict failed");
                AuthError::CacheUnavailable(e.to_string())
            })?;
            debug!(removed, "revoked token");
            Ok::<(), AuthError>(())
        }
        .await;

        result.map_err(|e| deny(Stage::CredentialsResolved, e))
    }

    fn presented<H>(&self, headers: &H) -> Result<Presented, AuthError>
    where
        H: HeaderLookup + ?Sized,
    {
        if let Some(token) = extract_bearer(headers, self.header_names.as_slice()) {
            return Ok(Presented::Token(token));
        }
        extract_credentials(headers, self.header_names.as_slice())
            .map(Presented::Credentials)
            .ok_or(AuthError::CredentialParseFailure)
    }

    async fn identity_for_token(&self, token: &str) -> Result<(TokenClaims, Identity), AuthError> {
        let claims = self.tokens.validate(token)?;
        let identity = self.resolver.resolve_by_token(token).await?;

        if identity.subject != claims.sub {
            return Err(AuthError::ValidationError(
                "token subject does not match cached identity".to_string(),
            ));
        }

        Ok((claims, identity))
    }

    async fn issue_and_cache(&self, identity: &Identity) -> Result<String, AuthError> {
        let issued = self.tokens.issue(&identity.subject)?;

        let json = identity
            .to_json()
            .map_err(|e| AuthError::CacheUnavailable(e.to_string()))?;

        self.resolver
            .cache()
            .put(
                &issued.token,
                &json,
                Duration::from_secs(self.tokens.ttl_seconds()),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "identity cache write failed");
                AuthError::CacheUnavailable(e.to_string())
            })?;

        Ok(issued.token)
    }
}

fn check<S: AsRef<str>>(
    identity: &Identity,
    args: &[S],
    payload: &str,
    stage: &mut Stage,
) -> Result<Authorized, AuthError> {
    let resolution = resolve_locks(args);
    let app = resolution.app.ok_or_else(|| {
        AuthError::LockConfigurationInvalid(format!(
            "expected [app] or [app, lock], got {} argument(s)",
            args.len()
        ))
    })?;
    let policy = AccessPolicy::from_locks(&resolution.locks);

    let resource = protected_resource(payload)?
        .ok_or_else(|| AuthError::MalformedPayload("result set has no records".to_string()))?;
    *stage = Stage::LocksResolved;

    let decision = evaluate(identity, &app, &policy);
    *stage = Stage::Evaluated;

    if !decision.is_authorized() {
        return Err(AuthError::GrantMismatch { app });
    }

    Ok(Authorized { app, resource })
}

fn deny(stage: Stage, cause: AuthError) -> Denied {
    if cause.is_operational() {
        error!(
            stage = stage.as_str(),
            kind = cause.kind(),
            error = %cause,
            "authorization failed on a collaborator fault"
        );
    } else {
        warn!(
            stage = stage.as_str(),
            kind = cause.kind(),
            error = %cause,
            "authorization denied"
        );
    }
    Denied::from(cause)
}
