use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::services::auth::error::AuthError;

/// HS512 wants a key at least as long as its 512-bit digest.
pub const MIN_SECRET_LEN: usize = 64;

/// Claims carried by an issued token. All timestamps are epoch seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// An issued token together with the claims that were signed into it.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Issues and verifies HS512 tokens bound to a subject.
///
/// `exp` is always `iat + ttl`. The secret and issuer are checked on use, not on
/// construction, so a misconfigured service fails each issuance with
/// `SigningError` (and each validation with `ValidationError`).
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    issuer: String,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, issuer: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            ttl_seconds,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    fn check_settings(&self) -> Result<(), String> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(format!(
                "signing key must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                self.secret.len()
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err("issuer is empty".to_string());
        }
        Ok(())
    }

    /// Issue a token for `subject`, issued now.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a token for `subject` with an explicit issued-at (epoch seconds).
    pub fn issue_at(&self, subject: &str, issued_at: i64) -> Result<IssuedToken, AuthError> {
        self.check_settings().map_err(|msg| {
            error!(error = %msg, "token signing misconfigured");
            AuthError::SigningError(msg)
        })?;

        let ttl = i64::try_from(self.ttl_seconds)
            .map_err(|_| AuthError::SigningError("ttl out of range".to_string()))?;

        let claims = TokenClaims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        };

        let mut header = Header::new(Algorithm::HS512);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| {
                error!(error = %e, "failed to sign token");
                AuthError::SigningError(e.to_string())
            })?;

        debug!(sub = %claims.sub, exp = claims.exp, "issued token");

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature, issuer and expiry. Never touches the identity cache.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.check_settings().map_err(AuthError::ValidationError)?;

        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub", "iat"]);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::ValidationError("empty 'sub' claim".to_string()));
        }
        if claims.exp <= claims.iat {
            return Err(AuthError::ValidationError(
                "'exp' does not follow 'iat'".to_string(),
            ));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(SECRET, "yada-test", 3600)
    }

    #[test]
    fn issued_token_validates_immediately() {
        let svc = service();
        let issued = svc.issue("92903040").unwrap();

        let claims = svc.validate(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "92903040");
        assert_eq!(claims.iss, "yada-test");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let issued = svc
            .issue_at("92903040", Utc::now().timestamp() - 3700)
            .unwrap();

        let err = svc.validate(&issued.token).unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[test]
    fn other_issuer_is_rejected() {
        let issued = service().issue("92903040").unwrap();
        let other = TokenService::new(SECRET, "someone-else", 3600);

        assert!(matches!(
            other.validate(&issued.token),
            Err(AuthError::ValidationError(_))
        ));
    }

    #[test]
    fn other_key_is_rejected() {
        let issued = service().issue("92903040").unwrap();
        let other = TokenService::new(
            b"fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210".as_slice(),
            "yada-test",
            3600,
        );

        assert!(matches!(
            other.validate(&issued.token),
            Err(AuthError::ValidationError(_))
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let svc = service();
        for bad in ["", "not-a-token", "a.b.c"] {
            assert!(matches!(svc.validate(bad), Err(AuthError::ValidationError(_))));
        }
    }

    #[test]
    fn short_key_or_missing_issuer_cannot_sign() {
        let short = TokenService::new(b"too-short".as_slice(), "yada-test", 3600);
        assert!(matches!(short.issue("1"), Err(AuthError::SigningError(_))));

        let no_issuer = TokenService::new(SECRET, "  ", 3600);
        assert!(matches!(no_issuer.issue("1"), Err(AuthError::SigningError(_))));
    }

    #[test]
    fn debug_hides_secret() {
        let out = format!("{:?}", service());
        assert!(!out.contains("0123456789abcdef"));
    }
}
