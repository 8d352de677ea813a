use thiserror::Error;

/// The single message a denied caller ever sees.
pub const DENIAL_MESSAGE: &str = "User is not authorized";

/// Why an authorization attempt failed.
///
/// This never reaches the caller. It is kept so the orchestrator boundary can
/// log the real cause before collapsing it into [`Denied`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no usable credentials in request headers")]
    CredentialParseFailure,

    #[error("identity store returned no rows for the credentials")]
    IdentityNotFound,

    #[error("identity store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("no cached identity for the presented token")]
    CacheMiss,

    #[error("identity cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("token signing failed: {0}")]
    SigningError(String),

    #[error("token validation failed: {0}")]
    ValidationError(String),

    #[error("lock configuration invalid: {0}")]
    LockConfigurationInvalid(String),

    #[error("upstream payload malformed: {0}")]
    MalformedPayload(String),

    #[error("identity holds no grant satisfying the locks for app '{app}'")]
    GrantMismatch { app: String },
}

impl AuthError {
    /// Collaborator faults (store, cache, crypto) as opposed to ordinary denials.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::CacheUnavailable(_) | Self::SigningError(_)
        )
    }

    /// Stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CredentialParseFailure => "credential_parse_failure",
            Self::IdentityNotFound => "identity_not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::CacheMiss => "cache_miss",
            Self::CacheUnavailable(_) => "cache_unavailable",
            Self::SigningError(_) => "signing_error",
            Self::ValidationError(_) => "validation_error",
            Self::LockConfigurationInvalid(_) => "lock_configuration_invalid",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::GrantMismatch { .. } => "grant_mismatch",
        }
    }
}

/// Uniform denial returned by every public authorizer operation.
///
/// `Display` is fixed; the cause is only reachable through [`Denied::cause`].
#[derive(Debug, Error)]
#[error("{}", DENIAL_MESSAGE)]
pub struct Denied {
    cause: AuthError,
}

impl Denied {
    pub fn cause(&self) -> &AuthError {
        &self.cause
    }

    pub fn into_cause(self) -> AuthError {
        self.cause
    }
}

impl From<AuthError> for Denied {
    fn from(cause: AuthError) -> Self {
        Self { cause }
    }
}
