use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Bearer token taken from the authorizer's configured headers.
///
/// Missing or malformed headers reject with the uniform 401.
pub struct PresentedToken(pub String);

impl FromRequestParts<AppState> for PresentedToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authorizer
            .bearer_token(&parts.headers)
            .map(PresentedToken)
            .ok_or_else(|| {
                tracing::debug!("no bearer token presented");
                AppError::Unauthorized
            })
    }
}
