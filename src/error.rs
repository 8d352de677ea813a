/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 認可失敗 (Denied) は原因を問わず 401 + 固定メッセージに統一する
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::{DENIAL_MESSAGE, Denied};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{}", DENIAL_MESSAGE)]
    Unauthorized,

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// The cause was already logged by the authorizer.
impl From<Denied> for AppError {
    fn from(_: Denied) -> Self {
        AppError::Unauthorized
    }
}

impl From<ConfigError> for AppError {
    fn from(_: ConfigError) -> Self {
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthError;

    #[test]
    fn every_denial_maps_to_the_same_response() {
        for cause in [
            AuthError::CacheMiss,
            AuthError::StoreUnavailable("down".into()),
            AuthError::GrantMismatch { app: "orders".into() },
        ] {
            let err = AppError::from(Denied::from(cause));
            assert_eq!(err.to_string(), DENIAL_MESSAGE);
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
