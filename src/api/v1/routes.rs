/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /token, /identity, /authorize
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    authorize::authorize,
    health::health,
    token::{current_identity, obtain_token, revoke_token, validate_token},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/token", post(obtain_token).delete(revoke_token))
        .route("/token/validate", get(validate_token))
        .route("/identity", get(current_identity))
        .route("/authorize", post(authorize))
}
