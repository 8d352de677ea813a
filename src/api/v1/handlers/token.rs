/*
 * Responsibility
 * - POST /token (Basic 認証 → トークン発行 + identity キャッシュ)
 * - GET /token/validate (署名/issuer/期限 + identity キャッシュの存在を確認)
 * - GET /identity (トークンに紐づくキャッシュ済み identity)
 * - DELETE /token (identity キャッシュの破棄)
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{
    api::v1::extractors::PresentedToken, error::AppError, services::auth::identity::Identity,
    state::AppState,
};

pub async fn obtain_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, String), AppError> {
    let token = state.authorizer.obtain_token(&headers).await?;
    Ok((StatusCode::OK, token))
}

pub async fn validate_token(
    State(state): State<AppState>,
    PresentedToken(token): PresentedToken,
) -> Result<StatusCode, AppError> {
    state.authorizer.check_token(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Identity>, AppError> {
    let identity = state.authorizer.identity(&headers).await?;
    Ok(Json(identity))
}

pub async fn revoke_token(
    State(state): State<AppState>,
    PresentedToken(token): PresentedToken,
) -> Result<StatusCode, AppError> {
    state.authorizer.revoke(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
