/*
 * Responsibility
 * - POST /authorize
 * - ヘッダ (Basic / Bearer) + args + upstream payload を Authorizer::engage に渡す
 * - 成功時は payload を捨て、トークン文字列のみを返す
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};

use crate::{api::v1::dto::authorize::AuthorizeRequest, error::AppError, state::AppState};

pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<(StatusCode, String), AppError> {
    let Json(req) = body.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let token = state
        .authorizer
        .engage(&headers, req.args.as_slice(), &req.payload_text())
        .await?;

    Ok((StatusCode::OK, token))
}
