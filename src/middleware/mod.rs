/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 認可そのものは middleware ではなく services::auth::Authorizer が担う
 */
pub mod http;
pub mod security_headers;
