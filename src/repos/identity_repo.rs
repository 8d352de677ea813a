/*
 * Responsibility
 * - identity store (login query) 向け SQLx 操作
 * - PgPool を受け取り (app, role) 行を返す
 * - DB エラーは RepoError として返す (上位で StoreUnavailable に変換)
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

pub const DEFAULT_LOGIN_QUERY: &str = r#"
    SELECT app, role
    FROM yada_ug
    WHERE userid = $1 AND pw = $2
"#;

#[derive(Debug, FromRow)]
pub struct LoginRow {
    pub app: String,
    pub role: String,
}

#[derive(Clone, Debug)]
pub struct IdentityRepo {
    pool: PgPool,
    login_query: String,
}

impl IdentityRepo {
    pub fn new(pool: PgPool, login_query: impl Into<String>) -> Self {
        Self {
            pool,
            login_query: login_query.into(),
        }
    }

    // Rows granted to (userid, password). Empty when the credentials match nothing.
    pub async fn login_rows(&self, userid: &str, password: &str) -> RepoResult<Vec<LoginRow>> {
        let rows = sqlx::query_as::<_, LoginRow>(&self.login_query)
            .bind(userid)
            .bind(password)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
