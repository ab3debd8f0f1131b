//! SQLite implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;
use serde_json::json;

const TOKEN_COLUMNS: &str = "id, user_id, name, token_hash, created_at, last_used_at, revoked_at";

#[derive(FromRow)]
struct TokenRow {
    id: i64,
    user_id: i64,
    name: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(r: TokenRow) -> Self {
        ApiToken {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            token_hash: r.token_hash,
            created_at: r.created_at,
            last_used_at: r.last_used_at,
            revoked_at: r.revoked_at,
        }
    }
}

/// SQLite repository for API token storage and validation.
///
/// Stores keyed token hashes only. Raw tokens are never persisted.
pub struct SqliteTokenRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn validate_token(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let user_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM api_tokens
            WHERE token_hash = ?
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user_id)
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET last_used_at = ?
            WHERE token_hash = ?
              AND revoked_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let sql = format!(
            "INSERT INTO api_tokens (user_id, name, token_hash, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {TOKEN_COLUMNS}"
        );

        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(user_id)
            .bind(name)
            .bind(token_hash)
            .bind(Utc::now())
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM api_tokens ORDER BY created_at DESC, id DESC");

        let rows = sqlx::query_as::<_, TokenRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ApiToken::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE id = ?");

        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE name = ? ORDER BY id DESC LIMIT 1"
        );

        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        if self.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("Token not found", json!({ "id": id })));
        }

        sqlx::query("UPDATE api_tokens SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
