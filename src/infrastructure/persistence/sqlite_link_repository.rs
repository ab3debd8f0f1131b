//! SQLite implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::domain::entities::{
    Link, LinkPage, LinkPatch, LinkQuery, LinkSort, LinkTotals, NewLink,
};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use serde_json::json;

const LINK_COLUMNS: &str = "id, user_id, short_code, original_url, title, description, tags, \
     is_active, expires_at, click_count, created_at, updated_at";

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    user_id: i64,
    short_code: String,
    original_url: String,
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    click_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            user_id: r.user_id,
            short_code: r.short_code,
            original_url: r.original_url,
            title: r.title,
            description: r.description,
            tags: r.tags,
            is_active: r.is_active,
            expires_at: r.expires_at,
            click_count: r.click_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// SQLite repository for link storage and retrieval.
pub struct SqliteLinkRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

fn order_clause(sort: LinkSort) -> &'static str {
    match sort {
        LinkSort::CreatedAt => "created_at DESC, id DESC",
        LinkSort::ClickCount => "click_count DESC, created_at DESC, id DESC",
        LinkSort::Title => "title IS NULL, title COLLATE NOCASE ASC, id DESC",
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO short_links
                (user_id, short_code, original_url, title, description, tags,
                 is_active, expires_at, click_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, 0, ?, ?)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(new_link.user_id)
            .bind(&new_link.short_code)
            .bind(&new_link.original_url)
            .bind(&new_link.title)
            .bind(&new_link.description)
            .bind(&new_link.tags)
            .bind(new_link.expires_at)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict { .. } => AppError::conflict(
                    "Short code already exists",
                    json!({ "short_code": new_link.short_code }),
                ),
                other => other,
            })?;

        Ok(row.into())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_links WHERE short_code = ?)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE short_code = ?");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id_for_user(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE id = ? AND user_id = ?");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn list(&self, query: LinkQuery) -> Result<LinkPage, AppError> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        const FILTER: &str = "user_id = ?1 AND (?2 IS NULL OR title LIKE ?2 \
             OR original_url LIKE ?2 OR short_code LIKE ?2 OR tags LIKE ?2)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM short_links WHERE {FILTER}"
        ))
        .bind(query.user_id)
        .bind(&pattern)
        .fetch_one(self.pool.as_ref())
        .await?;

        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM short_links WHERE {FILTER} ORDER BY {} LIMIT ?3 OFFSET ?4",
            order_clause(query.sort)
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(query.user_id)
            .bind(&pattern)
            .bind(query.limit)
            .bind(query.offset())
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(LinkPage {
            links: rows.into_iter().map(Link::from).collect(),
            total,
        })
    }

    async fn update(&self, id: i64, user_id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            UPDATE short_links SET
                title       = CASE WHEN ?1 THEN NULLIF(?2, '') ELSE title END,
                description = CASE WHEN ?3 THEN NULLIF(?4, '') ELSE description END,
                tags        = CASE WHEN ?5 THEN NULLIF(?6, '') ELSE tags END,
                is_active   = COALESCE(?7, is_active),
                expires_at  = CASE WHEN ?8 THEN ?9 ELSE expires_at END,
                updated_at  = ?10
            WHERE id = ?11 AND user_id = ?12
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(patch.title.is_some())
            .bind(&patch.title)
            .bind(patch.description.is_some())
            .bind(&patch.description)
            .bind(patch.tags.is_some())
            .bind(&patch.tags)
            .bind(patch.is_active)
            .bind(patch.expires_at.is_some())
            .bind(patch.expires_at.flatten())
            .bind(Utc::now())
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_click_count(&self, link_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE short_links SET click_count = click_count + 1 WHERE id = ?")
            .bind(link_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "id": link_id }),
            ));
        }

        Ok(())
    }

    async fn totals_for_user(&self, user_id: i64) -> Result<LinkTotals, AppError> {
        let (total_links, active_links, total_clicks): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN is_active THEN 1 ELSE 0 END), 0),
                   COALESCE(SUM(click_count), 0)
            FROM short_links
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkTotals {
            total_links,
            active_links,
            total_clicks,
        })
    }

    async fn recent_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM short_links WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC LIMIT ?"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }
}
