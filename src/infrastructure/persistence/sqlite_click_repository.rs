//! SQLite implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::domain::entities::{ClickLog, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

const CLICK_COLUMNS: &str =
    "id, link_id, ip_hash, user_agent, device_type, browser, os, country, referrer, clicked_at";

#[derive(FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    ip_hash: String,
    user_agent: String,
    device_type: String,
    browser: String,
    os: String,
    country: Option<String>,
    referrer: Option<String>,
    clicked_at: DateTime<Utc>,
}

impl From<ClickRow> for ClickLog {
    fn from(r: ClickRow) -> Self {
        ClickLog {
            id: r.id,
            link_id: r.link_id,
            ip_hash: r.ip_hash,
            user_agent: r.user_agent,
            device_type: r.device_type,
            browser: r.browser,
            os: r.os,
            country: r.country,
            referrer: r.referrer,
            clicked_at: r.clicked_at,
        }
    }
}

/// SQLite repository for click logs.
pub struct SqliteClickRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteClickRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for SqliteClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<ClickLog, AppError> {
        let sql = format!(
            r#"
            INSERT INTO click_logs
                (link_id, ip_hash, user_agent, device_type, browser, os, country, referrer, clicked_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {CLICK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(new_click.link_id)
            .bind(&new_click.ip_hash)
            .bind(&new_click.user_agent)
            .bind(new_click.device_type.as_str())
            .bind(&new_click.browser)
            .bind(&new_click.os)
            .bind(&new_click.country)
            .bind(&new_click.referrer)
            .bind(new_click.clicked_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn clicks_for_link_since(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClickLog>, AppError> {
        let sql = format!(
            "SELECT {CLICK_COLUMNS} FROM click_logs \
             WHERE link_id = ? AND clicked_at >= ? ORDER BY clicked_at ASC, id ASC"
        );

        let rows = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(link_id)
            .bind(since)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ClickLog::from).collect())
    }

    async fn count_for_user_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM click_logs c
            JOIN short_links l ON l.id = c.link_id
            WHERE l.user_id = ? AND c.clicked_at >= ?
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn daily_counts_for_user_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT substr(c.clicked_at, 1, 10) AS day, COUNT(*) AS clicks
            FROM click_logs c
            JOIN short_links l ON l.id = c.link_id
            WHERE l.user_id = ? AND c.clicked_at >= ?
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }
}
