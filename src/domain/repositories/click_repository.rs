//! Repository trait for click logs.

use crate::domain::entities::{ClickLog, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for click tracking and analytics reads.
///
/// Click logs are append-only; there is no update or delete beyond the
/// cascade from the owning link.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteClickRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click log.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the referenced link does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, new_click: NewClick) -> Result<ClickLog, AppError>;

    /// Returns every click of a link at or after `since`, oldest first.
    async fn clicks_for_link_since(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClickLog>, AppError>;

    /// Counts click logs across all of a user's links at or after `since`.
    async fn count_for_user_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Click counts per UTC date (`YYYY-MM-DD`) across a user's links since `since`.
    async fn daily_counts_for_user_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>, AppError>;
}
