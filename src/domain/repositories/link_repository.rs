//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPage, LinkPatch, LinkQuery, LinkTotals, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Every lookup other than [`LinkRepository::find_by_code`] is scoped to the
/// owning user, so a foreign link is indistinguishable from a missing one.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteLinkRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Returns true if any link already uses `code`.
    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError>;

    /// Finds a link by its exact short code, regardless of owner.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by id if it belongs to `user_id`.
    async fn find_by_id_for_user(&self, id: i64, user_id: i64)
    -> Result<Option<Link>, AppError>;

    /// Lists a user's links with paging, ordering and an optional search term
    /// matched against title, original URL and short code.
    async fn list(&self, query: LinkQuery) -> Result<LinkPage, AppError>;

    /// Partially updates a link owned by `user_id`.
    ///
    /// Only fields present in [`LinkPatch`] are modified.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `id` + `user_id`.
    async fn update(&self, id: i64, user_id: i64, patch: LinkPatch) -> Result<Link, AppError>;

    /// Deletes a link owned by `user_id`. Click logs are removed by cascade.
    ///
    /// Returns `Ok(true)` if a row was deleted.
    async fn delete(&self, id: i64, user_id: i64) -> Result<bool, AppError>;

    /// Atomically adds one to the link's click counter.
    async fn increment_click_count(&self, link_id: i64) -> Result<(), AppError>;

    /// Returns link and click-counter totals for a user.
    async fn totals_for_user(&self, user_id: i64) -> Result<LinkTotals, AppError>;

    /// Returns the user's most recently created links.
    async fn recent_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Link>, AppError>;
}
