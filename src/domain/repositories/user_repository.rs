//! Repository trait for link owners.

use crate::domain::entities::User;
use crate::error::AppError;
use async_trait::async_trait;

/// Users are provisioned by the operator CLI; the HTTP surface only reads them
/// indirectly through token validation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    async fn create(&self, email: &str, display_name: Option<String>) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;
}
