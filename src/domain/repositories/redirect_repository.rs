//! Repository trait for redirect rule data access.

use crate::domain::entities::{NewRedirect, RedirectPatch, RedirectRule};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for redirect rules.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRedirectRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_redirect.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectRepository: Send + Sync {
    /// Returns every active rule, ordered by id.
    ///
    /// This is the query behind each cache rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_active(&self) -> Result<Vec<RedirectRule>, AppError>;

    /// Lists rules, optionally filtered by `is_active`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, active: Option<bool>) -> Result<Vec<RedirectRule>, AppError>;

    /// Finds a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<RedirectRule>, AppError>;

    /// Finds a rule by its exact (normalized) source path.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_source(&self, source: &str) -> Result<Option<RedirectRule>, AppError>;

    /// Creates a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a rule with the same source exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_redirect: NewRedirect) -> Result<RedirectRule, AppError>;

    /// Partially updates a rule and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rule has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: RedirectPatch) -> Result<RedirectRule, AppError>;

    /// Deletes a rule.
    ///
    /// Returns `Ok(true)` if a row was removed, `Ok(false)` if none matched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Adds one to the hit counter of a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_hits(&self, id: i64) -> Result<(), AppError>;

    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store cannot be queried.
    async fn ping(&self) -> Result<(), AppError>;
}
