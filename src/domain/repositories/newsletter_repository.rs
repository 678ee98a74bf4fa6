//! Repository trait for newsletter data access.

use crate::domain::entities::{Newsletter, NewsletterStatus};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for newsletter metadata.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgNewsletterRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Finds a newsletter by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Newsletter))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find(&self, id: i64) -> Result<Option<Newsletter>, AppError>;

    /// Persists a derived status.
    ///
    /// When the status becomes [`NewsletterStatus::Sent`] for the first time
    /// the sent date is stamped; moving back to Sending (restart) leaves the
    /// previous sent date in place.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_status(&self, id: i64, status: NewsletterStatus) -> Result<(), AppError>;

    /// Sets or clears the archived flag.
    ///
    /// The archive rule (not while sending) is enforced by the service
    /// layer, not here.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_archived(&self, id: i64, archived: bool) -> Result<(), AppError>;
}
