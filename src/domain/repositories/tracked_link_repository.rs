//! Repository trait for tracked-link storage.

use crate::domain::entities::{NewTrackedLink, TrackedLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for per-newsletter tracked links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTrackedLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackedLinkRepository: Send + Sync {
    /// Gets the tracked link for `(newsletter, original)`, creating it with
    /// the candidate's hash if it does not exist yet.
    ///
    /// Idempotent: rewriting the same newsletter again reuses the existing
    /// row and its stable hash; the candidate hash is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_or_create(&self, candidate: NewTrackedLink) -> Result<TrackedLink, AppError>;

    /// All tracked links for a newsletter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn links_for_newsletter(
        &self,
        newsletter_id: i64,
    ) -> Result<Vec<TrackedLink>, AppError>;

    /// Increments the visit counter for a hash and returns the original URL.
    ///
    /// Called by the external click-redirect collaborator. Returns `None`
    /// for an unknown hash. The counter is monotonic; nothing decrements it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_visit(&self, hash: &str) -> Result<Option<String>, AppError>;
}
