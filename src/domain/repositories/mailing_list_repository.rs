//! Repository trait for mailing-list membership lookups.

use crate::domain::entities::MailingList;
use crate::error::AppError;
use async_trait::async_trait;

/// Read-only access to mailing-list membership.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMailingListRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailingListRepository: Send + Sync {
    /// Mailing lists associated with a newsletter, disabled ones included.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn lists_for_newsletter(&self, newsletter_id: i64)
        -> Result<Vec<MailingList>, AppError>;

    /// Member ids eligible to receive a newsletter.
    ///
    /// The union of enabled-list members, minus members already present in
    /// the send queue for this newsletter in any state, computed store-side
    /// in a single query and returned deduplicated. An empty result is
    /// valid, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn eligible_member_ids(&self, newsletter_id: i64) -> Result<Vec<i64>, AppError>;
}
