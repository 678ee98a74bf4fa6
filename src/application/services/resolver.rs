//! Recipient resolution service.

use std::sync::Arc;

use crate::domain::repositories::MailingListRepository;
use crate::error::AppError;

/// Computes which members are currently eligible to receive a newsletter.
///
/// Eligible means: a member of at least one enabled mailing list associated
/// with the newsletter, with no send-queue job for it yet in any state. A
/// member already queued, sent, failed or bounced is never re-resolved;
/// only an explicit restart re-opens their job. The set difference runs
/// store-side, so membership is never loaded wholesale into memory.
pub struct RecipientResolver<M: MailingListRepository> {
    mailing_lists: Arc<M>,
}

impl<M: MailingListRepository> RecipientResolver<M> {
    /// Creates a new resolver.
    pub fn new(mailing_lists: Arc<M>) -> Self {
        Self { mailing_lists }
    }

    /// Resolves the deduplicated set of eligible member ids.
    ///
    /// A newsletter with no mailing lists, or none with members left to
    /// reach, resolves to an empty set. That is valid, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn resolve(&self, newsletter_id: i64) -> Result<Vec<i64>, AppError> {
        let lists = self.mailing_lists.lists_for_newsletter(newsletter_id).await?;
        let enabled = lists.iter().filter(|l| !l.disabled).count();

        if enabled == 0 {
            tracing::debug!(newsletter_id, "No enabled mailing lists; nothing to resolve");
            return Ok(Vec::new());
        }

        let members = self
            .mailing_lists
            .eligible_member_ids(newsletter_id)
            .await?;

        tracing::debug!(
            newsletter_id,
            lists = enabled,
            eligible = members.len(),
            "Resolved eligible recipients"
        );

        Ok(members)
    }
}
