//! Send-queue orchestration service.
//!
//! Owns the admin-facing operations: start sending, restart processing,
//! progress reporting, and archiving. Delivery itself happens in
//! [`super::processor::QueueProcessor`].

use std::sync::Arc;

use serde_json::json;

use crate::application::services::RecipientResolver;
use crate::domain::entities::{Newsletter, NewsletterStatus, QueueCounts};
use crate::domain::repositories::{
    MailingListRepository, NewsletterRepository, QueueRepository,
};
use crate::error::AppError;

/// Progress snapshot for one newsletter.
#[derive(Debug, Clone)]
pub struct QueueProgress {
    pub status: NewsletterStatus,
    pub counts: QueueCounts,
}

pub struct QueueService<Q, N, M>
where
    Q: QueueRepository,
    N: NewsletterRepository,
    M: MailingListRepository,
{
    queue: Arc<Q>,
    newsletters: Arc<N>,
    resolver: RecipientResolver<M>,
    /// Whether an admin restart also re-opens bounced jobs.
    restart_includes_bounced: bool,
}

impl<Q, N, M> QueueService<Q, N, M>
where
    Q: QueueRepository,
    N: NewsletterRepository,
    M: MailingListRepository,
{
    pub fn new(
        queue: Arc<Q>,
        newsletters: Arc<N>,
        mailing_lists: Arc<M>,
        restart_includes_bounced: bool,
    ) -> Self {
        Self {
            queue,
            newsletters,
            resolver: RecipientResolver::new(mailing_lists),
            restart_includes_bounced,
        }
    }

    /// Resolves eligible recipients and enqueues one job each, moving a
    /// Draft newsletter to Sending once jobs exist.
    ///
    /// Idempotent: recipients already queued are skipped by the store, so
    /// calling this twice produces no duplicate jobs. A newsletter with no
    /// eligible recipients stays Draft and this returns 0.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown newsletter.
    /// Returns [`AppError::Conflict`] for an archived newsletter.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn start_sending(&self, newsletter_id: i64) -> Result<u64, AppError> {
        let newsletter = self.require(newsletter_id).await?;

        if newsletter.archived {
            return Err(AppError::conflict(
                "Archived newsletter cannot be sent",
                json!({ "newsletter_id": newsletter_id }),
            ));
        }

        let eligible = self.resolver.resolve(newsletter_id).await?;

        let inserted = if eligible.is_empty() {
            0
        } else {
            self.queue.enqueue(newsletter_id, &eligible).await?
        };

        if inserted > 0 {
            metrics::counter!("newsletter_jobs_enqueued_total").increment(inserted);
        }

        let counts = self.queue.counts(newsletter_id).await?;
        if counts.total() > 0 && newsletter.status == NewsletterStatus::Draft {
            self.newsletters
                .set_status(newsletter_id, NewsletterStatus::Sending)
                .await?;
        }

        tracing::info!(
            newsletter_id,
            queued = inserted,
            total = counts.total(),
            "Recipients enqueued"
        );

        Ok(inserted)
    }

    /// Admin "restart queue processing": re-opens Failed and Claimed jobs
    /// (and Bounced ones when configured) and re-derives the status.
    ///
    /// Sent jobs are never touched, so nobody receives the newsletter twice.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown newsletter.
    /// Returns [`AppError::Conflict`] for an archived newsletter.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn restart(&self, newsletter_id: i64) -> Result<u64, AppError> {
        let newsletter = self.require(newsletter_id).await?;

        // Same rule as start_sending: an archived newsletter must never
        // re-enter Sending.
        if newsletter.archived {
            return Err(AppError::conflict(
                "Archived newsletter cannot be restarted",
                json!({ "newsletter_id": newsletter_id }),
            ));
        }

        let reset = self
            .queue
            .restart_failed(newsletter_id, self.restart_includes_bounced)
            .await?;

        if reset > 0 {
            metrics::counter!("newsletter_queue_restarts_total").increment(1);

            let counts = self.queue.counts(newsletter_id).await?;
            let derived = counts.derived_status();
            if derived != newsletter.status {
                self.newsletters.set_status(newsletter_id, derived).await?;
            }
        }

        tracing::info!(newsletter_id, reset, "Queue restart requested");

        Ok(reset)
    }

    /// Current per-result counts and the status derived from them.
    ///
    /// The persisted status is a cache; what is reported here is always
    /// recomputed from the queue, so the two can never drift apart from the
    /// admin's point of view.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown newsletter.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn progress(&self, newsletter_id: i64) -> Result<QueueProgress, AppError> {
        self.require(newsletter_id).await?;

        let counts = self.queue.counts(newsletter_id).await?;

        Ok(QueueProgress {
            status: counts.derived_status(),
            counts,
        })
    }

    /// Archives a newsletter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] while the newsletter is sending.
    /// Returns [`AppError::NotFound`] for an unknown newsletter.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn archive(&self, newsletter_id: i64) -> Result<(), AppError> {
        let newsletter = self.require(newsletter_id).await?;

        if !newsletter.can_archive() {
            return Err(AppError::conflict(
                "Cannot archive a newsletter while it is sending",
                json!({ "newsletter_id": newsletter_id, "status": newsletter.status.as_str() }),
            ));
        }

        self.newsletters.set_archived(newsletter_id, true).await
    }

    async fn require(&self, newsletter_id: i64) -> Result<Newsletter, AppError> {
        if newsletter_id <= 0 {
            return Err(AppError::bad_request(
                "Newsletter id must be positive",
                json!({ "newsletter_id": newsletter_id }),
            ));
        }

        self.newsletters.find(newsletter_id).await?.ok_or_else(|| {
            AppError::not_found(
                "Newsletter not found",
                json!({ "newsletter_id": newsletter_id }),
            )
        })
    }
}
