//! Repository trait for the send queue store.

use crate::domain::entities::{ClaimedJob, QueueCounts, SendResult};
use crate::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// Durable CRUD over send-queue jobs keyed by (newsletter, member).
///
/// The store is the only shared mutable state between concurrent processors;
/// all coordination happens through [`QueueRepository::claim_batch`], which
/// must be atomic.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgQueueRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_queue.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Inserts one Pending job per member not already queued for this
    /// newsletter.
    ///
    /// Idempotent: members that already have a job for the newsletter (in
    /// any state) are skipped silently. Returns the number of jobs actually
    /// inserted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn enqueue(&self, newsletter_id: i64, member_ids: &[i64]) -> Result<u64, AppError>;

    /// Atomically claims up to `limit` Pending jobs, oldest queued first.
    ///
    /// Claimed jobs leave the Pending state in the same statement, so two
    /// concurrent claims over the same newsletter never return overlapping
    /// job sets. Returned jobs carry the recipient fields needed for
    /// rendering and delivery.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn claim_batch(
        &self,
        newsletter_id: i64,
        limit: i64,
    ) -> Result<Vec<ClaimedJob>, AppError>;

    /// Records a terminal result for a claimed or pending job.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidTransition`] if the job is already in a
    /// terminal state, or if `result` is not terminal.
    /// Returns [`AppError::NotFound`] if the job does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn mark_result(&self, job_id: i64, result: SendResult) -> Result<(), AppError>;

    /// Resets Failed and Claimed jobs (and optionally Bounced) back to
    /// Pending, clearing claim and resolution timestamps.
    ///
    /// Sent jobs are never touched. Returns the number of jobs reset.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn restart_failed(
        &self,
        newsletter_id: i64,
        include_bounced: bool,
    ) -> Result<u64, AppError>;

    /// Releases claims older than `lease` back to Pending.
    ///
    /// A processor that crashed after claiming never resolves its jobs; the
    /// lease guarantees they become claimable again rather than being
    /// silently lost. Returns the number of jobs released.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn release_stale_claims(&self, lease: Duration) -> Result<u64, AppError>;

    /// Per-result job totals for a newsletter; the source of truth the
    /// newsletter status is derived from.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn counts(&self, newsletter_id: i64) -> Result<QueueCounts, AppError>;
}
