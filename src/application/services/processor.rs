//! Queue processor: claims batches and performs delivery.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::LinkService;
use crate::domain::delivery::{DeliveryOutcome, DeliveryService, OutgoingEmail};
use crate::domain::entities::{BatchOutcome, ClaimedJob, Newsletter, SendResult};
use crate::domain::rendering::{RenderContext, TemplateRenderer};
use crate::domain::repositories::{
    NewsletterRepository, QueueRepository, TrackedLinkRepository,
};
use crate::error::AppError;

/// Drains pending send jobs for a newsletter.
///
/// Designed for repeated, possibly-concurrent invocations: coordination
/// happens entirely through the store's atomic claim, batches can be
/// abandoned at any job boundary, and a crashed run leaves nothing worse
/// than claims for the lease sweeper to release.
pub struct QueueProcessor<Q, N, L>
where
    Q: QueueRepository,
    N: NewsletterRepository,
    L: TrackedLinkRepository,
{
    queue: Arc<Q>,
    newsletters: Arc<N>,
    links: Arc<LinkService<L>>,
    renderer: Arc<dyn TemplateRenderer>,
    delivery: Arc<dyn DeliveryService>,
    batch_size: i64,
}

impl<Q, N, L> QueueProcessor<Q, N, L>
where
    Q: QueueRepository,
    N: NewsletterRepository,
    L: TrackedLinkRepository,
{
    pub fn new(
        queue: Arc<Q>,
        newsletters: Arc<N>,
        links: Arc<LinkService<L>>,
        renderer: Arc<dyn TemplateRenderer>,
        delivery: Arc<dyn DeliveryService>,
        batch_size: i64,
    ) -> Self {
        Self {
            queue,
            newsletters,
            links,
            renderer,
            delivery,
            batch_size,
        }
    }

    /// Claims and processes one batch.
    ///
    /// Every claimed job reaches a terminal state before this returns: a
    /// render failure or rejected delivery marks that one job Failed and the
    /// batch continues, so one bad recipient never blocks the queue.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown newsletter.
    /// Returns [`AppError::InvalidTransition`] or [`AppError::Internal`] on
    /// store-level integrity failures, which abort the batch since they
    /// indicate a concurrency or logic bug.
    pub async fn process_batch(
        &self,
        newsletter_id: i64,
        batch_size: i64,
    ) -> Result<BatchOutcome, AppError> {
        let newsletter = self.require(newsletter_id).await?;

        let jobs = self.queue.claim_batch(newsletter_id, batch_size).await?;
        if jobs.is_empty() {
            return Ok(BatchOutcome::default());
        }

        tracing::debug!(newsletter_id, claimed = jobs.len(), "Claimed batch");

        // Link rewriting is per-newsletter, not per-recipient; the rewritten
        // body is shared by every job in the batch.
        let body = self
            .links
            .rewrite_links(newsletter_id, &newsletter.content)
            .await?;

        let mut outcome = BatchOutcome::default();
        for job in jobs {
            match self.deliver_one(&newsletter, &body, &job).await? {
                SendResult::Sent => outcome.sent += 1,
                _ => outcome.failed += 1,
            }
        }

        metrics::counter!("newsletter_jobs_sent_total").increment(outcome.sent);
        metrics::counter!("newsletter_jobs_failed_total").increment(outcome.failed);

        Ok(outcome)
    }

    /// Runs batches until no claimable job remains, then reconciles the
    /// newsletter status from the final counts.
    ///
    /// # Errors
    ///
    /// Same as [`Self::process_batch`].
    pub async fn process_until_drained(
        &self,
        newsletter_id: i64,
    ) -> Result<BatchOutcome, AppError> {
        let mut total = BatchOutcome::default();

        loop {
            let outcome = self.process_batch(newsletter_id, self.batch_size).await?;
            if outcome.processed() == 0 {
                break;
            }
            total.sent += outcome.sent;
            total.failed += outcome.failed;
            total.bounced += outcome.bounced;
        }

        self.reconcile_status(newsletter_id).await?;

        Ok(total)
    }

    /// Re-derives the persisted status from queue counts.
    ///
    /// The persisted field is only a display cache; this is the single place
    /// the processor writes it, and only once all jobs are terminal.
    async fn reconcile_status(&self, newsletter_id: i64) -> Result<(), AppError> {
        let newsletter = self.require(newsletter_id).await?;
        let counts = self.queue.counts(newsletter_id).await?;

        let derived = counts.derived_status();
        if counts.total() > 0 && derived != newsletter.status {
            self.newsletters.set_status(newsletter_id, derived).await?;
            tracing::info!(
                newsletter_id,
                status = derived.as_str(),
                "Newsletter status reconciled"
            );
        }

        Ok(())
    }

    /// Renders and delivers a single job, recording its terminal result.
    ///
    /// Only store-level failures propagate; per-job render and delivery
    /// problems resolve the job as Failed.
    async fn deliver_one(
        &self,
        newsletter: &Newsletter,
        body: &str,
        job: &ClaimedJob,
    ) -> Result<SendResult, AppError> {
        let ctx = RenderContext::for_recipient(&newsletter.subject, body, job);

        let rendered = match self.renderer.render(newsletter.render_template_name(), &ctx) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(job_id = job.id, recipient = %job.email, error = %e, "Render failed");
                self.queue.mark_result(job.id, SendResult::Failed).await?;
                return Ok(SendResult::Failed);
            }
        };

        let email = OutgoingEmail {
            from: newsletter.send_from.clone(),
            reply_to: newsletter.reply_to.clone(),
            to: job.email.clone(),
            subject: newsletter.subject.clone(),
            body_html: rendered,
        };

        let result = match self.delivery.deliver(&email).await {
            Ok(DeliveryOutcome::Accepted) => SendResult::Sent,
            Ok(DeliveryOutcome::Rejected { reason }) => {
                tracing::warn!(job_id = job.id, recipient = %job.email, reason = %reason, "Delivery rejected");
                SendResult::Failed
            }
            Err(e) => {
                tracing::warn!(job_id = job.id, recipient = %job.email, error = %e, "Delivery error");
                SendResult::Failed
            }
        };

        self.queue.mark_result(job.id, result).await?;
        Ok(result)
    }

    async fn require(&self, newsletter_id: i64) -> Result<Newsletter, AppError> {
        self.newsletters.find(newsletter_id).await?.ok_or_else(|| {
            AppError::not_found(
                "Newsletter not found",
                json!({ "newsletter_id": newsletter_id }),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delivery::MockDeliveryService;
    use crate::domain::entities::{NewsletterStatus, QueueCounts};
    use crate::domain::rendering::MockTemplateRenderer;
    use crate::domain::repositories::{
        MockNewsletterRepository, MockQueueRepository, MockTrackedLinkRepository,
    };
    use chrono::Utc;

    fn newsletter(status: NewsletterStatus) -> Newsletter {
        Newsletter {
            id: 1,
            subject: "Subject".to_string(),
            content: "<p>No links here</p>".to_string(),
            status,
            sent_date: None,
            send_from: "news@example.com".to_string(),
            reply_to: Some("replies@example.com".to_string()),
            as_template: false,
            archived: false,
            render_template: None,
            created_at: Utc::now(),
        }
    }

    fn job(id: i64, email: &str) -> ClaimedJob {
        ClaimedJob {
            id,
            newsletter_id: 1,
            member_id: id * 10,
            email: email.to_string(),
            first_name: Some("Ada".to_string()),
            surname: Some("Lovelace".to_string()),
            salutation: None,
        }
    }

    fn processor(
        queue: MockQueueRepository,
        newsletters: MockNewsletterRepository,
        renderer: MockTemplateRenderer,
        delivery: MockDeliveryService,
    ) -> QueueProcessor<MockQueueRepository, MockNewsletterRepository, MockTrackedLinkRepository>
    {
        let links = Arc::new(LinkService::new(
            Arc::new(MockTrackedLinkRepository::new()),
            "https://news.example.com",
        ));
        QueueProcessor::new(
            Arc::new(queue),
            Arc::new(newsletters),
            links,
            Arc::new(renderer),
            Arc::new(delivery),
            50,
        )
    }

    #[tokio::test]
    async fn test_accepted_delivery_marks_sent() {
        let mut queue = MockQueueRepository::new();
        queue
            .expect_claim_batch()
            .times(1)
            .returning(|_, _| Ok(vec![job(1, "a@example.com")]));
        queue
            .expect_mark_result()
            .withf(|id, r| *id == 1 && *r == SendResult::Sent)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_find()
            .returning(|_| Ok(Some(newsletter(NewsletterStatus::Sending))));

        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .times(1)
            .returning(|_, ctx| Ok(format!("<html>{}</html>", ctx.body)));

        let mut delivery = MockDeliveryService::new();
        delivery
            .expect_deliver()
            .withf(|e| e.to == "a@example.com" && e.from == "news@example.com")
            .times(1)
            .returning(|_| Ok(DeliveryOutcome::Accepted));

        let outcome = processor(queue, newsletters, renderer, delivery)
            .process_batch(1, 50)
            .await
            .unwrap();

        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.failed, 0);
    }

    #[tokio::test]
    async fn test_render_failure_marks_failed_and_batch_continues() {
        let mut queue = MockQueueRepository::new();
        queue
            .expect_claim_batch()
            .returning(|_, _| Ok(vec![job(1, "bad@example.com"), job(2, "ok@example.com")]));
        queue
            .expect_mark_result()
            .withf(|id, r| *id == 1 && *r == SendResult::Failed)
            .times(1)
            .returning(|_, _| Ok(()));
        queue
            .expect_mark_result()
            .withf(|id, r| *id == 2 && *r == SendResult::Sent)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_find()
            .returning(|_| Ok(Some(newsletter(NewsletterStatus::Sending))));

        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().times(2).returning(|_, ctx| {
            if ctx.email == "bad@example.com" {
                Err(AppError::internal("boom", serde_json::json!({})))
            } else {
                Ok("<html/>".to_string())
            }
        });

        let mut delivery = MockDeliveryService::new();
        // Only the successfully rendered job reaches delivery.
        delivery
            .expect_deliver()
            .withf(|e| e.to == "ok@example.com")
            .times(1)
            .returning(|_| Ok(DeliveryOutcome::Accepted));

        let outcome = processor(queue, newsletters, renderer, delivery)
            .process_batch(1, 50)
            .await
            .unwrap();

        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn test_rejected_delivery_marks_failed() {
        let mut queue = MockQueueRepository::new();
        queue
            .expect_claim_batch()
            .returning(|_, _| Ok(vec![job(1, "a@example.com")]));
        queue
            .expect_mark_result()
            .withf(|_, r| *r == SendResult::Failed)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_find()
            .returning(|_| Ok(Some(newsletter(NewsletterStatus::Sending))));

        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().returning(|_, _| Ok("<html/>".to_string()));

        let mut delivery = MockDeliveryService::new();
        delivery.expect_deliver().returning(|_| {
            Ok(DeliveryOutcome::Rejected {
                reason: "mailbox full".to_string(),
            })
        });

        let outcome = processor(queue, newsletters, renderer, delivery)
            .process_batch(1, 50)
            .await
            .unwrap();

        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn test_empty_claim_is_a_noop() {
        let mut queue = MockQueueRepository::new();
        queue.expect_claim_batch().returning(|_, _| Ok(vec![]));

        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_find()
            .returning(|_| Ok(Some(newsletter(NewsletterStatus::Sending))));

        let renderer = MockTemplateRenderer::new();
        let delivery = MockDeliveryService::new();

        let outcome = processor(queue, newsletters, renderer, delivery)
            .process_batch(1, 50)
            .await
            .unwrap();

        assert_eq!(outcome.processed(), 0);
    }

    #[tokio::test]
    async fn test_drain_marks_newsletter_sent_when_queue_empties() {
        let mut queue = MockQueueRepository::new();
        let mut claims = 0;
        queue.expect_claim_batch().times(2).returning(move |_, _| {
            claims += 1;
            if claims == 1 {
                Ok(vec![job(1, "a@example.com")])
            } else {
                Ok(vec![])
            }
        });
        queue.expect_mark_result().returning(|_, _| Ok(()));
        queue.expect_counts().times(1).returning(|_| {
            Ok(QueueCounts {
                sent: 1,
                ..Default::default()
            })
        });

        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_find()
            .returning(|_| Ok(Some(newsletter(NewsletterStatus::Sending))));
        newsletters
            .expect_set_status()
            .withf(|_, s| *s == NewsletterStatus::Sent)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().returning(|_, _| Ok("<html/>".to_string()));

        let mut delivery = MockDeliveryService::new();
        delivery
            .expect_deliver()
            .returning(|_| Ok(DeliveryOutcome::Accepted));

        let outcome = processor(queue, newsletters, renderer, delivery)
            .process_until_drained(1)
            .await
            .unwrap();

        assert_eq!(outcome.sent, 1);
    }

    #[tokio::test]
    async fn test_drain_leaves_status_while_jobs_remain_pending() {
        let mut queue = MockQueueRepository::new();
        // Batch-size claims return nothing (e.g. everything claimed by a
        // concurrent processor); counts still show in-flight jobs.
        queue.expect_claim_batch().returning(|_, _| Ok(vec![]));
        queue.expect_counts().returning(|_| {
            Ok(QueueCounts {
                claimed: 2,
                sent: 1,
                ..Default::default()
            })
        });

        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_find()
            .returning(|_| Ok(Some(newsletter(NewsletterStatus::Sending))));
        newsletters.expect_set_status().times(0);

        let renderer = MockTemplateRenderer::new();
        let delivery = MockDeliveryService::new();

        processor(queue, newsletters, renderer, delivery)
            .process_until_drained(1)
            .await
            .unwrap();
    }
}
