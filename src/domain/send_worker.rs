//! Background tasks around the send queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::services::QueueProcessor;
use crate::domain::repositories::{
    NewsletterRepository, QueueRepository, TrackedLinkRepository,
};
use crate::domain::send_command::SendCommand;

/// Drains send commands and processes the named newsletter's queue until no
/// claimable job remains.
///
/// Commands are fire-and-forget; a failed drain is logged and the worker
/// moves on. Jobs stay Pending and become claimable again on the next
/// command or restart, so nothing is lost.
pub async fn run_send_worker<Q, N, L>(
    mut rx: mpsc::Receiver<SendCommand>,
    processor: Arc<QueueProcessor<Q, N, L>>,
) where
    Q: QueueRepository,
    N: NewsletterRepository,
    L: TrackedLinkRepository,
{
    while let Some(cmd) = rx.recv().await {
        match processor.process_until_drained(cmd.newsletter_id).await {
            Ok(outcome) => {
                tracing::info!(
                    newsletter_id = cmd.newsletter_id,
                    sent = outcome.sent,
                    failed = outcome.failed,
                    bounced = outcome.bounced,
                    "Send queue drained"
                );
            }
            Err(e) => {
                tracing::error!(
                    newsletter_id = cmd.newsletter_id,
                    error = %e,
                    "Queue processing aborted"
                );
            }
        }
    }
}

/// Periodically releases claims whose lease has expired.
///
/// A processor that crashed mid-batch leaves its jobs Claimed; this sweep
/// returns them to Pending so they are eventually retried rather than
/// silently lost.
pub async fn run_claim_sweeper<Q>(queue: Arc<Q>, lease: Duration, sweep_interval: Duration)
where
    Q: QueueRepository,
{
    let mut ticker = tokio::time::interval(sweep_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match queue.release_stale_claims(lease).await {
            Ok(0) => {}
            Ok(released) => {
                metrics::counter!("newsletter_stale_claims_released_total").increment(released);
                tracing::warn!(released, "Released stale claims back to pending");
            }
            Err(e) => {
                tracing::error!(error = %e, "Stale-claim sweep failed");
            }
        }
    }
}
