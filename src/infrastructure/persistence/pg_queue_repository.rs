//! PostgreSQL implementation of the send queue store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::domain::entities::{ClaimedJob, QueueCounts, SendResult};
use crate::domain::repositories::QueueRepository;
use crate::error::AppError;

/// PostgreSQL send queue store.
///
/// Claiming relies on `FOR UPDATE SKIP LOCKED`, so concurrent processors
/// coordinate entirely inside the database; no in-process locks exist.
pub struct PgQueueRepository {
    pool: Arc<PgPool>,
}

impl PgQueueRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClaimedJobRow {
    id: i64,
    newsletter_id: i64,
    member_id: i64,
    queued_at: DateTime<Utc>,
    email: String,
    first_name: Option<String>,
    surname: Option<String>,
    salutation: Option<String>,
}

#[async_trait]
impl QueueRepository for PgQueueRepository {
    async fn enqueue(&self, newsletter_id: i64, member_ids: &[i64]) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO send_queue (newsletter_id, member_id)
            SELECT $1, member_id FROM UNNEST($2::BIGINT[]) AS t(member_id)
            ON CONFLICT (newsletter_id, member_id) DO NOTHING
            "#,
        )
        .bind(newsletter_id)
        .bind(member_ids)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn claim_batch(
        &self,
        newsletter_id: i64,
        limit: i64,
    ) -> Result<Vec<ClaimedJob>, AppError> {
        // The subselect locks and skips rows already claimed by a concurrent
        // processor; the UPDATE takes them out of Pending in the same
        // statement, so no two claims ever overlap.
        let mut rows = sqlx::query_as::<_, ClaimedJobRow>(
            r#"
            UPDATE send_queue
            SET result = 'claimed', claimed_at = NOW()
            FROM members m
            WHERE send_queue.id IN (
                SELECT id FROM send_queue
                WHERE newsletter_id = $1 AND result = 'pending'
                ORDER BY queued_at, id
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            AND m.id = send_queue.member_id
            RETURNING send_queue.id, send_queue.newsletter_id, send_queue.member_id,
                      send_queue.queued_at, m.email, m.first_name, m.surname, m.salutation
            "#,
        )
        .bind(newsletter_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        // UPDATE .. RETURNING does not guarantee row order.
        rows.sort_by_key(|r| (r.queued_at, r.id));

        Ok(rows
            .into_iter()
            .map(|r| ClaimedJob {
                id: r.id,
                newsletter_id: r.newsletter_id,
                member_id: r.member_id,
                email: r.email,
                first_name: r.first_name,
                surname: r.surname,
                salutation: r.salutation,
            })
            .collect())
    }

    async fn mark_result(&self, job_id: i64, result: SendResult) -> Result<(), AppError> {
        if !result.is_terminal() {
            return Err(AppError::invalid_transition(
                "Jobs can only be marked with a terminal result",
                json!({ "job_id": job_id, "to": result.as_str() }),
            ));
        }

        let updated = sqlx::query(
            r#"
            UPDATE send_queue
            SET result = $2, resolved_at = NOW()
            WHERE id = $1 AND result IN ('pending', 'claimed')
            "#,
        )
        .bind(job_id)
        .bind(result.as_str())
        .execute(self.pool.as_ref())
        .await?;

        if updated.rows_affected() == 1 {
            return Ok(());
        }

        // Distinguish "no such job" from "already terminal".
        let current: Option<String> =
            sqlx::query_scalar("SELECT result FROM send_queue WHERE id = $1")
                .bind(job_id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        match current {
            None => Err(AppError::not_found(
                "Send job not found",
                json!({ "job_id": job_id }),
            )),
            Some(from) => Err(AppError::invalid_transition(
                "Send job already resolved",
                json!({ "job_id": job_id, "from": from, "to": result.as_str() }),
            )),
        }
    }

    async fn restart_failed(
        &self,
        newsletter_id: i64,
        include_bounced: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE send_queue
            SET result = 'pending', claimed_at = NULL, resolved_at = NULL
            WHERE newsletter_id = $1
              AND (result = 'failed'
                   OR result = 'claimed'
                   OR (result = 'bounced' AND $2))
            "#,
        )
        .bind(newsletter_id)
        .bind(include_bounced)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn release_stale_claims(&self, lease: Duration) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE send_queue
            SET result = 'pending', claimed_at = NULL
            WHERE result = 'claimed'
              AND claimed_at < NOW() - make_interval(secs => $1)
            "#,
        )
        .bind(lease.as_secs_f64())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn counts(&self, newsletter_id: i64) -> Result<QueueCounts, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT result, COUNT(*)
            FROM send_queue
            WHERE newsletter_id = $1
            GROUP BY result
            "#,
        )
        .bind(newsletter_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut counts = QueueCounts::default();
        for (result, count) in rows {
            match SendResult::parse(&result) {
                Some(SendResult::Pending) => counts.pending = count,
                Some(SendResult::Claimed) => counts.claimed = count,
                Some(SendResult::Sent) => counts.sent = count,
                Some(SendResult::Failed) => counts.failed = count,
                Some(SendResult::Bounced) => counts.bounced = count,
                None => {
                    return Err(AppError::internal(
                        "Unknown job result in send_queue",
                        json!({ "newsletter_id": newsletter_id, "result": result }),
                    ))
                }
            }
        }

        Ok(counts)
    }
}
