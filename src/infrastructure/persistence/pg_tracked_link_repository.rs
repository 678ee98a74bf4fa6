//! PostgreSQL implementation of tracked-link storage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use crate::domain::entities::{NewTrackedLink, TrackedLink};
use crate::domain::repositories::TrackedLinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for tracked links.
pub struct PgTrackedLinkRepository {
    pool: Arc<PgPool>,
}

impl PgTrackedLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TrackedLinkRow {
    id: i64,
    newsletter_id: i64,
    original: String,
    hash: String,
    visits: i64,
}

impl From<TrackedLinkRow> for TrackedLink {
    fn from(r: TrackedLinkRow) -> Self {
        Self {
            id: r.id,
            newsletter_id: r.newsletter_id,
            original: r.original,
            hash: r.hash,
            visits: r.visits,
        }
    }
}

#[async_trait]
impl TrackedLinkRepository for PgTrackedLinkRepository {
    async fn find_or_create(&self, candidate: NewTrackedLink) -> Result<TrackedLink, AppError> {
        // Insert-then-select keeps the hash stable: a concurrent or earlier
        // insert wins and the candidate hash is discarded.
        sqlx::query(
            r#"
            INSERT INTO tracked_links (newsletter_id, original, hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (newsletter_id, original) DO NOTHING
            "#,
        )
        .bind(candidate.newsletter_id)
        .bind(&candidate.original)
        .bind(&candidate.hash)
        .execute(self.pool.as_ref())
        .await?;

        let row = sqlx::query_as::<_, TrackedLinkRow>(
            r#"
            SELECT id, newsletter_id, original, hash, visits
            FROM tracked_links
            WHERE newsletter_id = $1 AND original = $2
            "#,
        )
        .bind(candidate.newsletter_id)
        .bind(&candidate.original)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(TrackedLink::from).ok_or_else(|| {
            AppError::internal(
                "Tracked link missing after upsert",
                json!({ "newsletter_id": candidate.newsletter_id, "original": candidate.original }),
            )
        })
    }

    async fn links_for_newsletter(
        &self,
        newsletter_id: i64,
    ) -> Result<Vec<TrackedLink>, AppError> {
        let rows = sqlx::query_as::<_, TrackedLinkRow>(
            r#"
            SELECT id, newsletter_id, original, hash, visits
            FROM tracked_links
            WHERE newsletter_id = $1
            ORDER BY id
            "#,
        )
        .bind(newsletter_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(TrackedLink::from).collect())
    }

    async fn record_visit(&self, hash: &str) -> Result<Option<String>, AppError> {
        let original = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE tracked_links
            SET visits = visits + 1
            WHERE hash = $1
            RETURNING original
            "#,
        )
        .bind(hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(original)
    }
}
