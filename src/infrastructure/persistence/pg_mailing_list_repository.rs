//! PostgreSQL implementation of mailing-list membership lookups.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::MailingList;
use crate::domain::repositories::MailingListRepository;
use crate::error::AppError;

/// PostgreSQL repository for mailing-list membership.
pub struct PgMailingListRepository {
    pool: Arc<PgPool>,
}

impl PgMailingListRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MailingListRow {
    id: i64,
    title: String,
    disabled: bool,
}

#[async_trait]
impl MailingListRepository for PgMailingListRepository {
    async fn lists_for_newsletter(
        &self,
        newsletter_id: i64,
    ) -> Result<Vec<MailingList>, AppError> {
        let rows = sqlx::query_as::<_, MailingListRow>(
            r#"
            SELECT ml.id, ml.title, ml.disabled
            FROM newsletter_mailing_lists nml
            JOIN mailing_lists ml ON ml.id = nml.list_id
            WHERE nml.newsletter_id = $1
            ORDER BY ml.id
            "#,
        )
        .bind(newsletter_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| MailingList {
                id: r.id,
                title: r.title,
                disabled: r.disabled,
            })
            .collect())
    }

    async fn eligible_member_ids(&self, newsletter_id: i64) -> Result<Vec<i64>, AppError> {
        // Union across enabled lists minus already-queued members, computed
        // store-side so membership is never loaded wholesale.
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT mlm.member_id
            FROM newsletter_mailing_lists nml
            JOIN mailing_lists ml ON ml.id = nml.list_id AND NOT ml.disabled
            JOIN mailing_list_members mlm ON mlm.list_id = nml.list_id
            WHERE nml.newsletter_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM send_queue q
                  WHERE q.newsletter_id = $1 AND q.member_id = mlm.member_id
              )
            ORDER BY mlm.member_id
            "#,
        )
        .bind(newsletter_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }
}
