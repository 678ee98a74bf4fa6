//! PostgreSQL implementation of newsletter storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::domain::entities::{Newsletter, NewsletterStatus};
use crate::domain::repositories::NewsletterRepository;
use crate::error::AppError;

/// PostgreSQL repository for newsletter metadata.
pub struct PgNewsletterRepository {
    pool: Arc<PgPool>,
}

impl PgNewsletterRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NewsletterRow {
    id: i64,
    subject: String,
    content: String,
    status: String,
    sent_date: Option<DateTime<Utc>>,
    send_from: String,
    reply_to: Option<String>,
    as_template: bool,
    archived: bool,
    render_template: Option<String>,
    created_at: DateTime<Utc>,
}

impl NewsletterRow {
    fn into_entity(self) -> Result<Newsletter, AppError> {
        let status = NewsletterStatus::parse(&self.status).ok_or_else(|| {
            AppError::internal(
                "Unknown newsletter status",
                json!({ "newsletter_id": self.id, "status": self.status }),
            )
        })?;

        Ok(Newsletter {
            id: self.id,
            subject: self.subject,
            content: self.content,
            status,
            sent_date: self.sent_date,
            send_from: self.send_from,
            reply_to: self.reply_to,
            as_template: self.as_template,
            archived: self.archived,
            render_template: self.render_template,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl NewsletterRepository for PgNewsletterRepository {
    async fn find(&self, id: i64) -> Result<Option<Newsletter>, AppError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, subject, content, status, sent_date, send_from, reply_to,
                   as_template, archived, render_template, created_at
            FROM newsletters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(NewsletterRow::into_entity).transpose()
    }

    async fn set_status(&self, id: i64, status: NewsletterStatus) -> Result<(), AppError> {
        // sent_date is stamped the first time the newsletter completes and
        // kept through any later restart.
        sqlx::query(
            r#"
            UPDATE newsletters
            SET status = $2,
                sent_date = CASE
                    WHEN $2 = 'sent' THEN COALESCE(sent_date, NOW())
                    ELSE sent_date
                END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn set_archived(&self, id: i64, archived: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE newsletters SET archived = $2 WHERE id = $1")
            .bind(id)
            .bind(archived)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
