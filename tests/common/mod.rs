#![allow(dead_code)]

use std::sync::Arc;

use newsletter_queue::domain::send_command::SendCommand;
use newsletter_queue::state::AppState;
use sqlx::PgPool;
use tokio::sync::mpsc;

pub async fn create_newsletter(pool: &PgPool, subject: &str, status: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO newsletters (subject, content, status, send_from)
        VALUES ($1, '<p>Hello <a href="https://example.com/news">world</a></p>', $2, 'news@example.com')
        RETURNING id
        "#,
    )
    .bind(subject)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_archived_newsletter(pool: &PgPool, subject: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO newsletters (subject, content, status, send_from, archived)
        VALUES ($1, '<p>Hello</p>', 'draft', 'news@example.com', TRUE)
        RETURNING id
        "#,
    )
    .bind(subject)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_mailing_list(pool: &PgPool, title: &str, disabled: bool) -> i64 {
    sqlx::query_scalar("INSERT INTO mailing_lists (title, disabled) VALUES ($1, $2) RETURNING id")
        .bind(title)
        .bind(disabled)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_member(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO members (email, first_name, surname, salutation)
        VALUES ($1, 'Test', 'Member', 'Dear')
        RETURNING id
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn add_member_to_list(pool: &PgPool, list_id: i64, member_id: i64) {
    sqlx::query("INSERT INTO mailing_list_members (list_id, member_id) VALUES ($1, $2)")
        .bind(list_id)
        .bind(member_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn attach_list(pool: &PgPool, newsletter_id: i64, list_id: i64) {
    sqlx::query("INSERT INTO newsletter_mailing_lists (newsletter_id, list_id) VALUES ($1, $2)")
        .bind(newsletter_id)
        .bind(list_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn create_job(pool: &PgPool, newsletter_id: i64, member_id: i64, result: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO send_queue (newsletter_id, member_id, result)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(newsletter_id)
    .bind(member_id)
    .bind(result)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn job_result(pool: &PgPool, job_id: i64) -> String {
    sqlx::query_scalar("SELECT result FROM send_queue WHERE id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn job_count(pool: &PgPool, newsletter_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM send_queue WHERE newsletter_id = $1")
        .bind(newsletter_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn newsletter_status(pool: &PgPool, newsletter_id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM newsletters WHERE id = $1")
        .bind(newsletter_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Builds an `AppState` over the test pool.
///
/// The send-command receiver is returned instead of being wired to a worker,
/// so tests can assert what got scheduled without background processing
/// racing them.
pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<SendCommand>) {
    let (send_tx, send_rx) = mpsc::channel(16);
    let state = AppState::new(
        Arc::new(pool),
        send_tx,
        "https://news.example.com",
        50,
        false,
    );
    (state, send_rx)
}
