//! API route configuration.

use crate::api::handlers::{
    archive_handler, progress_handler, restart_queue_handler, send_newsletter_handler,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Admin API routes.
///
/// # Endpoints
///
/// - `POST /newsletters/{id}/send`     - Resolve recipients, enqueue jobs, schedule processing
/// - `POST /newsletters/{id}/restart`  - Restart queue processing (re-open failed jobs)
/// - `GET  /newsletters/{id}/progress` - Derived status and per-result job counts
/// - `POST /newsletters/{id}/archive`  - Archive a newsletter (rejected while sending)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/newsletters/{id}/send", post(send_newsletter_handler))
        .route("/newsletters/{id}/restart", post(restart_queue_handler))
        .route("/newsletters/{id}/progress", get(progress_handler))
        .route("/newsletters/{id}/archive", post(archive_handler))
}
