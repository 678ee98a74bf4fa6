//! Handlers for the newsletter send-queue admin operations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::progress::ProgressResponse;
use crate::api::dto::send::{RestartResponse, SendResponse};
use crate::domain::send_command::SendCommand;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves recipients, enqueues send jobs and schedules processing.
///
/// # Endpoint
///
/// `POST /api/newsletters/{id}/send`
///
/// # Response
///
/// `202 Accepted` with the number of newly queued jobs. Calling this again
/// enqueues nothing new (idempotent) but still nudges the worker, which is
/// how an interrupted run resumes.
///
/// # Errors
///
/// Returns 404 for an unknown newsletter, 409 for an archived one.
pub async fn send_newsletter_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<SendResponse>), AppError> {
    let queued = state.queue_service.start_sending(id).await?;

    let scheduled = schedule(&state, id);

    Ok((
        StatusCode::ACCEPTED,
        Json(SendResponse { queued, scheduled }),
    ))
}

/// Admin "Restart Queue Processing" action.
///
/// # Endpoint
///
/// `POST /api/newsletters/{id}/restart`
///
/// Re-opens failed (and configured bounced) jobs, then schedules processing.
///
/// # Errors
///
/// Returns 404 for an unknown newsletter.
pub async fn restart_queue_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RestartResponse>), AppError> {
    let reset = state.queue_service.restart(id).await?;

    let scheduled = schedule(&state, id);

    Ok((
        StatusCode::ACCEPTED,
        Json(RestartResponse { reset, scheduled }),
    ))
}

/// Per-result job counts and the status derived from them.
///
/// # Endpoint
///
/// `GET /api/newsletters/{id}/progress`
///
/// # Errors
///
/// Returns 404 for an unknown newsletter.
pub async fn progress_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProgressResponse>, AppError> {
    let progress = state.queue_service.progress(id).await?;
    Ok(Json(ProgressResponse::from(progress)))
}

/// Archives a newsletter.
///
/// # Endpoint
///
/// `POST /api/newsletters/{id}/archive`
///
/// # Errors
///
/// Returns 409 while the newsletter is sending, 404 if unknown.
pub async fn archive_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.queue_service.archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hands a drain request to the background worker without blocking the
/// response. A full channel is not an error: pending jobs stay claimable
/// and the next send or restart picks them up.
fn schedule(state: &AppState, newsletter_id: i64) -> bool {
    match state.send_tx.try_send(SendCommand::new(newsletter_id)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(newsletter_id, error = %e, "Send queue channel full");
            false
        }
    }
}
