use serde::Serialize;

/// Response for `POST /api/newsletters/{id}/send`.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// Jobs newly enqueued by this request.
    pub queued: u64,
    /// Whether background processing was scheduled.
    pub scheduled: bool,
}

/// Response for `POST /api/newsletters/{id}/restart`.
#[derive(Debug, Serialize)]
pub struct RestartResponse {
    /// Jobs re-opened to pending by this request.
    pub reset: u64,
    pub scheduled: bool,
}
