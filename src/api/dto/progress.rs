use serde::Serialize;

use crate::application::services::QueueProgress;

/// Response for `GET /api/newsletters/{id}/progress`.
///
/// `status` is recomputed from the job counts on every request, so it never
/// lags behind the queue.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub status: &'static str,
    pub pending: i64,
    pub claimed: i64,
    pub sent: i64,
    pub failed: i64,
    pub bounced: i64,
    pub total: i64,
}

impl From<QueueProgress> for ProgressResponse {
    fn from(p: QueueProgress) -> Self {
        Self {
            status: p.status.as_str(),
            pending: p.counts.pending,
            claimed: p.counts.claimed,
            sent: p.counts.sent,
            failed: p.counts.failed,
            bounced: p.counts.bounced,
            total: p.counts.total(),
        }
    }
}
