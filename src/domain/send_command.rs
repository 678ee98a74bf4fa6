//! Send command for asynchronous queue processing.

/// A request to drain one newsletter's send queue.
///
/// Handlers push commands onto a channel so the HTTP response never waits on
/// delivery; the background send worker picks them up and runs batches until
/// no claimable job remains.
///
/// # Usage Flow
///
/// 1. Created by the send/restart admin handlers after enqueue or restart
/// 2. Sent to the channel (non-blocking)
/// 3. Processed by [`crate::domain::send_worker::run_send_worker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendCommand {
    pub newsletter_id: i64,
}

impl SendCommand {
    pub fn new(newsletter_id: i64) -> Self {
        Self { newsletter_id }
    }
}
