//! Mail delivery collaborator.
//!
//! SMTP itself is out of scope; the queue core only cares about the
//! synchronous accept/reject outcome. Asynchronous bounces arrive out of
//! band through whatever channel operates the bounce handler and are
//! recorded as `Bounced` against the job.

use crate::error::AppError;
use async_trait::async_trait;

/// A fully rendered message ready for handoff.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub reply_to: Option<String>,
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

/// Synchronous verdict of the delivery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Accepted,
    Rejected { reason: String },
}

/// Hands rendered messages to the outbound mail system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Attempts delivery of one message.
    ///
    /// A rejection is an ordinary outcome, not an error; errors are reserved
    /// for the collaborator itself being unreachable. Either way the caller
    /// records the job as Failed and the batch continues.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the collaborator cannot be reached.
    async fn deliver(&self, email: &OutgoingEmail) -> Result<DeliveryOutcome, AppError>;
}
