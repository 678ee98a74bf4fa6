//! Delivery collaborator implementations.

use async_trait::async_trait;

use crate::domain::delivery::{DeliveryOutcome, DeliveryService, OutgoingEmail};
use crate::error::AppError;

/// Delivery stub that logs each message and reports it accepted.
///
/// Stands in for the real outbound mail system in development and tests;
/// the queue core only ever sees the trait.
pub struct LogDelivery;

impl LogDelivery {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryService for LogDelivery {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<DeliveryOutcome, AppError> {
        tracing::info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            bytes = email.body_html.len(),
            "Delivery (log stub)"
        );

        Ok(DeliveryOutcome::Accepted)
    }
}
