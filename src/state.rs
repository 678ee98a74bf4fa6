//! Shared application state for axum handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{LinkService, QueueProcessor, QueueService};
use crate::domain::send_command::SendCommand;
use crate::infrastructure::delivery::LogDelivery;
use crate::infrastructure::persistence::{
    PgMailingListRepository, PgNewsletterRepository, PgQueueRepository, PgTrackedLinkRepository,
};
use crate::infrastructure::rendering::AskamaRenderer;

/// The queue service over the Postgres repositories.
pub type AppQueueService =
    QueueService<PgQueueRepository, PgNewsletterRepository, PgMailingListRepository>;

/// The queue processor over the Postgres repositories.
pub type AppProcessor =
    QueueProcessor<PgQueueRepository, PgNewsletterRepository, PgTrackedLinkRepository>;

/// The link service over the Postgres tracked-link repository.
pub type AppLinkService = LinkService<PgTrackedLinkRepository>;

#[derive(Clone)]
pub struct AppState {
    pub queue_service: Arc<AppQueueService>,
    pub processor: Arc<AppProcessor>,
    /// Shared with the processor; also the seam an embedding redirect
    /// service records link visits through.
    pub link_service: Arc<AppLinkService>,
    pub send_tx: mpsc::Sender<SendCommand>,
}

impl AppState {
    /// Wires repositories, services and collaborators over one pool.
    ///
    /// The delivery collaborator is the logging stub; swapping in a real
    /// mail system only touches this constructor.
    pub fn new(
        pool: Arc<PgPool>,
        send_tx: mpsc::Sender<SendCommand>,
        tracking_base_url: &str,
        send_batch_size: i64,
        restart_includes_bounced: bool,
    ) -> Self {
        let queue_repository = Arc::new(PgQueueRepository::new(pool.clone()));
        let newsletter_repository = Arc::new(PgNewsletterRepository::new(pool.clone()));
        let mailing_list_repository = Arc::new(PgMailingListRepository::new(pool.clone()));
        let tracked_link_repository = Arc::new(PgTrackedLinkRepository::new(pool));

        let link_service = Arc::new(LinkService::new(
            tracked_link_repository,
            tracking_base_url,
        ));

        let queue_service = Arc::new(QueueService::new(
            queue_repository.clone(),
            newsletter_repository.clone(),
            mailing_list_repository,
            restart_includes_bounced,
        ));

        let processor = Arc::new(QueueProcessor::new(
            queue_repository,
            newsletter_repository,
            link_service.clone(),
            Arc::new(AskamaRenderer::new()),
            Arc::new(LogDelivery::new()),
            send_batch_size,
        ));

        Self {
            queue_service,
            processor,
            link_service,
            send_tx,
        }
    }
}
