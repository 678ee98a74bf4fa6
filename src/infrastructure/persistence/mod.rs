//! PostgreSQL repository implementations.

pub mod pg_mailing_list_repository;
pub mod pg_newsletter_repository;
pub mod pg_queue_repository;
pub mod pg_tracked_link_repository;

pub use pg_mailing_list_repository::PgMailingListRepository;
pub use pg_newsletter_repository::PgNewsletterRepository;
pub use pg_queue_repository::PgQueueRepository;
pub use pg_tracked_link_repository::PgTrackedLinkRepository;
