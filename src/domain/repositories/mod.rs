//! Repository traits decoupling business logic from persistence.

pub mod mailing_list_repository;
pub mod newsletter_repository;
pub mod queue_repository;
pub mod tracked_link_repository;

pub use mailing_list_repository::MailingListRepository;
pub use newsletter_repository::NewsletterRepository;
pub use queue_repository::QueueRepository;
pub use tracked_link_repository::TrackedLinkRepository;

#[cfg(test)]
pub use mailing_list_repository::MockMailingListRepository;
#[cfg(test)]
pub use newsletter_repository::MockNewsletterRepository;
#[cfg(test)]
pub use queue_repository::MockQueueRepository;
#[cfg(test)]
pub use tracked_link_repository::MockTrackedLinkRepository;
