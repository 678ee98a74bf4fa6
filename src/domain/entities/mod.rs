//! Core business entities.

pub mod mailing_list;
pub mod newsletter;
pub mod send_job;
pub mod tracked_link;

pub use mailing_list::MailingList;
pub use newsletter::{Newsletter, NewsletterStatus};
pub use send_job::{BatchOutcome, ClaimedJob, QueueCounts, SendResult};
pub use tracked_link::{NewTrackedLink, TrackedLink};
