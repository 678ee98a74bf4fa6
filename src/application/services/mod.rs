//! Business logic services.

pub mod link_service;
pub mod processor;
pub mod queue_service;
pub mod resolver;

pub use link_service::LinkService;
pub use processor::QueueProcessor;
pub use queue_service::{QueueProgress, QueueService};
pub use resolver::RecipientResolver;
