//! HTTP request handlers.

pub mod health;
pub mod newsletters;

pub use health::health_handler;
pub use newsletters::{
    archive_handler, progress_handler, restart_queue_handler, send_newsletter_handler,
};
