//! Mailing list entity.
//!
//! Read-only from the queue core's perspective: membership is maintained by
//! the CMS and only queried here to resolve eligible recipients.

/// A mailing list a newsletter can be addressed to.
///
/// Disabled lists are excluded from recipient resolution entirely.
#[derive(Debug, Clone)]
pub struct MailingList {
    pub id: i64,
    pub title: String,
    pub disabled: bool,
}

