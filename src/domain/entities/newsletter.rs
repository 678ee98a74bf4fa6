//! Newsletter aggregate and its status state machine.

use chrono::{DateTime, Utc};

/// Lifecycle status of a newsletter.
///
/// Transitions are monotonic `Draft -> Sending -> Sent` in the normal flow.
/// The explicit admin restart is the one sanctioned exception: re-opening
/// failed jobs may move a `Sent` newsletter back to `Sending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsletterStatus {
    Draft,
    Sending,
    Sent,
}

impl NewsletterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sending => "sending",
            Self::Sent => "sent",
        }
    }

    /// Parses the database representation.
    ///
    /// Returns `None` for unknown values so repositories can surface a
    /// data-integrity error instead of panicking.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sending" => Some(Self::Sending),
            "sent" => Some(Self::Sent),
            _ => None,
        }
    }
}

/// A single newsletter with send metadata.
///
/// Owns its send-queue jobs and tracked links (cascade delete in the schema);
/// mailing lists are referenced, not owned. `status` is a persisted cache of
/// the queue's aggregate state and must always be reconcilable from the
/// per-result job counts.
#[derive(Debug, Clone)]
pub struct Newsletter {
    pub id: i64,
    pub subject: String,
    pub content: String,
    pub status: NewsletterStatus,
    pub sent_date: Option<DateTime<Utc>>,
    pub send_from: String,
    pub reply_to: Option<String>,
    pub as_template: bool,
    pub archived: bool,
    pub render_template: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Newsletter {
    /// A newsletter that is currently sending cannot be archived.
    pub fn can_archive(&self) -> bool {
        self.status != NewsletterStatus::Sending
    }

    /// Template name to render with, falling back to the built-in simple
    /// template when none is configured.
    pub fn render_template_name(&self) -> &str {
        self.render_template
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(crate::domain::rendering::SIMPLE_TEMPLATE)
    }
}
