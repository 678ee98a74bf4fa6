//! Send-queue job entity and per-result aggregate counts.

use super::newsletter::NewsletterStatus;

/// Outcome state of a send-queue job.
///
/// `Pending` and `Claimed` are in-flight; `Sent`, `Failed` and `Bounced` are
/// terminal and immutable except via the explicit restart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendResult {
    Pending,
    /// Atomically taken by a processor; prevents duplicate concurrent
    /// delivery for the same (newsletter, member) pair.
    Claimed,
    Sent,
    Failed,
    Bounced,
}

impl SendResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Bounced => "bounced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "claimed" => Some(Self::Claimed),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            "bounced" => Some(Self::Bounced),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed | Self::Bounced)
    }
}

/// A job handed to a processor by the atomic claim, with the recipient
/// fields denormalized from `members` so delivery needs no further lookups.
///
/// At most one job exists per (newsletter, member) pair, enforced by a
/// unique constraint, which is what makes enqueue idempotent.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub id: i64,
    pub newsletter_id: i64,
    pub member_id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub salutation: Option<String>,
}

/// Per-result job totals for one newsletter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub pending: i64,
    pub claimed: i64,
    pub sent: i64,
    pub failed: i64,
    pub bounced: i64,
}

impl QueueCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.claimed + self.sent + self.failed + self.bounced
    }

    pub fn in_flight(&self) -> i64 {
        self.pending + self.claimed
    }

    /// Derives the newsletter status from the queue's aggregate state.
    ///
    /// No jobs at all means the newsletter never started sending; any
    /// in-flight job means it is still sending; otherwise every job has
    /// reached a terminal state and the newsletter counts as sent.
    pub fn derived_status(&self) -> NewsletterStatus {
        if self.total() == 0 {
            NewsletterStatus::Draft
        } else if self.in_flight() > 0 {
            NewsletterStatus::Sending
        } else {
            NewsletterStatus::Sent
        }
    }
}

/// Aggregate outcome of one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub sent: u64,
    pub failed: u64,
    pub bounced: u64,
}

impl BatchOutcome {
    pub fn processed(&self) -> u64 {
        self.sent + self.failed + self.bounced
    }
}
