//! Tracked link entity for per-newsletter click analytics.

use crate::utils::token::generate_hash;

/// A rewritten outbound link from a newsletter body.
///
/// `hash` is the stable tracking token; `visits` is a monotonic counter
/// incremented by the external click-redirect collaborator.
#[derive(Debug, Clone)]
pub struct TrackedLink {
    pub id: i64,
    pub newsletter_id: i64,
    pub original: String,
    pub hash: String,
    pub visits: i64,
}

impl TrackedLink {
    /// Path component the tracking redirect serves this link under.
    pub fn tracking_path(&self) -> String {
        format!("l/{}", self.hash)
    }
}

/// Input data for creating a tracked link.
///
/// The hash is generated once here, at construction time, so it exists
/// before the row is ever written and stays stable thereafter.
#[derive(Debug, Clone)]
pub struct NewTrackedLink {
    pub newsletter_id: i64,
    pub original: String,
    pub hash: String,
}

impl NewTrackedLink {
    pub fn new(newsletter_id: i64, original: impl Into<String>) -> Self {
        Self {
            newsletter_id,
            original: original.into(),
            hash: generate_hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_generated_at_construction() {
        let link = NewTrackedLink::new(1, "https://example.com/article");
        assert!(!link.hash.is_empty());
        assert_eq!(link.original, "https://example.com/article");
    }

    #[test]
    fn test_hashes_are_unique_per_link() {
        let a = NewTrackedLink::new(1, "https://example.com");
        let b = NewTrackedLink::new(1, "https://example.com");
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_tracking_path_shape() {
        let link = TrackedLink {
            id: 1,
            newsletter_id: 2,
            original: "https://example.com".to_string(),
            hash: "abc123".to_string(),
            visits: 0,
        };
        assert_eq!(link.tracking_path(), "l/abc123");
    }
}
