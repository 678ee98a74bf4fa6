//! Tracked-link rewriting and visit counting.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use url::{Origin, Url};

use crate::domain::entities::NewTrackedLink;
use crate::domain::repositories::TrackedLinkRepository;
use crate::error::AppError;

/// Rewrites outbound links in newsletter bodies to hashed tracking URLs and
/// records visits reported by the redirect collaborator.
pub struct LinkService<L: TrackedLinkRepository> {
    links: Arc<L>,
    tracking_base_url: String,
    tracking_origin: Option<Origin>,
    href_re: Regex,
}

impl<L: TrackedLinkRepository> LinkService<L> {
    /// Creates a new link service.
    ///
    /// `tracking_base_url` is the public origin the redirect collaborator
    /// serves, e.g. `https://news.example.com`.
    pub fn new(links: Arc<L>, tracking_base_url: impl Into<String>) -> Self {
        let tracking_base_url = tracking_base_url.into().trim_end_matches('/').to_string();
        let tracking_origin = Url::parse(&tracking_base_url).ok().map(|u| u.origin());

        Self {
            links,
            tracking_base_url,
            tracking_origin,
            // href attributes with double or single quotes
            href_re: Regex::new(r#"href=["']([^"']+)["']"#).expect("static regex"),
        }
    }

    /// Replaces every absolute http(s) link in `html` with its stable
    /// tracked URL, creating tracked-link rows on first sight.
    ///
    /// Idempotent per newsletter: the same original URL always maps to the
    /// same hash, and links already pointing at the tracking origin are left
    /// alone. Relative links, anchors and mailto links are not rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn rewrite_links(
        &self,
        newsletter_id: i64,
        html: &str,
    ) -> Result<String, AppError> {
        let mut order = Vec::new();
        for caps in self.href_re.captures_iter(html) {
            let href = &caps[1];
            if self.is_trackable(href) && !order.iter().any(|u| u == href) {
                order.push(href.to_string());
            }
        }

        if order.is_empty() {
            return Ok(html.to_string());
        }

        let mut replacements: HashMap<String, String> = HashMap::new();
        for original in order {
            let link = self
                .links
                .find_or_create(NewTrackedLink::new(newsletter_id, original.clone()))
                .await?;
            replacements.insert(
                original,
                format!("{}/{}", self.tracking_base_url, link.tracking_path()),
            );
        }

        let rewritten = self.href_re.replace_all(html, |caps: &regex::Captures| {
            match replacements.get(&caps[1]) {
                Some(tracked) => format!(r#"href="{tracked}""#),
                None => caps[0].to_string(),
            }
        });

        Ok(rewritten.into_owned())
    }

    /// Records one visit for a tracking hash and returns the original URL
    /// the redirect collaborator should send the visitor to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown hash.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn record_visit(&self, hash: &str) -> Result<String, AppError> {
        match self.links.record_visit(hash).await? {
            Some(original) => {
                metrics::counter!("newsletter_link_visits_total").increment(1);
                Ok(original)
            }
            None => Err(AppError::not_found(
                "Tracked link not found",
                serde_json::json!({ "hash": hash }),
            )),
        }
    }

    fn is_trackable(&self, href: &str) -> bool {
        let Ok(parsed) = Url::parse(href) else {
            // relative path or anchor
            return false;
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        // Origin comparison, not a string prefix check: a hostname that
        // merely starts with the tracking host belongs to someone else.
        match &self.tracking_origin {
            Some(origin) => parsed.origin() != *origin,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TrackedLink;
    use crate::domain::repositories::MockTrackedLinkRepository;

    fn tracked(candidate: NewTrackedLink, hash: &str) -> TrackedLink {
        TrackedLink {
            id: 1,
            newsletter_id: candidate.newsletter_id,
            original: candidate.original,
            hash: hash.to_string(),
            visits: 0,
        }
    }

    #[tokio::test]
    async fn test_rewrites_absolute_links() {
        let mut mock_repo = MockTrackedLinkRepository::new();
        mock_repo
            .expect_find_or_create()
            .withf(|c| c.original == "https://example.com/article")
            .times(1)
            .returning(|c| Ok(tracked(c, "h1")));

        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com/");
        let html = r#"<p>Read <a href="https://example.com/article">this</a></p>"#;

        let rewritten = service.rewrite_links(5, html).await.unwrap();
        assert_eq!(
            rewritten,
            r#"<p>Read <a href="https://news.example.com/l/h1">this</a></p>"#
        );
    }

    #[tokio::test]
    async fn test_repeated_url_creates_one_link() {
        let mut mock_repo = MockTrackedLinkRepository::new();
        mock_repo
            .expect_find_or_create()
            .times(1)
            .returning(|c| Ok(tracked(c, "h1")));

        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com");
        let html = r##"<a href="https://example.com">a</a><a href="https://example.com">b</a>"##;

        let rewritten = service.rewrite_links(5, html).await.unwrap();
        assert_eq!(rewritten.matches("/l/h1").count(), 2);
    }

    #[tokio::test]
    async fn test_leaves_relative_mailto_and_anchor_links() {
        let mock_repo = MockTrackedLinkRepository::new();
        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com");

        let html = r##"<a href="/local">l</a><a href="mailto:a@b.com">m</a><a href="#top">t</a>"##;
        let rewritten = service.rewrite_links(5, html).await.unwrap();
        assert_eq!(rewritten, html);
    }

    #[tokio::test]
    async fn test_already_tracked_links_not_rewritten_again() {
        let mock_repo = MockTrackedLinkRepository::new();
        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com");

        let html = r#"<a href="https://news.example.com/l/abc">x</a>"#;
        let rewritten = service.rewrite_links(5, html).await.unwrap();
        assert_eq!(rewritten, html);
    }

    #[tokio::test]
    async fn test_lookalike_tracking_host_is_rewritten() {
        let mut mock_repo = MockTrackedLinkRepository::new();
        mock_repo
            .expect_find_or_create()
            .withf(|c| c.original == "https://news.example.com.evil.test/x")
            .times(1)
            .returning(|c| Ok(tracked(c, "h9")));

        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com");
        let html = r#"<a href="https://news.example.com.evil.test/x">x</a>"#;

        let rewritten = service.rewrite_links(5, html).await.unwrap();
        assert_eq!(rewritten, r#"<a href="https://news.example.com/l/h9">x</a>"#);
    }

    #[tokio::test]
    async fn test_record_visit_returns_original() {
        let mut mock_repo = MockTrackedLinkRepository::new();
        mock_repo
            .expect_record_visit()
            .withf(|h| h == "abc")
            .times(1)
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com");
        let original = service.record_visit("abc").await.unwrap();
        assert_eq!(original, "https://example.com");
    }

    #[tokio::test]
    async fn test_record_visit_unknown_hash() {
        let mut mock_repo = MockTrackedLinkRepository::new();
        mock_repo.expect_record_visit().returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo), "https://news.example.com");
        let result = service.record_visit("nope").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }
}
