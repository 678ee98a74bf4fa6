//! Template rendering collaborator.
//!
//! The queue core hands the renderer a template name and a
//! recipient-substituted context; what the markup looks like is the
//! renderer's business.

use crate::domain::entities::ClaimedJob;
use crate::error::AppError;

/// Name of the built-in template used when a newsletter has none configured
/// or names one the renderer does not know.
pub const SIMPLE_TEMPLATE: &str = "simple_newsletter";

/// Recipient-substituted data handed to the renderer for one job.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub subject: String,
    /// Newsletter body HTML, links already rewritten to tracked URLs.
    pub body: String,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub salutation: String,
}

impl RenderContext {
    /// Builds the context for one claimed job.
    ///
    /// Missing recipient fields render as empty strings except the
    /// salutation, which falls back to a neutral greeting.
    pub fn for_recipient(subject: &str, body: &str, job: &ClaimedJob) -> Self {
        Self {
            subject: subject.to_string(),
            body: body.to_string(),
            first_name: job.first_name.clone().unwrap_or_default(),
            surname: job.surname.clone().unwrap_or_default(),
            email: job.email.clone(),
            salutation: job
                .salutation
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Hi".to_string()),
        }
    }
}

/// Renders a newsletter body for a specific recipient.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Renders `ctx` with the named template.
    ///
    /// Unknown template names fall back to [`SIMPLE_TEMPLATE`] rather than
    /// failing; a render failure is per-recipient and never aborts a batch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if rendering fails.
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(salutation: Option<&str>) -> ClaimedJob {
        ClaimedJob {
            id: 1,
            newsletter_id: 1,
            member_id: 2,
            email: "ada@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            surname: None,
            salutation: salutation.map(str::to_string),
        }
    }

    #[test]
    fn test_context_substitutes_recipient_fields() {
        let ctx = RenderContext::for_recipient("Subject", "<p>Body</p>", &job(Some("Dear Ada")));
        assert_eq!(ctx.first_name, "Ada");
        assert_eq!(ctx.surname, "");
        assert_eq!(ctx.email, "ada@example.com");
        assert_eq!(ctx.salutation, "Dear Ada");
    }

    #[test]
    fn test_salutation_falls_back_when_missing() {
        assert_eq!(
            RenderContext::for_recipient("S", "B", &job(None)).salutation,
            "Hi"
        );
        assert_eq!(
            RenderContext::for_recipient("S", "B", &job(Some(""))).salutation,
            "Hi"
        );
    }
}
