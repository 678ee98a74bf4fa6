//! Askama-backed template rendering.

use askama::Template;
use serde_json::json;

use crate::domain::rendering::{RenderContext, TemplateRenderer, SIMPLE_TEMPLATE};
use crate::error::AppError;

/// The built-in newsletter template.
#[derive(Template)]
#[template(path = "simple_newsletter.html")]
struct SimpleNewsletter<'a> {
    subject: &'a str,
    body: &'a str,
    first_name: &'a str,
    surname: &'a str,
    email: &'a str,
    salutation: &'a str,
}

/// Renderer over the compiled-in askama templates.
///
/// Newsletter rows may name templates that no longer ship with the binary;
/// those fall back to the simple template instead of failing every job.
pub struct AskamaRenderer;

impl AskamaRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AskamaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for AskamaRenderer {
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, AppError> {
        if template != SIMPLE_TEMPLATE {
            tracing::debug!(template, "Unknown template, using built-in simple template");
        }

        SimpleNewsletter {
            subject: &ctx.subject,
            body: &ctx.body,
            first_name: &ctx.first_name,
            surname: &ctx.surname,
            email: &ctx.email,
            salutation: &ctx.salutation,
        }
        .render()
        .map_err(|e| {
            AppError::internal(
                "Template rendering failed",
                json!({ "template": template, "reason": e.to_string() }),
            )
        })
    }
}
