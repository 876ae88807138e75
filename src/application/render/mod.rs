//! Markdown rendering pipeline: comrak parse, heading collection, HTML
//! formatting, ammonia sanitisation, anchor stamping.
//!
//! The heading collection stage is one of the two call sites that share the
//! anchor slug algorithm; the other is the raw-source outline scan in
//! [`crate::domain::outline`]. Their outputs agree for every heading both
//! traversals can see, which is what keeps a reader's table of contents
//! pointing at real anchors.

mod anchors;
pub(crate) mod config;
mod rewrite;

use std::sync::Arc;

use comrak::{Arena, format_html, parse_document};
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::domain::outline::HeadingRecord;

use anchors::apply_heading_ids;
use config::{build_sanitizer, default_options};
use rewrite::collect_headings;

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
    #[error("document processing failed: {message}")]
    Document { message: String },
}

/// Deterministic rendering result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// Sanitised HTML with heading ids applied.
    pub html: String,
    /// Headings in document order, as seen by the tree walk (levels 1-6).
    pub headings: Vec<HeadingRecord>,
}

/// Comrak-based rendering pipeline with ammonia sanitisation.
pub struct MarkdownRenderService {
    options: comrak::Options<'static>,
    sanitizer: ammonia::Builder<'static>,
}

impl MarkdownRenderService {
    fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }

    /// Render a markdown body into sanitised HTML with heading anchors.
    pub fn render(&self, markdown: &str) -> Result<RenderOutput, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let headings = collect_headings(root);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        let sanitized = self.sanitizer.clean(&html).to_string();
        let html = if headings.is_empty() {
            sanitized
        } else {
            apply_heading_ids(&sanitized, &headings)?
        };

        Ok(RenderOutput { html, headings })
    }
}

impl Default for MarkdownRenderService {
    fn default() -> Self {
        Self::new()
    }
}

static RENDER_SERVICE: Lazy<Arc<MarkdownRenderService>> =
    Lazy::new(|| Arc::new(MarkdownRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<MarkdownRenderService> {
    Arc::clone(&RENDER_SERVICE)
}
