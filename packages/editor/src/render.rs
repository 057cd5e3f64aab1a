//! Static markup rendering seam.
//!
//! Rendering a document to HTML lives outside the editor core. The core only
//! asks for previews when exporting, and a failing renderer must never fail
//! the surrounding export or save.

use mailblocks_model::Document;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
#[error("Render failed: {message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Renders the subtree at `root_id` to static markup
pub trait Renderer {
    fn render(&self, document: &Document, root_id: &str) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Document, &str) -> Result<String, RenderError>,
{
    fn render(&self, document: &Document, root_id: &str) -> Result<String, RenderError> {
        self(document, root_id)
    }
}

/// Render a preview, degrading to `None` on failure
pub fn render_preview(renderer: &dyn Renderer, document: &Document, root_id: &str) -> Option<String> {
    match renderer.render(document, root_id) {
        Ok(markup) => Some(markup),
        Err(e) => {
            warn!(error = %e, root_id, "Preview rendering failed - continuing without preview");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_render_is_kept() {
        let renderer = |_: &Document, root: &str| -> Result<String, RenderError> {
            Ok(format!("<div id=\"{}\"></div>", root))
        };
        let doc = Document::new("EmailLayout");
        assert_eq!(
            render_preview(&renderer, &doc, "root"),
            Some("<div id=\"root\"></div>".to_string())
        );
    }

    #[test]
    fn test_failed_render_degrades_to_none() {
        let renderer = |_: &Document, _: &str| -> Result<String, RenderError> {
            Err(RenderError::new("unknown block type"))
        };
        let doc = Document::new("EmailLayout");
        assert_eq!(render_preview(&renderer, &doc, "root"), None);
    }
}
