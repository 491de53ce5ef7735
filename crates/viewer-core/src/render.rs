//! Contract for the external document renderers and mime-type routing.
//!
//! Renderers are opaque to the overlay: they produce a surface and, once the
//! content is loaded, report its intrinsic dimensions.

use crate::viewport::ContentMetrics;
use doc_model::ContentKind;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub content: &'a [u8],
    pub mime_type: &'a str,
    pub page: u32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderSurface {
    /// Content is on screen. Metrics are `None` until the renderer has loaded
    /// enough to know them.
    Frame { metrics: Option<ContentMetrics> },
    /// No renderer handles this mime type; annotations still draw over it.
    Placeholder { mime_type: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("renderer error: {0}")]
    Backend(String),
}

pub trait DocumentRenderer {
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<RenderSurface, RenderError>;
}

/// Routes documents to the renderer registered for their content kind.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<ContentKind, Box<dyn DocumentRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ContentKind, renderer: Box<dyn DocumentRenderer>) {
        self.renderers.insert(kind, renderer);
    }

    pub fn supports(&self, mime_type: &str) -> bool {
        self.renderers.contains_key(&ContentKind::from_mime(mime_type))
    }

    pub fn render(&mut self, request: &RenderRequest<'_>) -> Result<RenderSurface, RenderError> {
        let kind = ContentKind::from_mime(request.mime_type);
        match self.renderers.get_mut(&kind) {
            Some(renderer) => renderer.render(request),
            None => {
                tracing::warn!(mime_type = request.mime_type, "no renderer for content type");
                Ok(RenderSurface::Placeholder { mime_type: request.mime_type.to_owned() })
            }
        }
    }
}
