//! One open document: viewport, overlay engine and the content handed to
//! the renderer.

use crate::config::EditorConfig;
use crate::engine::OverlayEngine;
use crate::error::OverlayResult;
use crate::overlay::DisplayedElement;
use crate::persistence::SaveOutcome;
use doc_model::{DocumentId, DocumentRecord};
use storage::DocumentStore;
use viewer_core::{
    available_width, RenderError, RenderRequest, RenderSurface, RendererRegistry, ViewportState,
};

/// Everything drawn for the current page.
#[derive(Debug)]
pub struct Frame<'a> {
    /// `None` while no document is open.
    pub surface: Option<RenderSurface>,
    pub elements: Vec<DisplayedElement<'a>>,
}

pub struct EditorSession {
    config: EditorConfig,
    viewport: ViewportState,
    engine: OverlayEngine,
    /// Record of the open document. Its annotation list lives in the engine.
    opened: Option<DocumentRecord>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let engine = OverlayEngine::new(&config);
        Self::with_engine(config, engine)
    }

    pub fn with_engine(config: EditorConfig, engine: OverlayEngine) -> Self {
        let viewport = ViewportState::new(config.scale_bounds());
        Self { config, viewport, engine, opened: None }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    pub fn engine(&self) -> &OverlayEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut OverlayEngine {
        &mut self.engine
    }

    /// Both halves at once, for interaction handlers that read the viewport
    /// while mutating elements.
    pub fn parts_mut(&mut self) -> (&mut OverlayEngine, &ViewportState) {
        (&mut self.engine, &self.viewport)
    }

    pub fn document(&self) -> Option<&DocumentRecord> {
        self.opened.as_ref()
    }

    /// Switch to another document. Unsaved annotation edits of the current
    /// one are discarded. If the load fails nothing changes.
    pub fn open(
        &mut self,
        store: &dyn DocumentStore,
        document_id: &DocumentId,
    ) -> OverlayResult<&DocumentRecord> {
        let mut record = self.engine.load(store, document_id)?;
        record.annotations = None;
        self.viewport.reset();
        tracing::info!(document = %record.id, mime_type = %record.mime_type, "document opened");
        Ok(&*self.opened.insert(record))
    }

    pub fn save(&mut self, store: &mut dyn DocumentStore) -> OverlayResult<SaveOutcome> {
        match self.engine.document_id().cloned() {
            Some(id) => self.engine.save(store, &id),
            None => Ok(SaveOutcome::NoDocument),
        }
    }

    /// Fit the content to a container of `container_width` pixels, leaving
    /// the configured padding.
    pub fn fit_to_width(&mut self, container_width: f32) -> Option<f32> {
        let available = available_width(container_width, self.config.fit_padding);
        self.viewport.fit_to_width(available)
    }

    /// Render the current page and project the overlay on top of it.
    ///
    /// Metrics reported by the renderer are applied before projecting, so a
    /// page clamp caused by a newly known page count takes effect in this
    /// frame. Content without a renderer still gets its overlay.
    pub fn frame(&mut self, renderers: &mut RendererRegistry) -> Result<Frame<'_>, RenderError> {
        let surface = match &self.opened {
            Some(record) => Some(render_current(renderers, record, &mut self.viewport)?),
            None => None,
        };

        Ok(Frame { surface, elements: self.engine.overlay(&self.viewport) })
    }
}

/// A page past the end, picked before the page count was known, is pulled
/// back to the last page and rendered once more.
fn render_current(
    renderers: &mut RendererRegistry,
    record: &DocumentRecord,
    viewport: &mut ViewportState,
) -> Result<RenderSurface, RenderError> {
    let surface = match renderers.render(&request(record, viewport)) {
        Err(RenderError::PageOutOfRange { page, page_count }) => {
            viewport.apply_page_count(page_count);
            if viewport.page() == page {
                return Err(RenderError::PageOutOfRange { page, page_count });
            }
            tracing::warn!(page, page_count, clamped = viewport.page(), "page past the end");
            renderers.render(&request(record, viewport))?
        }
        other => other?,
    };

    if let RenderSurface::Frame { metrics: Some(mut metrics) } = surface.clone() {
        // Single-frame content has exactly one page whatever the renderer says.
        if !record.content_kind().is_paginated() {
            metrics.total_pages = Some(1);
        }
        viewport.apply_metrics(metrics);
    }
    Ok(surface)
}

fn request<'a>(record: &'a DocumentRecord, viewport: &ViewportState) -> RenderRequest<'a> {
    RenderRequest {
        content: &record.content,
        mime_type: &record.mime_type,
        page: viewport.page(),
        scale: viewport.scale(),
    }
}
