//! End-of-interaction handlers for moving and resizing elements.
//!
//! Drag and resize frameworks report display pixels. Both handlers convert
//! through the inverse of the current scale transform before writing, and
//! the touched element becomes the selection.

use crate::engine::OverlayEngine;
use doc_model::{ElementId, ElementPatch};
use viewer_core::{DisplayPoint, RenderedBox, ViewportState};

impl OverlayEngine {
    /// Commit a finished drag. `dropped_at` is the element's top-left corner
    /// in display pixels.
    pub fn drag_stop(
        &mut self,
        id: ElementId,
        dropped_at: DisplayPoint,
        viewport: &ViewportState,
    ) -> bool {
        let position = viewport.transform().to_stored_point(dropped_at);
        if !self.update_element(id, &ElementPatch::position(position)) {
            return false;
        }
        self.select(Some(id));
        tracing::debug!(%id, x = position.x, y = position.y, "drag committed");
        true
    }

    /// Commit a finished resize. The rendered box may also carry a moved
    /// origin when the user pulled a top or left edge.
    pub fn resize_stop(
        &mut self,
        id: ElementId,
        rendered: RenderedBox,
        viewport: &ViewportState,
    ) -> bool {
        let (position, size) = viewport.transform().to_stored_box(rendered);
        if !self.update_element(id, &ElementPatch::geometry(position, size)) {
            return false;
        }
        self.select(Some(id));
        tracing::debug!(%id, width = size.width, height = size.height, "resize committed");
        true
    }
}
