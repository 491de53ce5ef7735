//! Annotation overlay engine.
//!
//! Owns the element list of the currently open document. All mutation goes
//! through this API and is scoped to a single element id.

use crate::config::EditorConfig;
use crate::ids::ElementIdGenerator;
use doc_model::{AnnotationElement, DocumentId, ElementId, ElementKind, ElementPatch, PagePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Region new elements are randomly dropped into, in stored coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlacementRegion {
    width: f32,
    height: f32,
}

pub struct OverlayEngine {
    pub(crate) elements: Vec<AnnotationElement>,
    pub(crate) selected: Option<ElementId>,
    selected_tool: Option<ElementKind>,
    pub(crate) document: Option<DocumentId>,
    pub(crate) dirty: bool,
    pub(crate) ids: ElementIdGenerator,
    pub(crate) loads_issued: u64,
    placement: PlacementRegion,
    rng: StdRng,
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl OverlayEngine {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic placement, for tests and reproducible scripts.
    pub fn seeded(config: &EditorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &EditorConfig, rng: StdRng) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            selected_tool: None,
            document: None,
            dirty: false,
            ids: ElementIdGenerator::new(),
            loads_issued: 0,
            placement: PlacementRegion {
                width: config.placement_width,
                height: config.placement_height,
            },
            rng,
        }
    }

    pub fn with_id_generator(mut self, ids: ElementIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn elements(&self) -> &[AnnotationElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&AnnotationElement> {
        self.elements.iter().find(|element| element.id() == id)
    }

    pub fn page_elements(&self, page: u32) -> impl Iterator<Item = &AnnotationElement> {
        self.elements.iter().filter(move |element| element.page == page)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document.as_ref()
    }

    /// Whether the list differs from what was last loaded or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Tool most recently used to create an element.
    pub fn selected_tool(&self) -> Option<ElementKind> {
        self.selected_tool
    }

    /// Create an element of `kind` on `page` (page 0 means page 1) at a random
    /// spot in the placement region. The new element becomes the selection.
    pub fn add_element(&mut self, kind: ElementKind, page: u32) -> ElementId {
        let id = self.ids.next_id();
        let position = PagePoint::new(
            spread(&mut self.rng, self.placement.width),
            spread(&mut self.rng, self.placement.height),
        );

        let element = AnnotationElement::new(id, kind, position, page);
        tracing::debug!(%id, %kind, page = element.page, "element added");

        self.elements.push(element);
        self.selected = Some(id);
        self.selected_tool = Some(kind);
        self.dirty = true;
        id
    }

    /// Merge `patch` into the element. Unknown ids are ignored.
    ///
    /// Non-finite numbers, and sizes below one unit, are dropped from the
    /// patch rather than stored.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.iter_mut().find(|element| element.id() == id) else {
            tracing::trace!(%id, "update for unknown element ignored");
            return false;
        };

        let patch = sanitize(patch);
        if patch.is_empty() {
            return true;
        }

        element.apply(&patch);
        self.dirty = true;
        tracing::debug!(%id, "element updated");
        true
    }

    /// Delete the element, clearing the selection if it was selected.
    pub fn remove_element(&mut self, id: ElementId) -> Option<AnnotationElement> {
        let index = self.elements.iter().position(|element| element.id() == id)?;
        let removed = self.elements.remove(index);

        if self.selected == Some(id) {
            self.selected = None;
        }
        self.dirty = true;
        tracing::debug!(%id, "element removed");
        Some(removed)
    }

    /// Select an element, or clear with `None`. Unknown ids leave the
    /// selection unchanged and return `false`.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if self.element(id).is_some() => {
                self.selected = Some(id);
                true
            }
            Some(_) => false,
        }
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// The selected element, looked up in the live list on every call.
    pub fn selected(&self) -> Option<&AnnotationElement> {
        self.selected.and_then(|id| self.element(id))
    }
}

/// Uniform in `[0, extent)`. Empty or non-finite regions place at 0.
fn spread(rng: &mut StdRng, extent: f32) -> f32 {
    if extent.is_finite() && extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

fn sanitize(patch: &ElementPatch) -> ElementPatch {
    let finite = |value: Option<f32>| value.filter(|v| v.is_finite());
    let size = |value: Option<f32>| finite(value).filter(|v| *v >= 1.0);

    let clean = ElementPatch {
        x: finite(patch.x),
        y: finite(patch.y),
        width: size(patch.width),
        height: size(patch.height),
        ..patch.clone()
    };

    if clean != *patch {
        tracing::warn!("dropped invalid numeric fields from element update");
    }
    clean
}
