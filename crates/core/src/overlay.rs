//! Display-space projection of the element list for the current page.

use crate::engine::OverlayEngine;
use doc_model::{AnnotationElement, ElementId, ElementKind, PresentationStyle};
use viewer_core::{DisplayRect, ViewportState};

/// What to draw for one element, decided by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementVisual<'a> {
    TextBox { content: &'a str },
    Ellipse { fill: &'a str },
    Rectangle { fill: &'a str },
    Rule { stroke: &'a str },
    Highlight { fill: &'a str },
}

impl<'a> ElementVisual<'a> {
    pub fn for_element(element: &'a AnnotationElement) -> Self {
        match element.kind() {
            ElementKind::Text => ElementVisual::TextBox {
                content: element.content.as_deref().unwrap_or_default(),
            },
            ElementKind::Circle => ElementVisual::Ellipse { fill: element.render_color() },
            ElementKind::Square => ElementVisual::Rectangle { fill: element.render_color() },
            ElementKind::Line => ElementVisual::Rule { stroke: element.render_color() },
            ElementKind::HighlightOpaque | ElementKind::HighlightTransparent => {
                let fill = element
                    .style
                    .get(PresentationStyle::BACKGROUND_COLOR)
                    .unwrap_or_else(|| element.render_color());
                ElementVisual::Highlight { fill }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedElement<'a> {
    pub id: ElementId,
    pub kind: ElementKind,
    pub rect: DisplayRect,
    pub visual: ElementVisual<'a>,
    pub style: &'a PresentationStyle,
    pub selected: bool,
}

impl OverlayEngine {
    /// Elements on the viewport's current page, scaled for display, in list
    /// order.
    pub fn overlay(&self, viewport: &ViewportState) -> Vec<DisplayedElement<'_>> {
        let transform = viewport.transform();
        let selected = self.selected_id();

        self.page_elements(viewport.page())
            .map(|element| DisplayedElement {
                id: element.id(),
                kind: element.kind(),
                rect: transform.to_display(element.position, element.size),
                visual: ElementVisual::for_element(element),
                style: &element.style,
                selected: selected == Some(element.id()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use doc_model::{ElementColor, ElementPatch, ElementSize, PagePoint};
    use proptest::prelude::*;
    use viewer_core::ContentMetrics;

    fn viewport(page: u32, scale: f32) -> ViewportState {
        let mut viewport = ViewportState::default();
        viewport.apply_metrics(ContentMetrics {
            natural_width: 612.0,
            natural_height: 792.0,
            total_pages: Some(5),
        });
        viewport.set_page(page);
        viewport.set_scale(scale);
        viewport
    }

    #[test]
    fn kinds_map_to_visuals() {
        let mut engine = OverlayEngine::seeded(&EditorConfig::default(), 5);
        for kind in ElementKind::ALL {
            engine.add_element(kind, 1);
        }
        let circle = engine.elements()[1].id();
        let red = ElementColor::parse("#f00").expect("valid");
        engine.update_element(circle, &ElementPatch::color(red));

        let visuals: Vec<_> =
            engine.overlay(&viewport(1, 1.0)).into_iter().map(|shown| shown.visual).collect();
        assert_eq!(
            visuals,
            vec![
                ElementVisual::TextBox { content: "Edit me" },
                ElementVisual::Ellipse { fill: "#f00" },
                ElementVisual::Rectangle { fill: "#808080" },
                ElementVisual::Rule { stroke: "#808080" },
                ElementVisual::Highlight { fill: "rgba(255, 255, 0, 0.5)" },
                ElementVisual::Highlight { fill: "rgba(255, 255, 0, 0.2)" },
            ]
        );
    }

    #[test]
    fn rects_are_scaled_and_selection_flagged() {
        let mut engine = OverlayEngine::seeded(&EditorConfig::default(), 5);
        let id = engine.add_element(ElementKind::Square, 1);
        engine.update_element(
            id,
            &ElementPatch::geometry(PagePoint::new(10.0, 20.0), ElementSize::new(100.0, 40.0)),
        );

        let shown = engine.overlay(&viewport(1, 2.0));
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].rect, DisplayRect { x: 20.0, y: 40.0, width: 200.0, height: 80.0 });
        assert!(shown[0].selected);

        engine.select(None);
        assert!(!engine.overlay(&viewport(1, 2.0))[0].selected);
    }

    #[test]
    fn zoom_does_not_touch_stored_geometry() {
        let mut engine = OverlayEngine::seeded(&EditorConfig::default(), 5);
        engine.add_element(ElementKind::Circle, 1);
        let before = engine.elements().to_vec();

        let mut view = viewport(1, 1.0);
        for _ in 0..8 {
            view.zoom_in();
            engine.overlay(&view);
        }
        assert_eq!(engine.elements(), before.as_slice());
    }

    proptest! {
        #[test]
        fn other_pages_never_render(scale in 0.5f32..2.0, pages in prop::collection::vec(1u32..=5, 1..20)) {
            let mut engine = OverlayEngine::seeded(&EditorConfig::default(), 9);
            for page in &pages {
                engine.add_element(ElementKind::Square, *page);
            }

            let shown = engine.overlay(&viewport(1, scale));
            let expected = pages.iter().filter(|page| **page == 1).count();
            prop_assert_eq!(shown.len(), expected);
            for item in shown {
                prop_assert_eq!(engine.element(item.id).map(|el| el.page), Some(1));
            }
        }
    }
}
