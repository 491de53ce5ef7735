//! Mapping between stored (unscaled) and display (scaled) coordinates.
//!
//! The same scalar applies to x/width and y/height. Display values are never
//! written back without going through the inverse.

use doc_model::{ElementSize, PagePoint};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An element's box in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Box read back from a finished resize interaction, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RenderedBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTransform {
    scale: f32,
}

impl ScaleTransform {
    /// Non-positive or non-finite scales fall back to identity.
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self { scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_display(&self, position: PagePoint, size: ElementSize) -> DisplayRect {
        DisplayRect {
            x: position.x * self.scale,
            y: position.y * self.scale,
            width: size.width * self.scale,
            height: size.height * self.scale,
        }
    }

    pub fn to_display_point(&self, position: PagePoint) -> DisplayPoint {
        DisplayPoint::new(position.x * self.scale, position.y * self.scale)
    }

    pub fn to_stored_point(&self, point: DisplayPoint) -> PagePoint {
        PagePoint::new(point.x / self.scale, point.y / self.scale)
    }

    /// Inverse for a resize. Width and height are truncated to whole pixels
    /// as they are read back, before dividing; this is where the ±1px drift
    /// across repeated resizes at fractional scales comes from.
    pub fn to_stored_box(&self, rendered: RenderedBox) -> (PagePoint, ElementSize) {
        let position = self.to_stored_point(DisplayPoint::new(rendered.x, rendered.y));
        let size = ElementSize::new(
            rendered.width.trunc() / self.scale,
            rendered.height.trunc() / self.scale,
        );
        (position, size)
    }
}
