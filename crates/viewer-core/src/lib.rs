//! Viewport state, the stored/display coordinate transform and the document
//! renderer contract.

mod render;
mod transform;
mod viewport;

pub use render::{DocumentRenderer, RenderError, RenderRequest, RenderSurface, RendererRegistry};
pub use transform::{DisplayPoint, DisplayRect, RenderedBox, ScaleTransform};
pub use viewport::{available_width, ContentMetrics, ScaleBounds, ViewportState};
