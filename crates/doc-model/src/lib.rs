//! Data model shared by the overlay engine, the viewport and the record store.
//!
//! Element geometry is always stored unscaled and page-local: as if the
//! viewport scale were 1.0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod content;

pub use content::{ContentKind, ALLOWED_MIME_TYPES};

/// Color used to render elements that carry no color of their own.
pub const NEUTRAL_GRAY: &str = "#808080";

/// Content given to a freshly created text element.
pub const DEFAULT_TEXT_CONTENT: &str = "Edit me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a document record in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of annotation shapes. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Text,
    Circle,
    Square,
    Line,
    HighlightOpaque,
    HighlightTransparent,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Text,
        ElementKind::Circle,
        ElementKind::Square,
        ElementKind::Line,
        ElementKind::HighlightOpaque,
        ElementKind::HighlightTransparent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Circle => "circle",
            ElementKind::Square => "square",
            ElementKind::Line => "line",
            ElementKind::HighlightOpaque => "highlight-opaque",
            ElementKind::HighlightTransparent => "highlight-transparent",
        }
    }

    /// Default unscaled size: text boxes are wider and shorter than shapes.
    pub fn default_size(self) -> ElementSize {
        match self {
            ElementKind::Text => ElementSize::new(200.0, 50.0),
            ElementKind::Circle
            | ElementKind::Square
            | ElementKind::Line
            | ElementKind::HighlightOpaque
            | ElementKind::HighlightTransparent => ElementSize::new(100.0, 100.0),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown element kind: {0}")]
pub struct UnknownKind(pub String);

/// Unscaled, page-local position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

impl PagePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Unscaled element size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementSize {
    pub width: f32,
    pub height: f32,
}

impl ElementSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// CSS hex color (`#rgb` or `#rrggbb`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementColor(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a hex color: {0:?}")]
pub struct InvalidColor(pub String);

impl ElementColor {
    pub fn parse(input: &str) -> Result<Self, InvalidColor> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| InvalidColor(input.to_owned()))?;

        let valid_len = matches!(digits.len(), 3 | 6);
        if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(input.to_owned()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form style properties (CSS-like name/value pairs).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresentationStyle(BTreeMap<String, String>);

impl PresentationStyle {
    pub const BACKGROUND_COLOR: &'static str = "background-color";

    pub fn new() -> Self {
        Self::default()
    }

    /// Style derived once at creation time. Highlights get a translucent
    /// yellow fill; everything else starts empty.
    pub fn for_kind(kind: ElementKind) -> Self {
        let mut style = Self::new();
        match kind {
            ElementKind::HighlightOpaque => {
                style.set(Self::BACKGROUND_COLOR, "rgba(255, 255, 0, 0.5)");
            }
            ElementKind::HighlightTransparent => {
                style.set(Self::BACKGROUND_COLOR, "rgba(255, 255, 0, 0.2)");
            }
            ElementKind::Text | ElementKind::Circle | ElementKind::Square | ElementKind::Line => {}
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A freeform annotation anchored to one page of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationElement {
    id: ElementId,
    kind: ElementKind,
    pub position: PagePoint,
    pub size: ElementSize,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ElementColor>,
    #[serde(default)]
    pub style: PresentationStyle,
}

impl AnnotationElement {
    /// Element with the kind's default size, content and style.
    pub fn new(id: ElementId, kind: ElementKind, position: PagePoint, page: u32) -> Self {
        let content = match kind {
            ElementKind::Text => Some(DEFAULT_TEXT_CONTENT.to_owned()),
            _ => None,
        };

        Self {
            id,
            kind,
            position,
            size: kind.default_size(),
            page: page.max(1),
            content,
            color: None,
            style: PresentationStyle::for_kind(kind),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Color to draw with, falling back to neutral gray.
    pub fn render_color(&self) -> &str {
        self.color.as_ref().map(ElementColor::as_str).unwrap_or(NEUTRAL_GRAY)
    }

    /// Merge a partial update. Identity and kind are never touched.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.position.x = x;
        }
        if let Some(y) = patch.y {
            self.position.y = y;
        }
        if let Some(width) = patch.width {
            self.size.width = width;
        }
        if let Some(height) = patch.height {
            self.size.height = height;
        }
        if let Some(page) = patch.page {
            self.page = page.max(1);
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(style) = &patch.style {
            self.style = style.clone();
        }
    }
}

/// Partial update to an element. `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub page: Option<u32>,
    pub content: Option<String>,
    pub color: Option<ElementColor>,
    pub style: Option<PresentationStyle>,
}

impl ElementPatch {
    pub fn position(position: PagePoint) -> Self {
        Self { x: Some(position.x), y: Some(position.y), ..Self::default() }
    }

    pub fn geometry(position: PagePoint, size: ElementSize) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            width: Some(size.width),
            height: Some(size.height),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), ..Self::default() }
    }

    pub fn color(color: ElementColor) -> Self {
        Self { color: Some(color), ..Self::default() }
    }

    pub fn page(page: u32) -> Self {
        Self { page: Some(page), ..Self::default() }
    }

    pub fn style(style: PresentationStyle) -> Self {
        Self { style: Some(style), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A stored document: identity, binary content and its annotation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// `None` when the document has never been annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<AnnotationElement>>,
}

impl DocumentRecord {
    pub fn new(
        id: DocumentId,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self { id, name: name.into(), mime_type: mime_type.into(), content, annotations: None }
    }

    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_mime(&self.mime_type)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            annotation_count: self.annotations.as_ref().map_or(0, Vec::len),
        }
    }

    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(annotations) = patch.annotations {
            self.annotations = Some(annotations);
        }
    }
}

/// Partial record update. Binary content and mime type are never patched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub annotations: Option<Vec<AnnotationElement>>,
}

impl RecordPatch {
    pub fn annotations(annotations: Vec<AnnotationElement>) -> Self {
        Self { annotations: Some(annotations), ..Self::default() }
    }
}

/// Lightweight listing entry for the file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub mime_type: String,
    pub annotation_count: usize,
}
