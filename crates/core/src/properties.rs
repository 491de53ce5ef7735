//! Property panel input.
//!
//! The panel edits X/Y/Width/Height/Color as raw text. Input is parsed and
//! checked here; anything that does not parse is rejected and the element
//! keeps its prior value.

use crate::engine::OverlayEngine;
use crate::error::{OverlayError, OverlayResult};
use doc_model::{ElementColor, ElementId, ElementPatch};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    X,
    Y,
    Width,
    Height,
    Color,
}

impl PropertyField {
    pub const ALL: [PropertyField; 5] = [
        PropertyField::X,
        PropertyField::Y,
        PropertyField::Width,
        PropertyField::Height,
        PropertyField::Color,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyField::X => "x",
            PropertyField::Y => "y",
            PropertyField::Width => "width",
            PropertyField::Height => "height",
            PropertyField::Color => "color",
        }
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for PropertyField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

impl OverlayEngine {
    /// Parse and apply one property-panel edit.
    ///
    /// Returns `Ok(false)` when `id` is unknown, matching the silent no-op of
    /// the other element operations.
    pub fn apply_property_input(
        &mut self,
        id: ElementId,
        field: PropertyField,
        raw: &str,
    ) -> OverlayResult<bool> {
        if self.element(id).is_none() {
            return Ok(false);
        }

        let patch = parse_input(field, raw).inspect_err(|err| {
            tracing::warn!(%id, %err, "property input rejected");
        })?;
        Ok(self.update_element(id, &patch))
    }
}

fn parse_input(field: PropertyField, raw: &str) -> OverlayResult<ElementPatch> {
    let reject = |reason| OverlayError::ValidationRejected {
        field,
        input: raw.to_string(),
        reason,
    };
    let number = || -> OverlayResult<f32> {
        let value: f32 = raw.trim().parse().map_err(|_| reject("not a number"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(reject("not a finite number"))
        }
    };
    let length = || -> OverlayResult<f32> {
        let value = number()?;
        if value < 1.0 {
            return Err(reject("must be at least 1"));
        }
        Ok(value)
    };

    let mut patch = ElementPatch::default();
    match field {
        PropertyField::X => patch.x = Some(number()?),
        PropertyField::Y => patch.y = Some(number()?),
        PropertyField::Width => patch.width = Some(length()?),
        PropertyField::Height => patch.height = Some(length()?),
        PropertyField::Color => {
            let color = ElementColor::parse(raw).map_err(|_| reject("expected #rgb or #rrggbb"))?;
            patch.color = Some(color);
        }
    }
    Ok(patch)
}
