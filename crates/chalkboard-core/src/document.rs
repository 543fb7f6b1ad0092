//! Serializable scene document for save/load.

use crate::shapes::{Drawable, ShapeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while reading a scene document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed scene document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid scene document: {0}")]
    Invalid(String),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// The scene plus the viewport it was saved with.
///
/// `objects` is in z-order (back to front); each carries a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub objects: Vec<Drawable>,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl SceneDocument {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let document: SceneDocument = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// Reject values the engine cannot represent.
    pub fn validate(&self) -> DocumentResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(invalid(format!("scale must be positive, got {}", self.scale)));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(invalid("viewport offset is not finite"));
        }

        let mut ids = HashSet::new();
        for (index, object) in self.objects.iter().enumerate() {
            if !ids.insert(object.id()) {
                return Err(invalid(format!("duplicate object id {}", object.id())));
            }
            validate_object(object)
                .map_err(|reason| invalid(format!("object {index} ({}): {reason}", object.kind_name())))?;
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> DocumentError {
    DocumentError::Invalid(reason.into())
}

fn finite(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

fn validate_style(style: &ShapeStyle) -> Result<(), String> {
    if !style.stroke_width.is_finite() || style.stroke_width < 0.0 {
        return Err(format!("bad stroke width {}", style.stroke_width));
    }
    if !(0.0..=1.0).contains(&style.opacity) {
        return Err(format!("opacity {} outside [0, 1]", style.opacity));
    }
    Ok(())
}

fn validate_object(object: &Drawable) -> Result<(), String> {
    validate_style(object.style())?;
    if !object.rotation().is_finite() {
        return Err("rotation is not finite".to_string());
    }
    let geometry_ok = match object {
        Drawable::Stroke(stroke) => stroke.points.iter().all(|p| finite(*p)),
        Drawable::Shape(shape) => finite(shape.start) && finite(shape.end),
        Drawable::Text(text) => {
            finite(text.anchor) && text.font_size.is_finite() && text.font_size > 0.0
        }
        Drawable::StickyNote(note) => {
            finite(note.anchor)
                && note.width.is_finite()
                && note.height.is_finite()
                && note.width >= 0.0
                && note.height >= 0.0
        }
    };
    if geometry_ok {
        Ok(())
    } else {
        Err("geometry is not finite or has a negative size".to_string())
    }
}
