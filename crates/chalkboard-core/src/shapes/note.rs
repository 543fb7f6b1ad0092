//! Sticky note drawn on the canvas like any other object.

use super::{DrawableTrait, SerializableColor, ShapeId, ShapeStyle, rect_contains};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed-size note with text on a colored background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub(crate) id: ShapeId,
    /// Top-left corner.
    pub anchor: Point,
    pub width: f64,
    pub height: f64,
    /// The note text.
    pub content: String,
    /// Fill color of the note.
    pub background: SerializableColor,
    /// Rotation angle in radians (around bounds centre).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties (color applies to the text).
    pub style: ShapeStyle,
}

impl StickyNote {
    pub fn new(anchor: Point, size: Size, content: String, background: SerializableColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            width: size.width,
            height: size.height,
            content,
            background,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawableTrait for StickyNote {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.anchor, self.size())
    }

    fn contains_point(&self, point: Point) -> bool {
        rect_contains(self.bounds(), point)
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.anchor += delta;
    }

    fn apply_bounds(&mut self, bounds: Rect) {
        self.anchor = bounds.origin();
        self.width = bounds.width();
        self.height = bounds.height();
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }
}
