//! Text shape.

use super::{DrawableTrait, ShapeId, ShapeStyle, rect_contains};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest font size reachable by resizing.
pub const MIN_FONT_SIZE: f64 = 8.0;
/// Largest font size reachable by resizing.
pub const MAX_FONT_SIZE: f64 = 200.0;
/// Approximate advance of one character relative to the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// A single line of text anchored at the left end of its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Left end of the baseline.
    pub anchor: Point,
    /// The text content.
    pub content: String,
    /// Font size in scene units.
    pub font_size: f64,
    /// Rotation angle in radians (around bounds centre).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Text {
    pub fn new(anchor: Point, content: String, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            content,
            font_size,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Approximate rendered width (no font metrics available to the engine).
    pub fn approximate_width(&self) -> f64 {
        self.content.chars().count() as f64 * self.font_size * CHAR_WIDTH_FACTOR
    }

    /// Set the font size, clamped to the supported range.
    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }
}

impl DrawableTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.anchor.x,
            self.anchor.y - self.font_size,
            self.anchor.x + self.approximate_width(),
            self.anchor.y,
        )
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

    /// The anchor follows the bottom-left corner and the font scales with the height.
    fn apply_bounds(&mut self, bounds: Rect) {
        let old_height = self.font_size;
        if old_height > f64::EPSILON {
            self.set_font_size(self.font_size * bounds.height() / old_height);
        }
        self.anchor = Point::new(bounds.x0, bounds.y1);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_baseline() {
        let text = Text::new(Point::new(10.0, 50.0), "Hello".to_string(), 20.0);
        let bounds = text.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 30.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 70.0).abs() < 1e-10);
        assert!((bounds.y1 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let text = Text::new(Point::new(0.0, 20.0), "abc".to_string(), 20.0);
        assert!(text.contains_point(Point::new(10.0, 10.0)));
        assert!(!text.contains_point(Point::new(10.0, 25.0)));
        assert!(!text.contains_point(Point::new(40.0, 10.0)));
    }

    #[test]
    fn test_resize_scales_font() {
        let mut text = Text::new(Point::new(0.0, 20.0), "abc".to_string(), 20.0);
        text.apply_bounds(Rect::new(5.0, 0.0, 100.0, 40.0));
        assert!((text.font_size - 40.0).abs() < 1e-10);
        assert_eq!(text.anchor, Point::new(5.0, 40.0));
    }

    #[test]
    fn test_resize_clamps_font() {
        let mut text = Text::new(Point::new(0.0, 20.0), "abc".to_string(), 20.0);
        text.apply_bounds(Rect::new(0.0, 0.0, 10.0, 2.0));
        assert!((text.font_size - MIN_FONT_SIZE).abs() < f64::EPSILON);

        text.apply_bounds(Rect::new(0.0, 0.0, 10.0, 5000.0));
        assert!((text.font_size - MAX_FONT_SIZE).abs() < f64::EPSILON);
    }
}
