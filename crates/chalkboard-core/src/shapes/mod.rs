//! Drawable objects for the whiteboard scene.

mod note;
mod shape;
mod stroke;
mod text;

pub use note::StickyNote;
pub use shape::{Shape, ShapeKind};
pub use stroke::Stroke;
pub use text::{MAX_FONT_SIZE, MIN_FONT_SIZE, Text};

use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Default sticky-note yellow.
    pub fn note_yellow() -> Self {
        Self::new(255, 235, 130, 255)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    ///
    /// Returns `None` for anything else.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by every drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Stroke (or text) color.
    pub color: SerializableColor,
    /// Line width for strokes and shape outlines.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Get the color as a peniko Color.
    pub fn color(&self) -> Color {
        self.color.into()
    }

    /// Get the color with opacity applied.
    pub fn color_with_opacity(&self) -> Color {
        apply_opacity(self.color, self.opacity)
    }

    /// Set the color from a peniko Color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color.into();
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Scale a color's alpha channel by `opacity`.
pub fn apply_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (f64::from(color.a) * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

/// Unique identifier for drawables.
pub type ShapeId = Uuid;

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Inclusive containment (kurbo's `Rect::contains` excludes the far edges).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether two rectangles overlap or touch.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Map `point` by its normalized position inside `from` onto `to`.
///
/// A collapsed axis of `from` lands on the middle of `to`.
pub fn remap_point(point: Point, from: Rect, to: Rect) -> Point {
    let axis = |p: f64, f0: f64, f1: f64, t0: f64, t1: f64| {
        let extent = f1 - f0;
        if extent.abs() < f64::EPSILON {
            (t0 + t1) / 2.0
        } else {
            t0 + (p - f0) / extent * (t1 - t0)
        }
    };
    Point::new(
        axis(point.x, from.x0, from.x1, to.x0, to.x1),
        axis(point.y, from.y0, from.y1, to.y0, to.y1),
    )
}

/// Common behaviour implemented once per drawable kind.
pub trait DrawableTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Axis-aligned bounding box of the stored (unrotated) geometry.
    fn bounds(&self) -> Rect;

    /// Containment predicate for a point in the object's unrotated frame.
    fn contains_point(&self, point: Point) -> bool;

    /// Path used for rendering the outline/fill.
    fn to_path(&self) -> BezPath;

    /// Translate every coordinate-bearing field.
    fn translate(&mut self, delta: Vec2);

    /// Map the object onto a new bounding box.
    fn apply_bounds(&mut self, bounds: Rect);

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Rotation in radians about the bounds centre.
    fn rotation(&self) -> f64;

    fn set_rotation(&mut self, rotation: f64);
}

/// Every kind of object the scene can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Drawable {
    Stroke(Stroke),
    Shape(Shape),
    Text(Text),
    StickyNote(StickyNote),
}

impl Drawable {
    fn inner(&self) -> &dyn DrawableTrait {
        match self {
            Drawable::Stroke(s) => s,
            Drawable::Shape(s) => s,
            Drawable::Text(s) => s,
            Drawable::StickyNote(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DrawableTrait {
        match self {
            Drawable::Stroke(s) => s,
            Drawable::Shape(s) => s,
            Drawable::Text(s) => s,
            Drawable::StickyNote(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.inner().id()
    }

    pub fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    pub fn to_path(&self) -> BezPath {
        self.inner().to_path()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.inner_mut().translate(delta);
    }

    pub fn apply_bounds(&mut self, bounds: Rect) {
        self.inner_mut().apply_bounds(bounds);
    }

    pub fn style(&self) -> &ShapeStyle {
        self.inner().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.inner_mut().style_mut()
    }

    pub fn rotation(&self) -> f64 {
        self.inner().rotation()
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.inner_mut().set_rotation(rotation);
    }

    /// Rotation about the bounds centre, used when rendering.
    pub fn rotation_transform(&self) -> Affine {
        let rotation = self.rotation();
        if rotation == 0.0 {
            Affine::IDENTITY
        } else {
            Affine::rotate_about(rotation, self.bounds().center())
        }
    }

    /// Check if a scene point hits this object, honouring its rotation.
    pub fn hit_test(&self, point: Point) -> bool {
        let local = self.rotation_transform().inverse() * point;
        self.inner().contains_point(local)
    }

    /// Replace the id with a fresh one (paste, duplicate).
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Drawable::Stroke(s) => s.id = new_id,
            Drawable::Shape(s) => s.id = new_id,
            Drawable::Text(s) => s.id = new_id,
            Drawable::StickyNote(s) => s.id = new_id,
        }
    }

    /// Discriminator used in the scene document.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Drawable::Stroke(_) => "stroke",
            Drawable::Shape(_) => "shape",
            Drawable::Text(_) => "text",
            Drawable::StickyNote(_) => "stickyNote",
        }
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self, Drawable::Stroke(_))
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Drawable::Stroke(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Drawable::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Drawable::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Stroke> for Drawable {
    fn from(stroke: Stroke) -> Self {
        Drawable::Stroke(stroke)
    }
}

impl From<Shape> for Drawable {
    fn from(shape: Shape) -> Self {
        Drawable::Shape(shape)
    }
}

impl From<Text> for Drawable {
    fn from(text: Text) -> Self {
        Drawable::Text(text)
    }
}

impl From<StickyNote> for Drawable {
    fn from(note: StickyNote) -> Self {
        Drawable::StickyNote(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(
            SerializableColor::from_hex("#ff0000"),
            Some(SerializableColor::new(255, 0, 0, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#0f0"),
            Some(SerializableColor::new(0, 255, 0, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#00000080"),
            Some(SerializableColor::new(0, 0, 0, 128))
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12345"), None);
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(SerializableColor::new(255, 0, 16, 255).to_hex(), "#ff0010");
        assert_eq!(SerializableColor::new(0, 0, 0, 128).to_hex(), "#00000080");
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let color = apply_opacity(SerializableColor::black(), 0.5);
        assert_eq!(color.to_rgba8().a, 127);
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-10);
        // Clamped to the segment's extent
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_remap_point() {
        let from = Rect::new(0.0, 0.0, 10.0, 10.0);
        let to = Rect::new(100.0, 100.0, 120.0, 140.0);
        let p = remap_point(Point::new(5.0, 5.0), from, to);
        assert!((p.x - 110.0).abs() < 1e-10);
        assert!((p.y - 120.0).abs() < 1e-10);
    }

    #[test]
    fn test_remap_point_flat_axis_centres() {
        let from = Rect::new(0.0, 50.0, 10.0, 50.0);
        let to = Rect::new(0.0, 50.0, 20.0, 70.0);
        let p = remap_point(Point::new(10.0, 50.0), from, to);
        assert!((p.x - 20.0).abs() < 1e-10);
        assert!((p.y - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_rotated_hit_test() {
        // A wide, short rectangle rotated a quarter turn becomes tall and narrow.
        let mut shape = Shape::new(ShapeKind::Rectangle, Point::new(0.0, 40.0), Point::new(100.0, 60.0));
        shape.rotation = FRAC_PI_2;
        let drawable = Drawable::Shape(shape);
        assert!(drawable.hit_test(Point::new(50.0, 5.0)));
        assert!(!drawable.hit_test(Point::new(5.0, 50.0)));
    }

    #[test]
    fn test_serialized_discriminator() {
        let text = Drawable::Text(Text::new(Point::new(1.0, 2.0), "hi".to_string(), 16.0));
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["fontSize"], 16.0);

        let back: Drawable = serde_json::from_value(json).unwrap();
        assert_eq!(back, text);
    }
}
