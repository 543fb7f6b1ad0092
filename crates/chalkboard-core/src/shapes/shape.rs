//! Geometric shapes defined by a start and end point.

use super::{
    DrawableTrait, ShapeId, ShapeStyle, point_to_segment_dist, rect_contains, remap_point,
};
use kurbo::{BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use uuid::Uuid;

/// Corner radius of a rounded rectangle relative to its shorter side.
const ROUNDED_CORNER_RATIO: f64 = 0.2;
/// Horizontal skew of a parallelogram relative to its width.
const PARALLELOGRAM_SKEW: f64 = 0.25;
/// Top-edge inset of a trapezoid relative to its width.
const TRAPEZOID_INSET: f64 = 0.2;
/// Inner-to-outer radius ratio for the five-point star.
const STAR_INNER_RATIO: f64 = 0.5;
/// Angle between an arrow's shaft and each side of its head.
const ARROW_HEAD_ANGLE: f64 = PI / 6.0;
/// Path flattening tolerance for curved outlines.
const PATH_TOLERANCE: f64 = 0.1;

/// Every shape the shape-family tools can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    RoundedRectangle,
    Circle,
    Oval,
    Triangle,
    Diamond,
    Parallelogram,
    Trapezoid,
    Pentagon,
    Hexagon,
    Octagon,
    Star,
    Line,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 14] = [
        ShapeKind::Rectangle,
        ShapeKind::RoundedRectangle,
        ShapeKind::Circle,
        ShapeKind::Oval,
        ShapeKind::Triangle,
        ShapeKind::Diamond,
        ShapeKind::Parallelogram,
        ShapeKind::Trapezoid,
        ShapeKind::Pentagon,
        ShapeKind::Hexagon,
        ShapeKind::Octagon,
        ShapeKind::Star,
        ShapeKind::Line,
        ShapeKind::Arrow,
    ];

    /// Identifier used by the toolbar and the scene document.
    pub fn id(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::RoundedRectangle => "rounded-rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Oval => "oval",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::Trapezoid => "trapezoid",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Octagon => "octagon",
            ShapeKind::Star => "star",
            ShapeKind::Line => "line",
            ShapeKind::Arrow => "arrow",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Line and arrow hit-test against their segment, not their box.
    pub fn is_linear(self) -> bool {
        matches!(self, ShapeKind::Line | ShapeKind::Arrow)
    }
}

/// A shape built from the rectangle spanned by `start` and `end`.
///
/// For circles `start` is the centre and the radius is the distance to `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub(crate) id: ShapeId,
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    /// Rotation angle in radians (around bounds centre).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Shape {
    pub fn new(kind: ShapeKind, start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            start,
            end,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Radius of a circle (distance from start to end).
    pub fn radius(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// The construction rectangle spanned by start and end.
    fn frame(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn polygon_vertices(&self) -> Vec<Point> {
        let r = self.frame();
        let (x0, y0, x1, y1) = (r.x0, r.y0, r.x1, r.y1);
        let c = r.center();
        match self.kind {
            ShapeKind::Triangle => vec![
                Point::new(c.x, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
            ShapeKind::Diamond => vec![
                Point::new(c.x, y0),
                Point::new(x1, c.y),
                Point::new(c.x, y1),
                Point::new(x0, c.y),
            ],
            ShapeKind::Parallelogram => {
                let skew = r.width() * PARALLELOGRAM_SKEW;
                vec![
                    Point::new(x0 + skew, y0),
                    Point::new(x1, y0),
                    Point::new(x1 - skew, y1),
                    Point::new(x0, y1),
                ]
            }
            ShapeKind::Trapezoid => {
                let inset = r.width() * TRAPEZOID_INSET;
                vec![
                    Point::new(x0 + inset, y0),
                    Point::new(x1 - inset, y0),
                    Point::new(x1, y1),
                    Point::new(x0, y1),
                ]
            }
            ShapeKind::Pentagon => regular_polygon(r, 5),
            ShapeKind::Hexagon => regular_polygon(r, 6),
            ShapeKind::Octagon => regular_polygon(r, 8),
            ShapeKind::Star => star_vertices(r),
            _ => Vec::new(),
        }
    }

    fn arrow_head(&self) -> [Point; 2] {
        let shaft = self.end - self.start;
        let angle = shaft.y.atan2(shaft.x);
        let len = (self.style.stroke_width * 4.0).max(10.0);
        let side = |offset: f64| {
            let a = angle + PI + offset;
            self.end + Vec2::new(a.cos(), a.sin()) * len
        };
        [side(ARROW_HEAD_ANGLE), side(-ARROW_HEAD_ANGLE)]
    }
}

/// Vertices of a regular polygon inscribed in the ellipse of `rect`, first vertex at the top.
fn regular_polygon(rect: Rect, sides: usize) -> Vec<Point> {
    let c = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    (0..sides)
        .map(|i| {
            let angle = TAU * i as f64 / sides as f64 - FRAC_PI_2;
            Point::new(c.x + rx * angle.cos(), c.y + ry * angle.sin())
        })
        .collect()
}

/// Ten alternating outer/inner vertices of a five-point star.
fn star_vertices(rect: Rect) -> Vec<Point> {
    let c = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    (0..10)
        .map(|i| {
            let angle = PI / 5.0 * i as f64 - FRAC_PI_2;
            let scale = if i % 2 == 0 { 1.0 } else { STAR_INNER_RATIO };
            Point::new(c.x + rx * scale * angle.cos(), c.y + ry * scale * angle.sin())
        })
        .collect()
}

fn closed_polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

impl DrawableTrait for Shape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        if self.kind == ShapeKind::Circle {
            let r = self.radius();
            Rect::new(
                self.start.x - r,
                self.start.y - r,
                self.start.x + r,
                self.start.y + r,
            )
        } else {
            self.frame()
        }
    }

    /// Rectangle and polygon families use a bounding-box approximation,
    /// not exact polygon containment.
    fn contains_point(&self, point: Point) -> bool {
        match self.kind {
            ShapeKind::Circle => point.distance(self.start) <= self.radius(),
            ShapeKind::Oval => {
                let r = self.frame();
                let (rx, ry) = (r.width() / 2.0, r.height() / 2.0);
                if rx < f64::EPSILON || ry < f64::EPSILON {
                    return false;
                }
                let c = r.center();
                let (dx, dy) = ((point.x - c.x) / rx, (point.y - c.y) / ry);
                dx * dx + dy * dy <= 1.0
            }
            ShapeKind::Line | ShapeKind::Arrow => {
                point_to_segment_dist(point, self.start, self.end) <= self.style.stroke_width * 2.0
            }
            _ => rect_contains(self.frame(), point),
        }
    }

    fn to_path(&self) -> BezPath {
        let frame = self.frame();
        match self.kind {
            ShapeKind::Rectangle => frame.to_path(PATH_TOLERANCE),
            ShapeKind::RoundedRectangle => {
                let radius = frame.width().min(frame.height()) * ROUNDED_CORNER_RATIO;
                RoundedRect::from_rect(frame, radius).to_path(PATH_TOLERANCE)
            }
            ShapeKind::Circle => Circle::new(self.start, self.radius()).to_path(PATH_TOLERANCE),
            ShapeKind::Oval => Ellipse::from_rect(frame).to_path(PATH_TOLERANCE),
            ShapeKind::Line => {
                let mut path = BezPath::new();
                path.move_to(self.start);
                path.line_to(self.end);
                path
            }
            ShapeKind::Arrow => {
                let mut path = BezPath::new();
                path.move_to(self.start);
                path.line_to(self.end);
                let [left, right] = self.arrow_head();
                path.move_to(left);
                path.line_to(self.end);
                path.line_to(right);
                path
            }
            _ => closed_polyline(&self.polygon_vertices()),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn apply_bounds(&mut self, bounds: Rect) {
        if self.kind == ShapeKind::Circle {
            // Stay circular: recentre and take the larger axis radius.
            let center = bounds.center();
            let radius = bounds.width().max(bounds.height()) / 2.0;
            self.start = center;
            self.end = center + Vec2::new(radius, 0.0);
        } else {
            let old = self.frame();
            self.start = remap_point(self.start, old, bounds);
            self.end = remap_point(self.end, old, bounds);
            // A flat line opens up across the new box on its collapsed axis
            if old.width() < f64::EPSILON {
                self.start.x = bounds.x0;
                self.end.x = bounds.x1;
            }
            if old.height() < f64::EPSILON {
                self.start.y = bounds.y0;
                self.end.y = bounds.y1;
            }
        }
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
