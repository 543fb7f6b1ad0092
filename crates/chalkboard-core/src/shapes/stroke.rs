//! Freehand pen stroke.

use super::{DrawableTrait, ShapeId, ShapeStyle, point_to_polyline_dist, remap_point};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand drawing (series of points in scene coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Points in the stroke path.
    pub points: Vec<Point>,
    /// Rotation angle in radians (around bounds centre).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Stroke {
    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether any part of the polyline lies within `radius` of `point`.
    pub fn is_near(&self, point: Point, radius: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= radius
    }

    /// Whether one of the recorded points lies within `radius` of `point`.
    pub fn has_point_within(&self, point: Point, radius: f64) -> bool {
        self.points.iter().any(|p| p.distance(point) <= radius)
    }

    /// Hit radius: twice the stroke width.
    pub fn hit_radius(&self) -> f64 {
        self.style.stroke_width * 2.0
    }
}

impl DrawableTrait for Stroke {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |acc, p| {
                acc.union_pt(*p)
            })
    }

    fn contains_point(&self, point: Point) -> bool {
        self.is_near(point, self.hit_radius())
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first);
            for p in iter {
                path.line_to(*p);
            }
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn apply_bounds(&mut self, bounds: Rect) {
        let old = self.bounds();
        for p in &mut self.points {
            *p = remap_point(*p, old, bounds);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn square_stroke() -> Stroke {
        Stroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(0.0, 50.0),
        ])
    }

    #[test]
    fn test_bounds() {
        let bounds = square_stroke().bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(Stroke::from_points(Vec::new()).bounds(), Rect::ZERO);
    }

    #[test]
    fn test_hit_within_twice_width() {
        let stroke = square_stroke();
        // stroke_width = 2.0, hit radius = 4.0
        assert!(stroke.contains_point(Point::new(25.0, 3.5)));
        assert!(!stroke.contains_point(Point::new(25.0, 5.0)));
        // Interior of the loop is not part of the stroke
        assert!(!stroke.contains_point(Point::new(25.0, 25.0)));
    }

    #[test]
    fn test_point_proximity_ignores_segments() {
        let stroke = square_stroke();
        assert!(stroke.has_point_within(Point::new(52.0, 2.0), 4.0));
        // On the first segment, but 25 units from either end
        assert!(!stroke.has_point_within(Point::new(25.0, 0.0), 4.0));
        assert!(stroke.is_near(Point::new(25.0, 0.0), 4.0));
    }

    #[test]
    fn test_translate() {
        let mut stroke = square_stroke();
        stroke.translate(Vec2::new(10.0, -5.0));
        assert_eq!(stroke.points[0], Point::new(10.0, -5.0));
        assert_eq!(stroke.points[2], Point::new(60.0, 45.0));
    }

    #[test]
    fn test_apply_bounds_rescales_points() {
        let mut stroke = square_stroke();
        stroke.apply_bounds(Rect::new(100.0, 100.0, 200.0, 150.0));
        let bounds = stroke.bounds();
        assert!((bounds.width() - 100.0).abs() < 1e-9);
        assert!((bounds.height() - 50.0).abs() < 1e-9);
        assert_eq!(stroke.points[2], Point::new(200.0, 150.0));
    }
}
