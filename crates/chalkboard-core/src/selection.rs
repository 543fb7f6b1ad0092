//! Selection set and manipulation handles.

use crate::scene::Scene;
use crate::shapes::{Drawable, ShapeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    /// Handle position on `bounds`.
    pub fn position(self, bounds: Rect) -> Point {
        let c = bounds.center();
        match self {
            ResizeAnchor::N => Point::new(c.x, bounds.y0),
            ResizeAnchor::Ne => Point::new(bounds.x1, bounds.y0),
            ResizeAnchor::E => Point::new(bounds.x1, c.y),
            ResizeAnchor::Se => Point::new(bounds.x1, bounds.y1),
            ResizeAnchor::S => Point::new(c.x, bounds.y1),
            ResizeAnchor::Sw => Point::new(bounds.x0, bounds.y1),
            ResizeAnchor::W => Point::new(bounds.x0, c.y),
            ResizeAnchor::Nw => Point::new(bounds.x0, bounds.y0),
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(self, ResizeAnchor::W | ResizeAnchor::Nw | ResizeAnchor::Sw)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeAnchor::E | ResizeAnchor::Ne | ResizeAnchor::Se)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeAnchor::N | ResizeAnchor::Ne | ResizeAnchor::Nw)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeAnchor::S | ResizeAnchor::Se | ResizeAnchor::Sw)
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// One of the eight directional resize handles.
    Resize(ResizeAnchor),
    /// Rotation handle (positioned above the top edge).
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in scene coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a scene point hits this handle.
    /// `tolerance` should be adjusted for viewport zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Handles for a single selected object, in its rotated frame.
///
/// `rotate_offset` is the distance of the rotate handle above the top
/// edge, in scene units.
pub fn get_handles(object: &Drawable, rotate_offset: f64) -> Vec<Handle> {
    let bounds = object.bounds();
    let frame = object.rotation_transform();
    let mut handles: Vec<Handle> = ResizeAnchor::ALL
        .into_iter()
        .map(|anchor| Handle::new(frame * anchor.position(bounds), HandleKind::Resize(anchor)))
        .collect();
    let top = Point::new(bounds.center().x, bounds.y0 - rotate_offset);
    handles.push(Handle::new(frame * top, HandleKind::Rotate));
    handles
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(
    object: &Drawable,
    point: Point,
    tolerance: f64,
    rotate_offset: f64,
) -> Option<HandleKind> {
    get_handles(object, rotate_offset)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// Normalized rubber-band rectangle from two drag corners.
pub fn selection_box(start: Point, current: Point) -> Rect {
    Rect::from_points(start, current)
}

/// The ordered set of selected object ids.
///
/// Resize and rotate handles only exist when exactly one object is selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<ShapeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single object.
    pub fn select(&mut self, id: ShapeId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Replace the selection with `ids`, dropping duplicates.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    pub fn add(&mut self, id: ShapeId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Add the object if absent, remove it if present.
    pub fn toggle(&mut self, id: ShapeId) {
        if self.ids.contains(&id) {
            self.remove(id);
        } else {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: ShapeId) {
        self.ids.retain(|s| *s != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids no longer present in the scene.
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.ids.retain(|id| scene.contains(*id));
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.ids.contains(&id)
    }

    /// The selected object when exactly one is selected.
    pub fn single(&self) -> Option<ShapeId> {
        match self.ids.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn first(&self) -> Option<ShapeId> {
        self.ids.first().copied()
    }

    pub fn ids(&self) -> &[ShapeId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Union of the selected objects' bounds.
    pub fn bounds(&self, scene: &Scene) -> Option<Rect> {
        self.ids
            .iter()
            .filter_map(|id| scene.get(*id))
            .map(Drawable::bounds)
            .reduce(|acc, b| acc.union(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind};
    use std::f64::consts::FRAC_PI_2;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Drawable {
        Drawable::Shape(Shape::new(ShapeKind::Rectangle, Point::new(x0, y0), Point::new(x1, y1)))
    }

    #[test]
    fn test_handles() {
        let object = rect(0.0, 0.0, 100.0, 50.0);
        let handles = get_handles(&object, 25.0);

        // 8 resize handles + 1 rotation handle
        assert_eq!(handles.len(), 9);
        assert_eq!(handles[0].kind, HandleKind::Resize(ResizeAnchor::N));
        assert_eq!(handles[0].position, Point::new(50.0, 0.0));
        assert_eq!(handles[3].position, Point::new(100.0, 50.0));
        assert_eq!(handles[8].kind, HandleKind::Rotate);
        assert_eq!(handles[8].position, Point::new(50.0, -25.0));
    }

    #[test]
    fn test_handles_follow_rotation() {
        let mut object = rect(0.0, 0.0, 100.0, 100.0);
        object.set_rotation(FRAC_PI_2);
        let rotate = get_handles(&object, 25.0)[8].position;
        // Top-centre rotated a quarter turn about (50, 50) ends up on the right
        assert!((rotate.x - 125.0).abs() < 1e-9);
        assert!((rotate.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_handle_hit_test() {
        let handle = Handle::new(Point::new(50.0, 50.0), HandleKind::Rotate);
        assert!(handle.hit_test(Point::new(50.0, 50.0), 10.0));
        assert!(handle.hit_test(Point::new(55.0, 55.0), 10.0));
        assert!(!handle.hit_test(Point::new(70.0, 70.0), 10.0));
    }

    #[test]
    fn test_hit_test_handles() {
        let object = rect(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            hit_test_handles(&object, Point::new(98.0, 3.0), 8.0, 25.0),
            Some(HandleKind::Resize(ResizeAnchor::Ne))
        );
        assert_eq!(hit_test_handles(&object, Point::new(50.0, 25.0), 8.0, 25.0), None);
    }

    #[test]
    fn test_toggle_and_single() {
        let a = uuid::Uuid::new_v4();
        let b = uuid::Uuid::new_v4();
        let mut selection = Selection::new();

        selection.select(a);
        assert_eq!(selection.single(), Some(a));

        selection.toggle(b);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.single(), None);

        selection.toggle(a);
        assert_eq!(selection.ids(), &[b]);
    }

    #[test]
    fn test_retain_existing() {
        let mut scene = Scene::new();
        let a = scene.add(rect(0.0, 0.0, 10.0, 10.0));
        let mut selection = Selection::new();
        selection.set([a, uuid::Uuid::new_v4()]);

        selection.retain_existing(&scene);
        assert_eq!(selection.ids(), &[a]);
    }
}
