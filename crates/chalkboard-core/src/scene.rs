//! Ordered store of drawable objects.

use crate::shapes::{Drawable, ShapeId, rects_overlap};
use kurbo::{Point, Rect};

/// The scene: drawables in z-order (back to front).
///
/// Mutation never reorders; a dragged object keeps its place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    objects: Vec<Drawable>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from objects already in z-order.
    pub fn from_objects(objects: Vec<Drawable>) -> Self {
        Self { objects }
    }

    /// Append an object on top of the z-order.
    pub fn add(&mut self, object: Drawable) -> ShapeId {
        let id = object.id();
        self.objects.push(object);
        id
    }

    /// Remove an object, returning it if present.
    pub fn remove(&mut self, id: ShapeId) -> Option<Drawable> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every object whose id is in `ids`, returning the number removed.
    pub fn remove_all(&mut self, ids: &[ShapeId]) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !ids.contains(&o.id()));
        before - self.objects.len()
    }

    /// Remove all objects.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Replace the whole contents.
    pub fn replace(&mut self, objects: Vec<Drawable>) {
        self.objects = objects;
    }

    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Get an object by id.
    pub fn get(&self, id: ShapeId) -> Option<&Drawable> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Get a mutable reference to an object by id.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Drawable> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Objects in z-order (back to front).
    pub fn objects_in_z_order(&self) -> &[Drawable] {
        &self.objects
    }

    /// Ids in z-order.
    pub fn ids(&self) -> Vec<ShapeId> {
        self.objects.iter().map(Drawable::id).collect()
    }

    /// Objects whose bounds overlap `bounds` (touching counts), in z-order.
    pub fn objects_overlapping(&self, bounds: Rect) -> Vec<ShapeId> {
        self.objects
            .iter()
            .filter(|o| rects_overlap(o.bounds(), bounds))
            .map(Drawable::id)
            .collect()
    }

    /// Topmost object hit by a scene point.
    pub fn hit_test(&self, point: Point) -> Option<ShapeId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.hit_test(point))
            .map(Drawable::id)
    }

    /// Union of all object bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Drawable::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Deep copy of the objects, used for history snapshots.
    pub fn snapshot(&self) -> Vec<Drawable> {
        self.objects.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Drawable {
        Drawable::Shape(Shape::new(ShapeKind::Rectangle, Point::new(x0, y0), Point::new(x1, y1)))
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = Scene::new();
        let id = scene.add(rect(0.0, 0.0, 100.0, 100.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.get(id).is_some());

        let removed = scene.remove(id);
        assert!(removed.is_some());
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut scene = Scene::new();
        let a = scene.add(rect(0.0, 0.0, 10.0, 10.0));
        let b = scene.add(rect(5.0, 5.0, 15.0, 15.0));
        let c = scene.add(rect(20.0, 20.0, 30.0, 30.0));

        if let Some(obj) = scene.get_mut(a) {
            obj.translate(kurbo::Vec2::new(100.0, 0.0));
        }
        assert_eq!(scene.ids(), vec![a, b, c]);
    }

    #[test]
    fn test_topmost_wins_hit_test() {
        let mut scene = Scene::new();
        let a = scene.add(rect(0.0, 0.0, 100.0, 100.0));
        let b = scene.add(rect(50.0, 50.0, 150.0, 150.0));

        assert_eq!(scene.hit_test(Point::new(75.0, 75.0)), Some(b));
        assert_eq!(scene.hit_test(Point::new(25.0, 25.0)), Some(a));
        assert_eq!(scene.hit_test(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_objects_overlapping() {
        let mut scene = Scene::new();
        let a = scene.add(rect(0.0, 0.0, 100.0, 100.0));
        let _b = scene.add(rect(200.0, 200.0, 300.0, 300.0));

        assert_eq!(scene.objects_overlapping(Rect::new(90.0, 90.0, 120.0, 120.0)), vec![a]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut scene = Scene::new();
        let id = scene.add(rect(0.0, 0.0, 10.0, 10.0));
        let snapshot = scene.snapshot();

        if let Some(obj) = scene.get_mut(id) {
            obj.translate(kurbo::Vec2::new(50.0, 50.0));
        }
        assert_eq!(snapshot[0].bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }
}
