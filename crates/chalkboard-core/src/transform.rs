//! Move, resize and rotate of selected objects.
//!
//! Every gesture captures the original objects at pointer-down and
//! recomputes from them on each move, so intermediate frames never drift.

use crate::scene::Scene;
use crate::selection::ResizeAnchor;
use crate::shapes::{Drawable, ShapeId};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use std::f64::consts::TAU;

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// New bounds for a handle drag, computed from the bounds at gesture start.
///
/// Edges attached to the handle follow the pointer. Each dimension is
/// clamped to `min_size`, anchored at the edge opposite the handle, so the
/// box never flips.
pub fn resize_bounds(original: Rect, anchor: ResizeAnchor, pointer: Point, min_size: f64) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (original.x0, original.y0, original.x1, original.y1);

    if anchor.moves_left() {
        x0 = pointer.x;
    }
    if anchor.moves_right() {
        x1 = pointer.x;
    }
    if anchor.moves_top() {
        y0 = pointer.y;
    }
    if anchor.moves_bottom() {
        y1 = pointer.y;
    }

    if x1 - x0 < min_size {
        if anchor.moves_left() {
            x0 = x1 - min_size;
        } else {
            x1 = x0 + min_size;
        }
    }
    if y1 - y0 < min_size {
        if anchor.moves_top() {
            y0 = y1 - min_size;
        } else {
            y1 = y0 + min_size;
        }
    }

    Rect::new(x0, y0, x1, y1)
}

/// Resize an object to an explicit pixel size, keeping its top-left corner.
pub fn resize_to_pixels(object: &mut Drawable, size: Size, min_size: f64) {
    let origin = object.bounds().origin();
    let size = Size::new(size.width.max(min_size), size.height.max(min_size));
    object.apply_bounds(Rect::from_origin_size(origin, size));
}

/// State for moving one or more objects.
#[derive(Debug, Clone)]
pub struct MoveState {
    /// Starting point of the drag.
    pub start_point: Point,
    /// Current point of the drag.
    pub current_point: Point,
    /// Objects as they were at pointer-down.
    pub originals: Vec<Drawable>,
}

impl MoveState {
    pub fn new(start_point: Point, originals: Vec<Drawable>) -> Self {
        Self {
            start_point,
            current_point: start_point,
            originals,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Whether the drag moved anything.
    pub fn has_moved(&self) -> bool {
        self.delta().hypot2() > 0.0
    }

    /// Move to `pointer` and rewrite the live objects.
    pub fn update(&mut self, scene: &mut Scene, pointer: Point) {
        self.current_point = pointer;
        let delta = self.delta();
        for original in &self.originals {
            if let Some(live) = scene.get_mut(original.id()) {
                let mut moved = original.clone();
                moved.translate(delta);
                *live = moved;
            }
        }
    }

    /// Put every object back where it started.
    pub fn restore(&self, scene: &mut Scene) {
        restore_all(scene, &self.originals);
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.originals.iter().map(Drawable::id).collect()
    }
}

/// State for a handle resize of a single object.
#[derive(Debug, Clone)]
pub struct ResizeState {
    pub anchor: ResizeAnchor,
    /// Object as it was at pointer-down.
    pub original: Drawable,
    /// Bounds at pointer-down.
    pub original_bounds: Rect,
    /// Smallest width/height the resize may produce.
    pub min_size: f64,
    changed: bool,
}

impl ResizeState {
    pub fn new(original: Drawable, anchor: ResizeAnchor, min_size: f64) -> Self {
        Self {
            anchor,
            original_bounds: original.bounds(),
            original,
            min_size,
            changed: false,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.original.id()
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Recompute the live object for the current pointer.
    pub fn update(&mut self, scene: &mut Scene, pointer: Point) {
        // Work in the object's unrotated frame
        let local = self.original.rotation_transform().inverse() * pointer;
        let bounds = resize_bounds(self.original_bounds, self.anchor, local, self.min_size);
        let mut resized = self.original.clone();
        resized.apply_bounds(bounds);
        if let Some(live) = scene.get_mut(self.id()) {
            self.changed = resized != self.original;
            *live = resized;
        }
    }

    pub fn restore(&self, scene: &mut Scene) {
        restore_all(scene, std::slice::from_ref(&self.original));
    }
}

/// State for rotating a single object about its bounds centre.
#[derive(Debug, Clone)]
pub struct RotateState {
    /// Object as it was at pointer-down.
    pub original: Drawable,
    pub center: Point,
    /// Pointer angle around the centre at pointer-down.
    pub start_angle: f64,
    changed: bool,
}

impl RotateState {
    pub fn new(original: Drawable, start_point: Point) -> Self {
        let center = original.bounds().center();
        Self {
            start_angle: (start_point - center).atan2(),
            center,
            original,
            changed: false,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.original.id()
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Rotation the object would have with the pointer at `pointer`.
    pub fn angle_at(&self, pointer: Point) -> f64 {
        let angle = (pointer - self.center).atan2();
        normalize_angle(self.original.rotation() + angle - self.start_angle)
    }

    pub fn update(&mut self, scene: &mut Scene, pointer: Point) {
        let rotation = self.angle_at(pointer);
        if let Some(live) = scene.get_mut(self.id()) {
            live.set_rotation(rotation);
            self.changed = (rotation - self.original.rotation()).abs() > f64::EPSILON;
        }
    }

    pub fn restore(&self, scene: &mut Scene) {
        restore_all(scene, std::slice::from_ref(&self.original));
    }
}

fn restore_all(scene: &mut Scene, originals: &[Drawable]) {
    for original in originals {
        if let Some(live) = scene.get_mut(original.id()) {
            *live = original.clone();
        }
    }
}

/// Rotate `point` about `center`.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    Affine::rotate_about(angle, center) * point
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind, Text};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Drawable {
        Drawable::Shape(Shape::new(ShapeKind::Rectangle, Point::new(x0, y0), Point::new(x1, y1)))
    }

    fn approx_rect(a: Rect, b: Rect) -> bool {
        (a.x0 - b.x0).abs() < 1e-9
            && (a.y0 - b.y0).abs() < 1e-9
            && (a.x1 - b.x1).abs() < 1e-9
            && (a.y1 - b.y1).abs() < 1e-9
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert_eq!(normalize_angle(TAU), 0.0);
        assert!(normalize_angle(-1e-20) < TAU);
    }

    #[test]
    fn test_corner_resize() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = resize_bounds(original, ResizeAnchor::Se, Point::new(150.0, 120.0), 20.0);
        assert!(approx_rect(bounds, Rect::new(0.0, 0.0, 150.0, 120.0)));

        let bounds = resize_bounds(original, ResizeAnchor::Nw, Point::new(-10.0, 30.0), 20.0);
        assert!(approx_rect(bounds, Rect::new(-10.0, 30.0, 100.0, 100.0)));
    }

    #[test]
    fn test_edge_resize_changes_one_axis() {
        let original = Rect::new(0.0, 0.0, 100.0, 50.0);
        let bounds = resize_bounds(original, ResizeAnchor::E, Point::new(180.0, 999.0), 20.0);
        assert!(approx_rect(bounds, Rect::new(0.0, 0.0, 180.0, 50.0)));

        let bounds = resize_bounds(original, ResizeAnchor::N, Point::new(-500.0, 10.0), 20.0);
        assert!(approx_rect(bounds, Rect::new(0.0, 10.0, 100.0, 50.0)));
    }

    #[test]
    fn test_resize_clamps_past_minimum() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        for anchor in ResizeAnchor::ALL {
            // Drag far past the opposite side
            let far = anchor.position(original) + (original.center() - anchor.position(original)) * 10.0;
            let bounds = resize_bounds(original, anchor, far, 20.0);
            assert!(bounds.width() >= 20.0 - 1e-9, "{anchor:?}");
            assert!(bounds.height() >= 20.0 - 1e-9, "{anchor:?}");
        }

        let bounds = resize_bounds(original, ResizeAnchor::Se, Point::new(-300.0, -300.0), 20.0);
        assert!(approx_rect(bounds, Rect::new(0.0, 0.0, 20.0, 20.0)));

        let bounds = resize_bounds(original, ResizeAnchor::Nw, Point::new(400.0, 400.0), 20.0);
        assert!(approx_rect(bounds, Rect::new(80.0, 80.0, 100.0, 100.0)));
    }

    #[test]
    fn test_resize_state_uses_original_bounds() {
        let mut scene = Scene::new();
        let object = rect(0.0, 0.0, 100.0, 100.0);
        let id = scene.add(object.clone());

        let mut state = ResizeState::new(object, ResizeAnchor::Se, 20.0);
        state.update(&mut scene, Point::new(200.0, 200.0));
        state.update(&mut scene, Point::new(150.0, 120.0));

        let bounds = scene.get(id).map(Drawable::bounds);
        assert_eq!(bounds, Some(Rect::new(0.0, 0.0, 150.0, 120.0)));
        assert!(state.has_changed());
    }

    #[test]
    fn test_resize_back_to_start_is_unchanged() {
        let mut scene = Scene::new();
        let object = rect(0.0, 0.0, 100.0, 100.0);
        scene.add(object.clone());

        let mut state = ResizeState::new(object, ResizeAnchor::Se, 20.0);
        state.update(&mut scene, Point::new(100.0, 100.0));
        assert!(!state.has_changed());

        state.update(&mut scene, Point::new(140.0, 100.0));
        assert!(state.has_changed());
        state.update(&mut scene, Point::new(100.0, 100.0));
        assert!(!state.has_changed());
    }

    #[test]
    fn test_rotate_without_turning_is_unchanged() {
        let mut scene = Scene::new();
        let object = rect(0.0, 0.0, 100.0, 100.0);
        scene.add(object.clone());

        let mut state = RotateState::new(object, Point::new(50.0, -25.0));
        // Further out along the same ray
        state.update(&mut scene, Point::new(50.0, -60.0));
        assert!(!state.has_changed());
        state.update(&mut scene, Point::new(125.0, 50.0));
        assert!(state.has_changed());
    }

    #[test]
    fn test_text_resize_scales_font() {
        let mut scene = Scene::new();
        let object = Drawable::Text(Text::new(Point::new(0.0, 20.0), "ab".to_string(), 20.0));
        let id = scene.add(object.clone());

        let mut state = ResizeState::new(object, ResizeAnchor::S, 20.0);
        state.update(&mut scene, Point::new(0.0, 40.0));

        let text = scene.get(id).and_then(Drawable::as_text);
        assert_eq!(text.map(|t| t.font_size), Some(40.0));
        assert_eq!(text.map(|t| t.anchor), Some(Point::new(0.0, 40.0)));
    }

    #[test]
    fn test_move_state() {
        let mut scene = Scene::new();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 20.0, 30.0, 30.0);
        let (ida, idb) = (scene.add(a.clone()), scene.add(b.clone()));

        let mut state = MoveState::new(Point::new(5.0, 5.0), vec![a, b]);
        state.update(&mut scene, Point::new(10.0, 10.0));
        state.update(&mut scene, Point::new(15.0, 25.0));
        assert!(state.has_moved());

        assert_eq!(scene.get(ida).map(Drawable::bounds), Some(Rect::new(10.0, 20.0, 20.0, 30.0)));
        assert_eq!(scene.get(idb).map(Drawable::bounds), Some(Rect::new(30.0, 40.0, 40.0, 50.0)));

        state.restore(&mut scene);
        assert_eq!(scene.get(ida).map(Drawable::bounds), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rotate_state() {
        let mut scene = Scene::new();
        let object = rect(0.0, 0.0, 100.0, 100.0);
        let id = scene.add(object.clone());

        // Grab above the centre and sweep a quarter turn clockwise
        let mut state = RotateState::new(object, Point::new(50.0, -25.0));
        state.update(&mut scene, Point::new(125.0, 50.0));
        let rotation = scene.get(id).map(Drawable::rotation).unwrap_or_default();
        assert!((rotation - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_wraps_into_range() {
        let mut object = rect(0.0, 0.0, 100.0, 100.0);
        object.set_rotation(3.0 * FRAC_PI_2);
        let state = RotateState::new(object, Point::new(50.0, -25.0));

        // Pushes past 2π
        let angle = state.angle_at(Point::new(-25.0, 50.0));
        assert!((0.0..TAU).contains(&angle));
        let angle = state.angle_at(rotate_point(Point::new(50.0, -25.0), Point::new(50.0, 50.0), PI));
        assert!((0.0..TAU).contains(&angle));
        assert!((angle - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_resize_to_pixels() {
        let mut object = rect(10.0, 10.0, 60.0, 60.0);
        resize_to_pixels(&mut object, Size::new(200.0, 5.0), 20.0);
        assert_eq!(object.bounds(), Rect::new(10.0, 10.0, 210.0, 30.0));
    }
}
