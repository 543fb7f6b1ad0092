//! Viewport for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};

/// Viewport manages the view transform for the board.
///
/// Device coordinates (as reported by the input source) are first mapped to
/// canvas pixels, which may differ on HiDPI surfaces, then through
/// `scale` and `offset` to scene coordinates:
///
/// `scene = (device * canvas / client - offset) / scale`
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Translation in canvas pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    scale: f64,
    /// Minimum allowed zoom level.
    pub min_scale: f64,
    /// Maximum allowed zoom level.
    pub max_scale: f64,
    /// Backing surface size in canvas pixels.
    canvas_size: Size,
    /// Displayed surface size in device pixels.
    client_size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.1, 10.0)
    }
}

impl Viewport {
    /// Create a viewport with the given zoom limits. Reversed limits are swapped.
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) = if min_scale > max_scale {
            log::warn!("viewport: zoom limits reversed ({min_scale} > {max_scale})");
            (max_scale, min_scale)
        } else {
            (min_scale, max_scale)
        };
        let size = Size::new(800.0, 600.0);
        Self {
            offset: Vec2::ZERO,
            scale: 1.0_f64.max(min_scale).min(max_scale),
            min_scale,
            max_scale,
            canvas_size: size,
            client_size: size,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale without moving the offset, clamped to the limits.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = self.clamp_scale(scale);
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale;
        }
        // The limits are public fields; never trust their order here
        let low = self.min_scale.min(self.max_scale);
        let high = self.min_scale.max(self.max_scale);
        scale.max(low).min(high)
    }

    /// Update the surface sizes (canvas backing store and on-screen client box).
    pub fn set_surface(&mut self, canvas_size: Size, client_size: Size) {
        self.canvas_size = canvas_size;
        self.client_size = client_size;
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Device pixels to canvas pixels.
    fn device_ratio(&self) -> Vec2 {
        let ratio = |canvas: f64, client: f64| {
            if client > 0.0 { canvas / client } else { 1.0 }
        };
        Vec2::new(
            ratio(self.canvas_size.width, self.client_size.width),
            ratio(self.canvas_size.height, self.client_size.height),
        )
    }

    fn device_to_canvas(&self, device: Point) -> Point {
        let ratio = self.device_ratio();
        Point::new(device.x * ratio.x, device.y * ratio.y)
    }

    fn canvas_to_device(&self, canvas: Point) -> Point {
        let ratio = self.device_ratio();
        Point::new(canvas.x / ratio.x, canvas.y / ratio.y)
    }

    /// Scene to canvas-pixel transform, used for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Canvas-pixel to scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a device point to scene coordinates.
    pub fn to_scene(&self, device: Point) -> Point {
        self.inverse_transform() * self.device_to_canvas(device)
    }

    /// Convert a scene point to device coordinates.
    pub fn to_device(&self, scene: Point) -> Point {
        self.canvas_to_device(self.transform() * scene)
    }

    /// Convert a device-pixel distance to a scene distance.
    pub fn device_dist_to_scene(&self, distance: f64) -> f64 {
        distance * self.device_ratio().x / self.scale
    }

    /// Pan by a delta in device pixels.
    pub fn pan(&mut self, device_delta: Vec2) {
        let ratio = self.device_ratio();
        self.offset += Vec2::new(device_delta.x * ratio.x, device_delta.y * ratio.y);
    }

    /// Zoom to `target` scale keeping the scene point under `focal` (device) fixed.
    pub fn zoom_at(&mut self, focal: Point, target: f64) {
        let new_scale = self.clamp_scale(target);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let canvas_point = self.device_to_canvas(focal);
        let scene_point = self.inverse_transform() * canvas_point;

        self.scale = new_scale;

        // Adjust offset so scene_point stays at canvas_point
        self.offset = canvas_point.to_vec2() - scene_point.to_vec2() * self.scale;
    }

    /// Multiply the scale by `factor` around a device point.
    pub fn zoom_by(&mut self, focal: Point, factor: f64) {
        self.zoom_at(focal, self.scale * factor);
    }

    /// Scene point at the centre of the visible canvas.
    pub fn visible_center(&self) -> Point {
        let center = Point::new(self.canvas_size.width / 2.0, self.canvas_size.height / 2.0);
        self.inverse_transform() * center
    }

    /// Reset to 100% with no pan.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }
}
