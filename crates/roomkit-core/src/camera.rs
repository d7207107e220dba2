//! Device-to-floor projection.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Projects a device-space pointer position onto the floor plane.
///
/// Returns `None` when the pointer ray misses the floor. The core never
/// inspects device coordinates itself; every pointer position goes through
/// one of these.
pub trait GroundProjector {
    fn project(&self, device_position: Point) -> Option<Point>;
}

impl<F> GroundProjector for F
where
    F: Fn(Point) -> Option<Point>,
{
    fn project(&self, device_position: Point) -> Option<Point> {
        self(device_position)
    }
}

/// Default scale of the floor view: device pixels per grid unit.
pub const DEFAULT_PIXELS_PER_UNIT: f64 = 50.0;

/// Overhead camera looking straight down at the floor.
///
/// A pan offset and a zoom (device pixels per world unit) map device
/// coordinates onto the floor plane. Every pointer ray hits the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorCamera {
    /// Current translation offset (pan), in device pixels.
    pub offset: Vec2,
    /// Device pixels per world unit.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for FloorCamera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: DEFAULT_PIXELS_PER_UNIT,
            min_zoom: 5.0,
            max_zoom: 500.0,
        }
    }
}

impl FloorCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-device transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Device-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in device pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom, keeping the given device point over the same floor point.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    /// Fit the camera so `bounds` fills the viewport, minus `padding` pixels.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.offset = Vec2::ZERO;
            self.zoom = DEFAULT_PIXELS_PER_UNIT;
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let bounds_center = bounds.center();
        self.offset = Vec2::new(
            viewport.width / 2.0 - bounds_center.x * self.zoom,
            viewport.height / 2.0 - bounds_center.y * self.zoom,
        );
    }
}

impl GroundProjector for FloorCamera {
    fn project(&self, device_position: Point) -> Option<Point> {
        Some(self.screen_to_world(device_position))
    }
}
