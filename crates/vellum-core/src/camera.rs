//! Camera module: the mapping between world coordinates and view pixels.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom (view pixels per world unit).
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom.
pub const MAX_ZOOM: f64 = 12.0;
/// Zoom multiplier applied per wheel step.
pub const ZOOM_STEP_FACTOR: f64 = 1.15;
/// Wheel delta units that make up one zoom step.
pub const WHEEL_UNITS_PER_STEP: f64 = 120.0;

/// Camera manages the view transform of the canvas.
///
/// `world_to_view(p) = p * zoom + pan` and `view_to_world(p) = (p - pan) / zoom`.
/// The world plane is unbounded, so panning is never clamped; zoom is kept
/// within `[min_zoom, max_zoom]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// View-space position of the world origin.
    pub pan: Vec2,
    /// View pixels per world unit.
    zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Multiplier for one zoom step.
    pub step_factor: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            step_factor: ZOOM_STEP_FACTOR,
        }
    }
}

impl Camera {
    /// Create a new camera at zoom 1 with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom bounds and step factor.
    pub fn with_limits(min_zoom: f64, max_zoom: f64, step_factor: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            step_factor,
            ..Self::default()
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom directly, clamped to the allowed range. Pan is untouched.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Affine transform from world to view coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Affine transform from view to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a world point to view coordinates.
    pub fn world_to_view(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan.x, world.y * self.zoom + self.pan.y)
    }

    /// Convert a view point to world coordinates.
    pub fn view_to_world(&self, view: Point) -> Point {
        Point::new((view.x - self.pan.x) / self.zoom, (view.y - self.pan.y) / self.zoom)
    }

    /// Transform both corners and normalize.
    pub fn world_rect_to_view(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.world_to_view(Point::new(rect.x0, rect.y0)),
            self.world_to_view(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Transform both corners and normalize.
    pub fn view_rect_to_world(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.view_to_world(Point::new(rect.x0, rect.y0)),
            self.view_to_world(Point::new(rect.x1, rect.y1)),
        )
    }

    /// World-space rectangle covered by a viewport of the given size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        self.view_rect_to_world(Rect::from_origin_size(Point::ZERO, viewport))
    }

    /// Convert a length in view pixels to world units at the current zoom.
    pub fn view_length_to_world(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// Pan by a view-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `step_factor.powf(steps)`, keeping the world point under
    /// `anchor_view` fixed on screen. `steps` may be fractional.
    pub fn zoom_at(&mut self, anchor_view: Point, steps: f64) {
        let anchor_world = self.view_to_world(anchor_view);
        self.set_zoom(self.zoom * self.step_factor.powf(steps));
        self.pan = Vec2::new(
            anchor_view.x - anchor_world.x * self.zoom,
            anchor_view.y - anchor_world.y * self.zoom,
        );
    }

    /// Zoom from a raw wheel delta (120 units per step).
    pub fn zoom_by_wheel(&mut self, anchor_view: Point, wheel_delta: f64) {
        self.zoom_at(anchor_view, wheel_delta / WHEEL_UNITS_PER_STEP);
    }

    /// Reset to zoom 1 with no pan.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the camera to show the given bounding box. A box that is flat on
    /// one axis is fitted along the other; a single point resets the zoom.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        let bounds = bounds.abs();
        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let (w, h) = (bounds.width(), bounds.height());
        let zoom = match (w > 0.0, h > 0.0) {
            (true, true) => (padded.width / w).min(padded.height / h),
            (true, false) => padded.width / w,
            (false, true) => padded.height / h,
            (false, false) => 1.0,
        };
        self.set_zoom(zoom);

        let center = bounds.center();
        self.pan = Vec2::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }
}
