//! Zoom and pan state for the mind-map view.

use serde::{Deserialize, Serialize};

use crate::layout::Point;

pub const ZOOM_STEP: f64 = 1.2;
pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 3.0;

/// Maps canvas coordinates to screen coordinates: `screen = canvas * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub const fn identity() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    /// Set the zoom level, clamped to [`MIN_SCALE`, `MAX_SCALE`].
    /// Non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::identity();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.offset_x) / self.scale, (p.y - self.offset_y) / self.scale)
    }
}

/// Pointer drag tracking. Each move pans by the delta since the previous sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    last: Option<Point>,
}

impl DragState {
    pub fn begin(&mut self, at: Point) {
        self.last = Some(at);
    }

    /// Pan `view` by the movement since the last sample. Returns false when
    /// no drag is in progress.
    pub fn move_to(&mut self, at: Point, view: &mut ViewTransform) -> bool {
        let Some(last) = self.last else {
            return false;
        };
        view.pan(at.x - last.x, at.y - last.y);
        self.last = Some(at);
        true
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }
}
