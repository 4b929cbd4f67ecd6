//! Canvas-level pan and zoom, and the mapping between anchor percentages and
//! canvas-local screen units.

use crate::graph::model::Position;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;

/// A point in canvas-local screen units (pixels, or cells in the terminal).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Pan is a screen-unit offset; zoom scales the whole scene about the canvas
/// centre. Nodes are never scaled individually.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Point,
    zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_screen(&self, anchor: Position, canvas: CanvasSize) -> Point {
        let center = canvas.center();
        let local_x = anchor.x / 100.0 * canvas.width;
        let local_y = anchor.y / 100.0 * canvas.height;
        Point::new(
            center.x + (local_x - center.x) * self.zoom + self.pan.x,
            center.y + (local_y - center.y) * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewport::to_screen`]. The result is not clamped, so
    /// points outside the canvas map outside `[0, 100]`.
    pub fn to_anchor(&self, point: Point, canvas: CanvasSize) -> Position {
        let center = canvas.center();
        let local_x = (point.x - self.pan.x - center.x) / self.zoom + center.x;
        let local_y = (point.y - self.pan.y - center.y) / self.zoom + center.y;
        Position::new(
            percent_of(local_x, canvas.width),
            percent_of(local_y, canvas.height),
        )
    }
}

fn percent_of(value: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        value / extent * 100.0
    } else {
        50.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: CanvasSize = CanvasSize {
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn identity_viewport_maps_percent_to_canvas_units() {
        let viewport = Viewport::default();
        assert_eq!(
            viewport.to_screen(Position::new(25.0, 50.0), CANVAS),
            Point::new(50.0, 50.0)
        );
    }

    #[test]
    fn zoom_scales_about_center_and_pan_translates() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(2.0);
        viewport.pan_by(10.0, -5.0);
        assert_eq!(
            viewport.to_screen(Position::CENTER, CANVAS),
            Point::new(110.0, 45.0)
        );
        assert_eq!(
            viewport.to_screen(Position::new(75.0, 50.0), CANVAS),
            Point::new(210.0, 45.0)
        );
    }

    #[test]
    fn to_anchor_inverts_to_screen() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(1.5);
        viewport.pan_by(-12.0, 7.0);
        let anchor = Position::new(80.0, 10.0);
        let back = viewport.to_anchor(viewport.to_screen(anchor, CANVAS), CANVAS);
        assert!((back.x - anchor.x).abs() < 1e-9);
        assert!((back.y - anchor.y).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..20 {
            viewport.zoom_by(1.2);
        }
        assert_eq!(viewport.zoom(), MAX_ZOOM);
        for _ in 0..40 {
            viewport.zoom_by(1.0 / 1.2);
        }
        assert_eq!(viewport.zoom(), MIN_ZOOM);
        viewport.set_zoom(f64::NAN);
        assert_eq!(viewport.zoom(), MIN_ZOOM);
    }

    #[test]
    fn reset_restores_zoom_and_pan() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(2.0);
        viewport.pan_by(3.0, 4.0);
        viewport.reset();
        assert_eq!(viewport, Viewport::default());
    }
}
