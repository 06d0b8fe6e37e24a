//! Scale engine: conversion between real space (meters) and canvas space (pixels).
//!
//! Real-space coordinates are anchored to the physical room; canvas-space
//! coordinates are anchored to the rendered viewport. The two are never mixed
//! without an explicit conversion through a [`ScaleState`].

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Reference scale used for procedural placement and as the default view scale.
pub const PIXELS_PER_METER: f64 = 100.0;

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 10.0;

/// Clamp a zoom level into the supported range.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Round a value to the nearest multiple of `step`.
///
/// Idempotent, and safe to apply after every incremental `+step` edit: the
/// result of N such round-after-add operations equals `v0 + N * step` within
/// floating tolerance, so repeated nudges never accumulate drift. Halfway
/// values round away from zero. A non-positive `step` returns the value
/// unchanged.
pub fn round_to_precision(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Snap a point to the nearest grid intersection.
///
/// A non-positive `grid_size` disables snapping and returns the point as-is.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 {
        return point;
    }
    Point::new(
        round_to_precision(point.x, grid_size),
        round_to_precision(point.y, grid_size),
    )
}

/// Grid configuration for the layout canvas.
///
/// `size` is in meters. The grid can be visible without snapping enabled and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Whether snapping to the grid is enabled.
    pub enabled: bool,
    /// Whether the grid is drawn.
    pub visible: bool,
    /// Grid cell size in meters.
    pub size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
            size: 0.5,
        }
    }
}

impl GridConfig {
    /// Snap a real-space point to this grid, honoring the enabled flag.
    pub fn snap(&self, point: Point) -> Point {
        if !self.enabled {
            return point;
        }
        snap_to_grid(point, self.size)
    }
}

/// Immutable scale snapshot mapping real space to canvas space.
///
/// Recomputed whenever zoom or the reference bounds change. The invariant
/// `pixels_per_meter > 0` holds by construction: every constructor derives the
/// scale from a clamped zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleState {
    /// Pixels per meter at the current zoom.
    pixels_per_meter: f64,
    /// Canvas-space offset of the real-space origin, in pixels.
    pub offset: Vec2,
}

impl Default for ScaleState {
    fn default() -> Self {
        Self {
            pixels_per_meter: PIXELS_PER_METER,
            offset: Vec2::ZERO,
        }
    }
}

impl ScaleState {
    /// Create a scale state for the given zoom level (clamped), with no offset.
    pub fn from_zoom(zoom: f64) -> Self {
        Self {
            pixels_per_meter: PIXELS_PER_METER * clamp_zoom(zoom),
            offset: Vec2::ZERO,
        }
    }

    /// Fit the given real-space bounds into a viewport, centered with padding.
    ///
    /// Degenerate bounds fall back to the default scale.
    pub fn fit_to_bounds(bounds: Rect, viewport: Size, padding: f64) -> Self {
        if bounds.is_zero_area() {
            return Self::default();
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let zoom_x = padded.width / (bounds.width() * PIXELS_PER_METER);
        let zoom_y = padded.height / (bounds.height() * PIXELS_PER_METER);
        let pixels_per_meter = PIXELS_PER_METER * clamp_zoom(zoom_x.min(zoom_y));

        // Center the bounds in the viewport
        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        let offset = Vec2::new(
            viewport_center.x - bounds_center.x * pixels_per_meter,
            viewport_center.y - bounds_center.y * pixels_per_meter,
        );

        Self {
            pixels_per_meter,
            offset,
        }
    }

    /// Current scale in pixels per meter. Always positive.
    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Effective zoom level relative to the reference scale.
    pub fn zoom(&self) -> f64 {
        self.pixels_per_meter / PIXELS_PER_METER
    }

    /// Convert a length in meters to pixels.
    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }

    /// Convert a length in pixels to meters.
    pub fn pixels_to_meters(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_meter
    }

    /// Convert a real-space point (meters) to canvas space (pixels).
    pub fn real_to_canvas(&self, point: Point) -> Point {
        Point::new(
            point.x * self.pixels_per_meter + self.offset.x,
            point.y * self.pixels_per_meter + self.offset.y,
        )
    }

    /// Convert a canvas-space point (pixels) to real space (meters).
    pub fn canvas_to_real(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.offset.x) / self.pixels_per_meter,
            (point.y - self.offset.y) / self.pixels_per_meter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_pixels_roundtrip() {
        let scale = ScaleState::from_zoom(1.37);
        for m in [-42.5, -1.0, 0.0, 0.001, 3.14159, 250.0] {
            let back = scale.pixels_to_meters(scale.meters_to_pixels(m));
            assert!((back - m).abs() <= 1e-9, "roundtrip drifted for {m}: {back}");
        }
    }

    #[test]
    fn test_real_canvas_mutual_inverse() {
        let scale = ScaleState {
            pixels_per_meter: 137.0,
            offset: Vec2::new(42.0, -120.5),
        };
        let original = Point::new(12.34, -5.678);
        let canvas = scale.real_to_canvas(original);
        let back = scale.canvas_to_real(canvas);
        assert!((back.x - original.x).abs() <= 1e-9);
        assert!((back.y - original.y).abs() <= 1e-9);
    }

    #[test]
    fn test_round_to_precision_idempotent() {
        let once = round_to_precision(5.2371, 0.05);
        let twice = round_to_precision(once, 0.05);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_to_precision_no_drift() {
        // The core anti-drift contract: 100 nudges of 0.01 from 5.0 land on 6.0.
        let step = 0.01;
        let mut v = 5.0;
        for _ in 0..100 {
            v = round_to_precision(v + step, step);
        }
        assert!((v - 6.0).abs() <= 1e-9, "accumulated drift: {v}");
    }

    #[test]
    fn test_round_to_precision_half_away_from_zero() {
        assert!((round_to_precision(0.25, 0.5) - 0.5).abs() < 1e-12);
        assert!((round_to_precision(-0.25, 0.5) - -0.5).abs() < 1e-12);
    }

    #[test]
    fn test_round_to_precision_bad_step() {
        assert_eq!(round_to_precision(1.234, 0.0), 1.234);
        assert_eq!(round_to_precision(1.234, -0.5), 1.234);
    }

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(Point::new(1.13, 2.87), 0.25);
        assert!((snapped.x - 1.25).abs() < 1e-12);
        assert!((snapped.y - 2.75).abs() < 1e-12);
    }

    #[test]
    fn test_snap_to_grid_disabled_sizes() {
        let p = Point::new(1.13, 2.87);
        assert_eq!(snap_to_grid(p, 0.0), p);
        assert_eq!(snap_to_grid(p, -1.0), p);
    }

    #[test]
    fn test_grid_config_snap_respects_enabled() {
        let p = Point::new(0.9, 1.1);
        let mut grid = GridConfig::default();
        grid.size = 1.0;
        assert_eq!(grid.snap(p), Point::new(1.0, 1.0));
        grid.enabled = false;
        assert_eq!(grid.snap(p), p);
    }

    #[test]
    fn test_clamp_zoom() {
        assert_eq!(clamp_zoom(0.0001), MIN_ZOOM);
        assert_eq!(clamp_zoom(1000.0), MAX_ZOOM);
        assert_eq!(clamp_zoom(1.0), 1.0);
    }

    #[test]
    fn test_from_zoom_clamps() {
        let scale = ScaleState::from_zoom(0.0);
        assert!(scale.pixels_per_meter() > 0.0);
        assert!((scale.zoom() - MIN_ZOOM).abs() < 1e-12);
    }

    #[test]
    fn test_fit_to_bounds_centers() {
        // 10m x 5m room in a 1000x600 viewport with no padding.
        let bounds = Rect::new(0.0, 0.0, 10.0, 5.0);
        let scale = ScaleState::fit_to_bounds(bounds, Size::new(1000.0, 600.0), 0.0);

        // Limited by width: 1000px / 10m = 100 px/m.
        assert!((scale.pixels_per_meter() - 100.0).abs() < 1e-9);

        // Bounds center maps to the viewport center.
        let center = scale.real_to_canvas(bounds.center());
        assert!((center.x - 500.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_degenerate_bounds() {
        let scale = ScaleState::fit_to_bounds(Rect::ZERO, Size::new(800.0, 600.0), 50.0);
        assert_eq!(scale, ScaleState::default());
    }
}
