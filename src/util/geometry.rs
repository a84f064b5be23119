// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the viewport transforms between screen, canvas and
//! image pixel coordinates, plus hit-testing against drawn regions.

use crate::config::CanvasConfig;
use crate::models::annotation::{BoundingBox, Point};

/// Zoom values at or below this are treated as "nothing on screen".
pub const ZOOM_EPSILON: f64 = 1e-6;

/// Pan/zoom state shared by every image in the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    /// Canvas-space translation applied after scaling.
    pub offset: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(CanvasConfig::default().default_zoom)
    }
}

impl Viewport {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            offset: Point::default(),
        }
    }

    /// Whether the zoom is too small to render or invert.
    pub fn is_degenerate(&self) -> bool {
        self.zoom <= ZOOM_EPSILON
    }

    /// Set the zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64, config: &CanvasConfig) {
        self.zoom = zoom.clamp(config.min_zoom, config.max_zoom);
    }

    /// `image = (canvas - offset) / zoom`. `None` for a degenerate zoom.
    pub fn canvas_to_image(&self, canvas: Point) -> Option<Point> {
        if self.is_degenerate() {
            return None;
        }
        Some(Point::new(
            (canvas.x - self.offset.x) / self.zoom,
            (canvas.y - self.offset.y) / self.zoom,
        ))
    }

    /// `canvas = image * zoom + offset`.
    pub fn image_to_canvas(&self, image: Point) -> Point {
        Point::new(
            image.x * self.zoom + self.offset.x,
            image.y * self.zoom + self.offset.y,
        )
    }

    /// Scale a canvas-space length into image pixels.
    pub fn canvas_len_to_image(&self, len: f64) -> Option<f64> {
        (!self.is_degenerate()).then(|| len / self.zoom)
    }

    /// Canvas pixel size for an image, at least one pixel per axis.
    pub fn canvas_size(&self, image_width: u32, image_height: u32) -> (f64, f64) {
        (
            (image_width as f64 * self.zoom).max(1.0),
            (image_height as f64 * self.zoom).max(1.0),
        )
    }
}

/// Subtract the canvas origin from a raw pointer position.
pub fn screen_to_canvas(screen: Point, canvas_origin: Point) -> Point {
    Point::new(screen.x - canvas_origin.x, screen.y - canvas_origin.y)
}

/// Index of the first region containing `point` (image space).
///
/// Earlier regions win when they overlap, regardless of which one is drawn
/// on top.
pub fn hit_test(regions: &[BoundingBox], point: Point) -> Option<usize> {
    regions.iter().position(|bbox| bbox.contains(point))
}

/// Hit-test a canvas-space point through the viewport.
pub fn hit_test_canvas(regions: &[BoundingBox], viewport: &Viewport, canvas: Point) -> Option<usize> {
    viewport
        .canvas_to_image(canvas)
        .and_then(|point| hit_test(regions, point))
}

/// Normalize two corners into `(x, y, width, height)` with the top-left at
/// the smaller coordinates.
pub fn corners_to_rect(a: Point, b: Point) -> (f64, f64, f64, f64) {
    (
        a.x.min(b.x),
        a.y.min(b.y),
        (b.x - a.x).abs(),
        (b.y - a.y).abs(),
    )
}

/// Size of a preview for a `width` x `height` region that fits inside
/// `max_width` x `max_height` and keeps the region's aspect ratio.
pub fn fit_preview(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    let aspect = width / height;
    let mut preview_width = max_width;
    let mut preview_height = preview_width / aspect;

    if preview_height > max_height {
        preview_height = max_height;
        preview_width = preview_height * aspect;
    }

    (preview_width, preview_height)
}

/// Part of `bbox` that lies on a `width` x `height` image, as
/// `(x0, y0, x1, y1)` image coordinates. `None` when the box misses the image.
pub fn visible_part(bbox: &BoundingBox, width: u32, height: u32) -> Option<(f64, f64, f64, f64)> {
    let x0 = bbox.x.max(0.0);
    let y0 = bbox.y.max(0.0);
    let x1 = (bbox.x + bbox.width).min(width as f64);
    let y1 = (bbox.y + bbox.height).min(height as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::new(x, y, w, h).unwrap()
    }

    #[test]
    fn test_canvas_image_roundtrip() {
        let zooms = [0.1, 0.3, 1.0, 2.5, 4.0];
        let offsets = [Point::new(0.0, 0.0), Point::new(-120.5, 33.25), Point::new(400.0, -8.0)];
        let points = [Point::new(0.0, 0.0), Point::new(17.3, 900.1), Point::new(-50.0, 12.0)];

        for &zoom in &zooms {
            for &offset in &offsets {
                let viewport = Viewport { zoom, offset };
                for &p in &points {
                    let image = viewport.canvas_to_image(p).unwrap();
                    let back = viewport.image_to_canvas(image);
                    assert!((back.x - p.x).abs() < 1e-9);
                    assert!((back.y - p.y).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_canvas_to_image_applies_offset_then_zoom() {
        let viewport = Viewport {
            zoom: 0.5,
            offset: Point::new(10.0, 20.0),
        };
        let image = viewport.canvas_to_image(Point::new(60.0, 70.0)).unwrap();
        assert_eq!(image, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_zero_zoom_does_not_divide() {
        let viewport = Viewport::new(0.0);
        assert!(viewport.is_degenerate());
        assert_eq!(viewport.canvas_to_image(Point::new(5.0, 5.0)), None);
        assert_eq!(viewport.canvas_size(800, 600), (1.0, 1.0));

        let regions = vec![bbox(0.0, 0.0, 100.0, 100.0)];
        assert_eq!(hit_test_canvas(&regions, &viewport, Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_set_zoom_clamps() {
        let config = CanvasConfig::default();
        let mut viewport = Viewport::default();
        assert_eq!(viewport.zoom, 0.3);

        viewport.set_zoom(9.0, &config);
        assert_eq!(viewport.zoom, 4.0);
        viewport.set_zoom(-1.0, &config);
        assert_eq!(viewport.zoom, 0.0);
    }

    #[test]
    fn test_screen_to_canvas() {
        let canvas = screen_to_canvas(Point::new(150.0, 90.0), Point::new(100.0, 40.0));
        assert_eq!(canvas, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_hit_test_first_region_wins_on_overlap() {
        let regions = vec![
            bbox(0.0, 0.0, 100.0, 100.0),
            bbox(50.0, 50.0, 100.0, 100.0),
        ];

        assert_eq!(hit_test(&regions, Point::new(75.0, 75.0)), Some(0));
        assert_eq!(hit_test(&regions, Point::new(120.0, 120.0)), Some(1));
        assert_eq!(hit_test(&regions, Point::new(300.0, 300.0)), None);
    }

    #[test]
    fn test_hit_test_canvas_goes_through_viewport() {
        let regions = vec![bbox(100.0, 100.0, 50.0, 50.0)];
        let viewport = Viewport {
            zoom: 2.0,
            offset: Point::new(10.0, 10.0),
        };

        assert_eq!(hit_test_canvas(&regions, &viewport, Point::new(210.0, 210.0)), Some(0));
        assert_eq!(hit_test_canvas(&regions, &viewport, Point::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_corners_to_rect() {
        let rect = corners_to_rect(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(rect, (10.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_fit_preview_limits_overflowing_dimension() {
        // Wide region fills the width
        let (w, h) = fit_preview(400.0, 100.0, 200.0, 150.0);
        assert!((w - 200.0).abs() < 1e-9);
        assert!((h - 50.0).abs() < 1e-9);

        // Tall region is limited by the height
        let (w, h) = fit_preview(100.0, 300.0, 200.0, 150.0);
        assert!((w - 50.0).abs() < 1e-9);
        assert!((h - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_part_clamps_to_image() {
        assert_eq!(visible_part(&bbox(10.0, 20.0, 30.0, 40.0), 200, 100), Some((10.0, 20.0, 40.0, 60.0)));

        // Hangs off the top-left and bottom-right corners
        assert_eq!(visible_part(&bbox(-20.0, -10.0, 50.0, 30.0), 200, 100), Some((0.0, 0.0, 30.0, 20.0)));
        assert_eq!(visible_part(&bbox(180.0, 90.0, 50.0, 30.0), 200, 100), Some((180.0, 90.0, 200.0, 100.0)));

        // Entirely off the image
        assert_eq!(visible_part(&bbox(-60.0, 10.0, 50.0, 30.0), 200, 100), None);
        assert_eq!(visible_part(&bbox(10.0, 100.0, 50.0, 30.0), 200, 100), None);
    }
}
