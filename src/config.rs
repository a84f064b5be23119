// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application defaults.
//!
//! Nothing here is read from disk; the session lives only in memory.

/// Canvas, zoom and drawing defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Zoom applied to a fresh session.
    pub default_zoom: f64,
    /// Lower bound of the zoom slider. Zero is allowed and renders nothing.
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Slider and View menu zoom increment.
    pub zoom_step: f64,
    /// Drawn rectangles must exceed this size (image pixels) on both axes.
    pub min_box_size: f64,
    /// Bounds of the hover preview crop.
    pub preview_max_width: f64,
    pub preview_max_height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_zoom: 0.3,
            min_zoom: 0.0,
            max_zoom: 4.0,
            zoom_step: 0.1,
            min_box_size: 5.0,
            preview_max_width: 200.0,
            preview_max_height: 150.0,
        }
    }
}

/// Region export encoding presets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Quality (0.0 to 1.0) for the lossy formats.
    pub lossy_quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { lossy_quality: 0.92 }
    }
}

impl ExportConfig {
    /// Quality on the 1 to 100 scale used by the JPEG encoder.
    pub fn jpeg_quality(&self) -> u8 {
        (self.lossy_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Quality on the 0 to 100 scale used by the WebP encoder.
    pub fn webp_quality(&self) -> f32 {
        (self.lossy_quality * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_quality_from_preset() {
        assert_eq!(ExportConfig::default().jpeg_quality(), 92);
        assert_eq!(ExportConfig { lossy_quality: 0.0 }.jpeg_quality(), 1);
        assert_eq!(ExportConfig { lossy_quality: 1.5 }.jpeg_quality(), 100);
    }

    #[test]
    fn test_webp_quality_from_preset() {
        assert!((ExportConfig::default().webp_quality() - 92.0).abs() < 1e-3);
        assert_eq!(ExportConfig { lossy_quality: 1.5 }.webp_quality(), 100.0);
    }
}
