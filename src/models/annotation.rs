// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region data structures.
//!
//! This module defines the axis-aligned bounding boxes drawn over an image
//! and the ordered region set that holds them.

use serde::{Deserialize, Serialize};

/// A 2D point. Which space it lives in (screen, canvas or image pixels)
/// depends on where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in original-image pixel units.
///
/// Boxes are never mutated after creation; edits replace the whole
/// [`RegionSet`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a box. Returns `None` unless both dimensions are positive.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        (width > 0.0 && height > 0.0).then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// The ordered regions of one image at one point in history.
///
/// Order is draw order, and region `i` takes label `i` of the current
/// label series.
pub type RegionSet = Vec<BoundingBox>;
