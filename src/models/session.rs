// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state management.
//!
//! The session owns the loaded images (each with its own history), the
//! label series, the shared viewport and the pointer state. Every mutation
//! goes through a method here and marks the session dirty so the UI redraws
//! exactly once before handling the next input.

use super::annotation::{BoundingBox, Point, RegionSet};
use super::history::HistoryLog;
use super::labels::LabelSeriesCollection;
use crate::config::{CanvasConfig, ExportConfig};
use crate::io::export::{ExportFormat, ExportRequest};
use crate::io::media::DecodedImage;
use crate::ui::pointer::{PointerButton, PointerController, PointerOutcome};
use crate::util::geometry::Viewport;
use image::RgbaImage;
use std::sync::Arc;

/// One loaded image and its annotation history.
#[derive(Debug, Clone)]
pub struct ImageSession {
    id: u64,
    pub name: String,
    /// Encoded file contents as loaded.
    pub data: Arc<Vec<u8>>,
    pub pixels: Arc<RgbaImage>,
    history: HistoryLog,
}

impl ImageSession {
    pub fn new(id: u64, decoded: DecodedImage) -> Self {
        Self {
            id,
            name: decoded.name,
            data: Arc::new(decoded.data),
            pixels: Arc::new(decoded.pixels),
            history: HistoryLog::new(),
        }
    }

    /// Identifier unique within the session, stable across deletions.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Current regions, always the history's current snapshot.
    pub fn regions(&self) -> &RegionSet {
        self.history.current_region_set()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}

/// Top-level in-memory state of the application.
#[derive(Debug)]
pub struct Session {
    images: Vec<ImageSession>,
    active: usize,
    next_id: u64,
    pub labels: LabelSeriesCollection,
    pub viewport: Viewport,
    pub pointer: PointerController,
    pub export_format: ExportFormat,
    pub config: CanvasConfig,
    dirty: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Session {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            images: Vec::new(),
            active: 0,
            next_id: 0,
            labels: LabelSeriesCollection::new(),
            viewport: Viewport::new(config.default_zoom),
            pointer: PointerController::new(),
            export_format: ExportFormat::default(),
            config,
            dirty: false,
        }
    }

    /// Flag that something visible changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ---- image list ----

    /// Replace the image list with a freshly loaded batch, each image
    /// starting from an empty history.
    pub fn replace_images(&mut self, batch: Vec<DecodedImage>) {
        self.images = batch
            .into_iter()
            .map(|decoded| {
                let id = self.next_id;
                self.next_id += 1;
                ImageSession::new(id, decoded)
            })
            .collect();
        self.active = 0;
        self.pointer.reset();
        self.mark_dirty();
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_image(&self) -> Option<&ImageSession> {
        self.images.get(self.active)
    }

    pub fn has_prev(&self) -> bool {
        self.active > 0
    }

    pub fn has_next(&self) -> bool {
        self.active + 1 < self.images.len()
    }

    pub fn next_image(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.active += 1;
        self.pointer.reset();
        self.mark_dirty();
        true
    }

    pub fn prev_image(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.active -= 1;
        self.pointer.reset();
        self.mark_dirty();
        true
    }

    /// Drop the active image. The next image (or the new last one) becomes
    /// active.
    pub fn delete_active_image(&mut self) -> Option<ImageSession> {
        if self.active >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(self.active);
        self.active = self.active.min(self.images.len().saturating_sub(1));
        self.pointer.reset();
        self.mark_dirty();
        Some(removed)
    }

    // ---- history ----

    fn active_history_mut(&mut self) -> Option<&mut HistoryLog> {
        self.images.get_mut(self.active).map(|img| &mut img.history)
    }

    /// Current regions of the active image (empty without an image).
    pub fn regions(&self) -> &[BoundingBox] {
        self.active_image().map(|img| img.regions().as_slice()).unwrap_or(&[])
    }

    /// Commit a drawn box to the active image.
    pub fn draw_region(&mut self, bbox: BoundingBox) -> bool {
        let Some(history) = self.active_history_mut() else {
            return false;
        };
        history.draw(bbox);
        let total = history.current_region_set().len();
        log::info!("Added region, total: {}", total);
        self.mark_dirty();
        true
    }

    /// Remove a region of the active image as a new history entry.
    pub fn delete_region(&mut self, index: usize) -> bool {
        let Some(history) = self.active_history_mut() else {
            return false;
        };
        if !history.delete(index) {
            return false;
        }
        let total = history.current_region_set().len();
        log::info!("Deleted region {}, total: {}", index, total);
        self.pointer.clear_selection();
        self.mark_dirty();
        true
    }

    /// Select a region of the active image. Out-of-range indices are ignored.
    pub fn select_region(&mut self, index: usize) -> bool {
        if index >= self.regions().len() {
            return false;
        }
        self.pointer.select(Some(index));
        self.mark_dirty();
        true
    }

    pub fn delete_selected_region(&mut self) -> bool {
        match self.pointer.selected() {
            Some(index) => self.delete_region(index),
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.active_history_mut().is_some_and(HistoryLog::undo);
        if changed {
            log::info!("Undo");
            self.pointer.clear_selection();
            self.mark_dirty();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.active_history_mut().is_some_and(HistoryLog::redo);
        if changed {
            log::info!("Redo");
            self.pointer.clear_selection();
            self.mark_dirty();
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.active_image().is_some_and(|img| img.history.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.active_image().is_some_and(|img| img.history.can_redo())
    }

    // ---- viewport ----

    pub fn set_zoom(&mut self, zoom: f64) {
        let config = self.config;
        let before = self.viewport.zoom;
        self.viewport.set_zoom(zoom, &config);
        if self.viewport.zoom != before {
            self.mark_dirty();
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.viewport.zoom + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.viewport.zoom - self.config.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(self.config.default_zoom);
    }

    // ---- pointer ----

    pub fn pointer_pressed(
        &mut self,
        screen: Point,
        canvas: Point,
        button: PointerButton,
        pan_modifier: bool,
    ) -> PointerOutcome {
        let regions = self
            .images
            .get(self.active)
            .map(|img| img.regions().as_slice())
            .unwrap_or(&[]);
        let outcome = self
            .pointer
            .press(screen, canvas, button, pan_modifier, regions, &self.viewport);
        self.note_pointer(outcome)
    }

    pub fn pointer_moved(&mut self, screen: Point, canvas: Point) -> PointerOutcome {
        let regions = self
            .images
            .get(self.active)
            .map(|img| img.regions().as_slice())
            .unwrap_or(&[]);
        let outcome = self.pointer.moved(screen, canvas, regions, &mut self.viewport);
        self.note_pointer(outcome)
    }

    /// Finish a pan or draw. A drawn box is returned for the caller to
    /// commit with [`Session::draw_region`].
    pub fn pointer_released(&mut self, canvas: Point) -> PointerOutcome {
        let min_box_size = self.config.min_box_size;
        let outcome = self.pointer.release(canvas, &self.viewport, min_box_size);
        self.note_pointer(outcome)
    }

    pub fn pointer_left(&mut self) -> PointerOutcome {
        let outcome = self.pointer.leave();
        self.note_pointer(outcome)
    }

    fn note_pointer(&mut self, outcome: PointerOutcome) -> PointerOutcome {
        match outcome {
            PointerOutcome::None => {}
            PointerOutcome::DrawDiscarded => {
                log::debug!("Discarded rectangle below {} px", self.config.min_box_size);
                self.mark_dirty();
            }
            other => {
                log::trace!("Pointer: {:?}", other);
                self.mark_dirty();
            }
        }
        outcome
    }

    // ---- labels & export ----

    pub fn add_label_series(&mut self) {
        let added = self.labels.add_series();
        log::info!("Added label series '{}'", added.name);
        self.mark_dirty();
    }

    pub fn select_label_series(&mut self, id: &str) {
        if self.labels.select(id) {
            self.mark_dirty();
        }
    }

    pub fn set_current_labels(&mut self, labels: String) {
        self.labels.set_current_labels(labels);
        self.mark_dirty();
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        if self.export_format != format {
            self.export_format = format;
            self.mark_dirty();
        }
    }

    /// Snapshot what the export needs from the active image.
    pub fn export_request(&self, config: ExportConfig) -> Option<ExportRequest> {
        let image = self.active_image()?;
        Some(ExportRequest {
            source_name: image.name.clone(),
            image: Arc::clone(&image.pixels),
            regions: image.regions().clone(),
            labels: self.labels.current_labels(),
            format: self.export_format,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(name: &str) -> DecodedImage {
        DecodedImage {
            name: name.to_string(),
            data: Vec::new(),
            pixels: RgbaImage::new(200, 100),
        }
    }

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::default();
        session.replace_images(names.iter().map(|n| decoded(n)).collect());
        session.take_dirty();
        session
    }

    fn bbox(x: f64) -> BoundingBox {
        BoundingBox::new(x, x, 10.0, 10.0).unwrap()
    }

    #[test]
    fn test_history_is_scoped_per_image() {
        let mut session = session_with(&["a.png", "b.png"]);
        session.draw_region(bbox(1.0));
        session.draw_region(bbox(2.0));

        session.next_image();
        assert!(session.regions().is_empty());
        assert!(!session.can_undo());
        session.undo();

        session.prev_image();
        assert_eq!(session.regions().len(), 2);
    }

    #[test]
    fn test_mutations_mark_dirty_once() {
        let mut session = session_with(&["a.png"]);
        assert!(!session.take_dirty());

        session.draw_region(bbox(1.0));
        assert!(session.take_dirty());
        assert!(!session.take_dirty());

        // Boundary no-ops do not request a redraw
        session.redo();
        assert!(!session.take_dirty());
        session.undo();
        assert!(session.take_dirty());
    }

    #[test]
    fn test_delete_active_image_clamps_index() {
        let mut session = session_with(&["a.png", "b.png", "c.png"]);
        session.next_image();
        session.next_image();
        assert_eq!(session.active_index(), 2);

        let removed = session.delete_active_image().unwrap();
        assert_eq!(removed.name, "c.png");
        assert_eq!(session.active_index(), 1);
        assert_eq!(session.active_image().unwrap().name, "b.png");

        session.delete_active_image();
        session.delete_active_image();
        assert_eq!(session.image_count(), 0);
        assert!(session.active_image().is_none());
        assert!(session.delete_active_image().is_none());
    }

    #[test]
    fn test_image_ids_are_unique_across_batches() {
        let mut session = session_with(&["a.png", "b.png"]);
        let first = session.active_image().unwrap().id();
        session.next_image();
        let second = session.active_image().unwrap().id();
        assert_ne!(first, second);

        session.replace_images(vec![decoded("c.png")]);
        let third = session.active_image().unwrap().id();
        assert!(third != first && third != second);
    }

    #[test]
    fn test_pointer_draw_commits_through_caller() {
        let mut session = session_with(&["a.png"]);
        session.viewport = Viewport::new(1.0);

        let start = Point::new(10.0, 10.0);
        let end = Point::new(40.0, 30.0);
        session.pointer_pressed(start, start, PointerButton::Primary, false);
        session.pointer_moved(end, end);
        let PointerOutcome::BoxDrawn(drawn) = session.pointer_released(end) else {
            panic!("expected a box");
        };
        assert!(session.regions().is_empty());

        session.draw_region(drawn);
        assert_eq!(session.regions(), &[BoundingBox::new(10.0, 10.0, 30.0, 20.0).unwrap()]);
    }

    #[test]
    fn test_delete_selected_region() {
        let mut session = session_with(&["a.png"]);
        session.viewport = Viewport::new(1.0);
        session.draw_region(BoundingBox::new(0.0, 0.0, 50.0, 50.0).unwrap());
        session.draw_region(BoundingBox::new(100.0, 0.0, 50.0, 50.0).unwrap());

        let p = Point::new(120.0, 20.0);
        session.pointer_pressed(p, p, PointerButton::Primary, false);
        session.pointer_released(p);
        assert_eq!(session.pointer.selected(), Some(1));

        assert!(session.delete_selected_region());
        assert_eq!(session.regions().len(), 1);
        assert!(!session.select_region(1));
        assert!(session.select_region(0));
        assert_eq!(session.pointer.selected(), Some(0));
        session.pointer.clear_selection();
        assert_eq!(session.pointer.selected(), None);
        assert!(!session.delete_selected_region());

        session.undo();
        assert_eq!(session.regions().len(), 2);
    }

    #[test]
    fn test_zoom_controls() {
        let mut session = Session::default();
        session.zoom_in();
        assert!((session.viewport.zoom - 0.4).abs() < 1e-9);
        session.set_zoom(10.0);
        assert_eq!(session.viewport.zoom, 4.0);
        session.reset_zoom();
        assert_eq!(session.viewport.zoom, 0.3);
    }

    #[test]
    fn test_export_request_uses_current_series() {
        let mut session = session_with(&["a.png"]);
        session.draw_region(bbox(1.0));
        session.set_current_labels("cat, dog".to_string());
        session.set_export_format(ExportFormat::Jpeg);

        let request = session.export_request(ExportConfig::default()).unwrap();
        assert_eq!(request.source_name, "a.png");
        assert_eq!(request.regions.len(), 1);
        assert_eq!(request.labels, vec!["cat", "dog"]);
        assert_eq!(request.format, ExportFormat::Jpeg);

        assert!(Session::default().export_request(ExportConfig::default()).is_none());
    }
}
