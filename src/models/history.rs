// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-image undo/redo history.
//!
//! The history is a linear log of full [`RegionSet`] snapshots plus a cursor.
//! The snapshot under the cursor is the current state of the image. Any edit
//! made while the cursor is not at the tail throws away every entry after it.

use super::annotation::{BoundingBox, RegionSet};

/// Linear snapshot log for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLog {
    /// Region set snapshots, oldest first. Never empty.
    entries: Vec<RegionSet>,
    /// Index of the current snapshot, always `< entries.len()`.
    current: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    /// A fresh log holding a single empty region set.
    pub fn new() -> Self {
        Self {
            entries: vec![RegionSet::new()],
            current: 0,
        }
    }

    /// The region set at the cursor.
    pub fn current_region_set(&self) -> &RegionSet {
        &self.entries[self.current]
    }

    /// Append a box to the current regions and commit the result.
    pub fn draw(&mut self, bbox: BoundingBox) {
        let mut regions = self.current_region_set().clone();
        regions.push(bbox);
        self.commit(regions);
    }

    /// Remove the region at `index` and commit the result.
    ///
    /// Out-of-range indices leave the log untouched and return `false`.
    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.current_region_set().len() {
            return false;
        }
        let mut regions = self.current_region_set().clone();
        regions.remove(index);
        self.commit(regions);
        true
    }

    /// Step back one snapshot. No-op at the first entry.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Step forward one snapshot. No-op at the last entry.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Position of the cursor in the log.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of snapshots in the log, including redo-able ones.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn commit(&mut self, regions: RegionSet) {
        self.entries.truncate(self.current + 1);
        self.entries.push(regions);
        self.current = self.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f64) -> BoundingBox {
        BoundingBox::new(x, x, 10.0, 10.0).unwrap()
    }

    #[test]
    fn test_starts_with_single_empty_entry() {
        let history = HistoryLog::new();
        assert_eq!(history.entry_count(), 1);
        assert_eq!(history.current_index(), 0);
        assert!(history.current_region_set().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_draw_then_undo_back_to_empty() {
        let mut history = HistoryLog::new();
        for i in 0..4 {
            history.draw(bbox(i as f64));
        }
        assert_eq!(history.current_region_set().len(), 4);

        for _ in 0..4 {
            assert!(history.undo());
        }
        assert_eq!(history.current_index(), 0);
        assert!(history.current_region_set().is_empty());

        // Boundary is a no-op
        assert!(!history.undo());
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn test_redo_restores_exact_snapshot() {
        let mut history = HistoryLog::new();
        history.draw(bbox(1.0));
        history.draw(bbox(2.0));
        let before = history.current_region_set().clone();

        history.undo();
        assert_eq!(history.current_region_set().len(), 1);
        assert!(history.redo());
        assert_eq!(history.current_region_set(), &before);
        assert!(!history.redo());
    }

    #[test]
    fn test_edit_after_undo_discards_redo_entries() {
        let mut history = HistoryLog::new();
        history.draw(bbox(1.0));
        history.draw(bbox(2.0));
        history.undo();
        history.undo();

        history.draw(bbox(3.0));
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(history.entry_count(), 2);
        assert_eq!(history.current_region_set(), &vec![bbox(3.0)]);

        history.undo();
        history.delete(0);
        assert!(!history.redo());
    }

    #[test]
    fn test_delete_preserves_order_and_is_undoable() {
        let mut history = HistoryLog::new();
        for i in 0..4 {
            history.draw(bbox(i as f64));
        }

        assert!(history.delete(1));
        assert_eq!(
            history.current_region_set(),
            &vec![bbox(0.0), bbox(2.0), bbox(3.0)]
        );

        history.undo();
        assert_eq!(history.current_region_set().len(), 4);
        assert_eq!(history.current_region_set()[1], bbox(1.0));
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut history = HistoryLog::new();
        history.draw(bbox(1.0));

        assert!(!history.delete(1));
        assert_eq!(history.entry_count(), 2);
        assert_eq!(history.current_region_set().len(), 1);
    }
}
