// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer interaction state machine.
//!
//! Turns raw press/move/release events into panning, box drawing, selection
//! and hover changes. It knows nothing about egui; the canvas feeds it
//! plain points so the transitions can be tested on their own.

use crate::models::annotation::{BoundingBox, Point};
use crate::util::geometry::{corners_to_rect, hit_test_canvas, Viewport};

/// Which pointer button went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    Idle,
    /// `anchor` is the press position minus the offset at press time.
    Panning { anchor: Point },
    /// Both corners in canvas space.
    Drawing { start: Point, current: Point },
}

/// What a pointer event did, for the caller to commit or log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    None,
    PanStarted,
    Panned,
    PanEnded,
    DrawStarted,
    DrawUpdated,
    /// A finished rectangle large enough to keep, in image space.
    BoxDrawn(BoundingBox),
    /// A rectangle too small to be a deliberate draw.
    DrawDiscarded,
    HoverChanged,
}

/// Pointer state plus the selected and hovered region indices.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerController {
    state: PointerState,
    selected: Option<usize>,
    hovered: Option<usize>,
}

impl Default for PointerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerController {
    pub fn new() -> Self {
        Self {
            state: PointerState::Idle,
            selected: None,
            hovered: None,
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, PointerState::Drawing { .. })
    }

    /// Select a region directly, e.g. from the region list.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    /// Forget selection and hover, e.g. after the region set changed shape.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.hovered = None;
    }

    /// Reset everything, including an in-progress pan or draw.
    pub fn reset(&mut self) {
        self.state = PointerState::Idle;
        self.clear_selection();
    }

    /// Live drawing rectangle `(x, y, width, height)` in canvas space.
    pub fn drawing_rect(&self) -> Option<(f64, f64, f64, f64)> {
        match self.state {
            PointerState::Drawing { start, current } => Some(corners_to_rect(start, current)),
            _ => None,
        }
    }

    /// Handle a button press.
    ///
    /// Middle, secondary, or primary with the pan modifier held starts a
    /// pan. A plain primary press starts a draw and selects the first region
    /// under the pointer (or clears the selection).
    pub fn press(
        &mut self,
        screen: Point,
        canvas: Point,
        button: PointerButton,
        pan_modifier: bool,
        regions: &[BoundingBox],
        viewport: &Viewport,
    ) -> PointerOutcome {
        if self.state != PointerState::Idle {
            return PointerOutcome::None;
        }

        if button != PointerButton::Primary || pan_modifier {
            self.state = PointerState::Panning {
                anchor: Point::new(screen.x - viewport.offset.x, screen.y - viewport.offset.y),
            };
            return PointerOutcome::PanStarted;
        }

        self.state = PointerState::Drawing {
            start: canvas,
            current: canvas,
        };
        self.selected = hit_test_canvas(regions, viewport, canvas);
        PointerOutcome::DrawStarted
    }

    /// Handle pointer motion. Panning writes the new offset into `viewport`.
    pub fn moved(
        &mut self,
        screen: Point,
        canvas: Point,
        regions: &[BoundingBox],
        viewport: &mut Viewport,
    ) -> PointerOutcome {
        match self.state {
            PointerState::Panning { anchor } => {
                viewport.offset = Point::new(screen.x - anchor.x, screen.y - anchor.y);
                PointerOutcome::Panned
            }
            PointerState::Drawing { start, .. } => {
                self.state = PointerState::Drawing {
                    start,
                    current: canvas,
                };
                PointerOutcome::DrawUpdated
            }
            PointerState::Idle => {
                let hovered = hit_test_canvas(regions, viewport, canvas);
                if hovered == self.hovered {
                    PointerOutcome::None
                } else {
                    self.hovered = hovered;
                    PointerOutcome::HoverChanged
                }
            }
        }
    }

    /// Handle a button release.
    ///
    /// Finishing a draw yields a box only if both image-space sides are
    /// strictly larger than `min_box_size`.
    pub fn release(
        &mut self,
        canvas: Point,
        viewport: &Viewport,
        min_box_size: f64,
    ) -> PointerOutcome {
        match self.state {
            PointerState::Idle => PointerOutcome::None,
            PointerState::Panning { .. } => {
                self.state = PointerState::Idle;
                PointerOutcome::PanEnded
            }
            PointerState::Drawing { start, .. } => {
                self.state = PointerState::Idle;
                finish_box(start, canvas, viewport, min_box_size)
                    .map_or(PointerOutcome::DrawDiscarded, PointerOutcome::BoxDrawn)
            }
        }
    }

    /// The pointer left the canvas.
    pub fn leave(&mut self) -> PointerOutcome {
        if self.hovered.take().is_some() {
            PointerOutcome::HoverChanged
        } else {
            PointerOutcome::None
        }
    }
}

fn finish_box(start: Point, end: Point, viewport: &Viewport, min_box_size: f64) -> Option<BoundingBox> {
    let (x, y, width, height) = corners_to_rect(start, end);
    let width = viewport.canvas_len_to_image(width)?;
    let height = viewport.canvas_len_to_image(height)?;
    if width <= min_box_size || height <= min_box_size {
        return None;
    }
    let origin = viewport.canvas_to_image(Point::new(x, y))?;
    BoundingBox::new(origin.x, origin.y, width, height)
}
