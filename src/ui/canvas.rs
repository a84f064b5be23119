// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and region annotation.
//!
//! This module paints the active image under the session viewport with its
//! regions on top, and feeds mouse input to the pointer state machine.

use crate::models::annotation::{BoundingBox, Point};
use crate::models::labels::display_label;
use crate::models::session::Session;
use crate::ui::pointer::{PointerButton, PointerOutcome, PointerState};
use crate::util::geometry::{fit_preview, screen_to_canvas, visible_part};
use egui::{Color32, Pos2, Rect, Stroke};

const BACKGROUND: Color32 = Color32::WHITE;
const REGION_DEFAULT: Color32 = Color32::from_rgb(0x0e, 0xa5, 0xe9);
const REGION_HOVERED: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
const REGION_SELECTED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
const PREVIEW_BORDER: Color32 = Color32::from_rgb(0xe2, 0xe8, 0xf0);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    BoxDrawn(BoundingBox),
}

/// Display the canvas for the active image and handle mouse interaction.
pub fn show(ui: &mut egui::Ui, session: &mut Session, texture: Option<&egui::TextureHandle>) -> CanvasAction {
    let Some((img_width, img_height)) = session.active_image().map(|img| (img.width(), img.height())) else {
        return CanvasAction::None;
    };

    let (canvas_w, canvas_h) = session.viewport.canvas_size(img_width, img_height);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(canvas_w as f32, canvas_h as f32),
                egui::Sense::click_and_drag(),
            );

            let action = handle_input(ui, session, rect);
            paint(ui, session, rect, texture, (img_width, img_height));

            if let (Some(index), Some(texture)) = (session.pointer.hovered(), texture) {
                if !session.pointer.is_drawing() {
                    show_region_preview(&response, session, index, texture, (img_width, img_height));
                }
            }

            action
        })
        .inner
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

fn to_pos(point: Point, origin: Pos2) -> Pos2 {
    egui::pos2(origin.x + point.x as f32, origin.y + point.y as f32)
}

/// Translate this frame's raw pointer input into state machine events.
fn handle_input(ui: &egui::Ui, session: &mut Session, rect: Rect) -> CanvasAction {
    let (pos, pressed, moved, released, alt) = ui.input(|i| {
        let pressed = if i.pointer.button_pressed(egui::PointerButton::Primary) {
            Some(PointerButton::Primary)
        } else if i.pointer.button_pressed(egui::PointerButton::Middle) {
            Some(PointerButton::Middle)
        } else if i.pointer.button_pressed(egui::PointerButton::Secondary) {
            Some(PointerButton::Secondary)
        } else {
            None
        };
        (
            i.pointer.latest_pos(),
            pressed,
            i.pointer.is_moving(),
            i.pointer.any_released(),
            i.modifiers.alt,
        )
    });

    let Some(pos) = pos else {
        session.pointer_left();
        return CanvasAction::None;
    };

    let screen = to_point(pos);
    let canvas = screen_to_canvas(screen, to_point(rect.min));
    // Only the topmost layer under the pointer sees it, so clicks on menus and
    // popups above the canvas stay with them. Drags already under way continue.
    let inside = ui.rect_contains_pointer(rect);
    let active = !matches!(session.pointer.state(), PointerState::Idle);

    if let Some(button) = pressed {
        if inside {
            session.pointer_pressed(screen, canvas, button, alt);
        }
    }

    if moved {
        if inside || active {
            session.pointer_moved(screen, canvas);
        }
        if !inside {
            session.pointer_left();
        }
    }

    if released {
        if let PointerOutcome::BoxDrawn(bbox) = session.pointer_released(canvas) {
            return CanvasAction::BoxDrawn(bbox);
        }
    }

    CanvasAction::None
}

/// Paint background, image, regions and the live drawing rectangle.
///
/// The live rectangle is drawn at the pointer's canvas position and is not
/// shifted by the pan offset. The committed box is converted with the same
/// offset removed, so the preview matches where the box lands.
fn paint(
    ui: &egui::Ui,
    session: &Session,
    rect: Rect,
    texture: Option<&egui::TextureHandle>,
    (img_width, img_height): (u32, u32),
) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let viewport = &session.viewport;
    if viewport.is_degenerate() {
        return;
    }

    if let Some(texture) = texture {
        let min = to_pos(viewport.offset, rect.min);
        let size = egui::vec2(
            (img_width as f64 * viewport.zoom) as f32,
            (img_height as f64 * viewport.zoom) as f32,
        );
        painter.image(
            texture.id(),
            Rect::from_min_size(min, size),
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    let selected = session.pointer.selected();
    let hovered = session.pointer.hovered();
    for (index, bbox) in session.regions().iter().enumerate() {
        let top_left = viewport.image_to_canvas(Point::new(bbox.x, bbox.y));
        let bottom_right = viewport.image_to_canvas(Point::new(bbox.x + bbox.width, bbox.y + bbox.height));
        let region_rect = Rect::from_min_max(to_pos(top_left, rect.min), to_pos(bottom_right, rect.min));

        let color = if Some(index) == selected {
            REGION_SELECTED
        } else if Some(index) == hovered {
            REGION_HOVERED
        } else {
            REGION_DEFAULT
        };

        if Some(index) == hovered {
            painter.rect_filled(region_rect, 0.0, REGION_HOVERED.gamma_multiply(0.1));
        }
        painter.rect_stroke(region_rect, 0.0, Stroke::new(2.0, color));
    }

    if let Some((x, y, w, h)) = session.pointer.drawing_rect() {
        let preview = Rect::from_min_size(
            to_pos(Point::new(x, y), rect.min),
            egui::vec2(w as f32, h as f32),
        );
        painter.rect_filled(preview, 0.0, REGION_HOVERED.gamma_multiply(0.2));
        let outline = [
            preview.left_top(),
            preview.right_top(),
            preview.right_bottom(),
            preview.left_bottom(),
            preview.left_top(),
        ];
        painter.extend(egui::Shape::dashed_line(
            &outline,
            Stroke::new(2.0, REGION_HOVERED),
            6.0,
            6.0,
        ));
    }
}

/// Tooltip with the region's label and a fitted crop of the region.
fn show_region_preview(
    response: &egui::Response,
    session: &Session,
    index: usize,
    texture: &egui::TextureHandle,
    (img_width, img_height): (u32, u32),
) {
    let Some(bbox) = session.regions().get(index).copied() else {
        return;
    };
    let labels = session.labels.current_labels();
    let label = display_label(&labels, index).to_string();
    let (preview_w, preview_h) = fit_preview(
        bbox.width,
        bbox.height,
        session.config.preview_max_width,
        session.config.preview_max_height,
    );
    let size = egui::vec2(preview_w as f32, preview_h as f32);
    let mapping = preview_mapping(&bbox, (img_width, img_height), size);

    let _ = response.clone().on_hover_ui_at_pointer(|ui| {
        ui.label(egui::RichText::new(label).strong());
        let (frame, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(frame, 0.0, BACKGROUND);
        if let Some((uv, dest)) = mapping {
            painter.image(texture.id(), dest.translate(frame.min.to_vec2()), uv, Color32::WHITE);
        }
        painter.rect_stroke(frame, 0.0, Stroke::new(1.0, PREVIEW_BORDER));
    });
}

/// Texture UVs of the on-image part of `bbox` and where that part sits inside
/// a preview of `size`, relative to the preview's top-left corner. Parts of
/// the box off the image are left as padding.
fn preview_mapping(bbox: &BoundingBox, (img_width, img_height): (u32, u32), size: egui::Vec2) -> Option<(Rect, Rect)> {
    let (x0, y0, x1, y1) = visible_part(bbox, img_width, img_height)?;
    let (w, h) = (img_width as f64, img_height as f64);
    let uv = Rect::from_min_max(
        egui::pos2((x0 / w) as f32, (y0 / h) as f32),
        egui::pos2((x1 / w) as f32, (y1 / h) as f32),
    );

    let scale_x = size.x as f64 / bbox.width;
    let scale_y = size.y as f64 / bbox.height;
    let dest = Rect::from_min_max(
        egui::pos2(((x0 - bbox.x) * scale_x) as f32, ((y0 - bbox.y) * scale_y) as f32),
        egui::pos2(((x1 - bbox.x) * scale_x) as f32, ((y1 - bbox.y) * scale_y) as f32),
    );
    Some((uv, dest))
}

/// Spinner shown while images load or an export runs.
pub fn show_loading(ui: &mut egui::Ui, message: &str) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.spinner();
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new(message)
                    .size(16.0)
                    .color(Color32::from_gray(200)),
            );
        });
    });
}

/// Welcome screen shown before any image is loaded. Returns `true` when the
/// user asked to open images.
pub fn show_welcome(ui: &mut egui::Ui) -> bool {
    let mut open = false;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() / 3.0);
        ui.heading(
            egui::RichText::new("ROICROP")
                .size(32.0)
                .color(Color32::from_gray(200)),
        );
        ui.label(
            egui::RichText::new("Draw labeled regions and export them as image crops")
                .size(14.0)
                .color(Color32::from_gray(150)),
        );
        ui.add_space(20.0);
        if ui.button("Open Images...").clicked() {
            open = true;
        }
        ui.add_space(10.0);
        ui.label(
            egui::RichText::new("Middle/right drag or Alt+drag pans, left drag draws a region")
                .weak()
                .color(Color32::from_gray(130)),
        );
    });
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::io::media::DecodedImage;
    use egui::{pos2, vec2, Event, Modifiers, RawInput};
    use image::RgbaImage;

    const CLICK: Pos2 = Pos2 { x: 50.0, y: 48.0 };

    /// Zoom 1 with a small box far from `CLICK` selected and a large box under it.
    fn session() -> Session {
        let mut session = Session::new(CanvasConfig::default());
        session.replace_images(vec![DecodedImage {
            name: "scene.png".to_string(),
            data: Vec::new(),
            pixels: RgbaImage::new(400, 400),
        }]);
        session.set_zoom(1.0);
        session.draw_region(BoundingBox::new(300.0, 300.0, 50.0, 50.0).unwrap());
        session.draw_region(BoundingBox::new(0.0, 0.0, 200.0, 200.0).unwrap());
        session.select_region(0);
        session
    }

    fn button(pressed: bool) -> Event {
        Event::PointerButton {
            pos: CLICK,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// Hover, press and release at `CLICK`, optionally with a foreground menu
    /// covering it. Returns whether the menu button saw the click.
    fn click(session: &mut Session, with_menu: bool) -> bool {
        let ctx = egui::Context::default();
        let frames = vec![
            vec![Event::PointerMoved(CLICK)],
            vec![Event::PointerMoved(CLICK)],
            vec![Event::PointerMoved(CLICK)],
            vec![button(true)],
            vec![button(false)],
        ];

        let mut menu_clicked = false;
        for events in frames {
            let input = RawInput {
                screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    show(ui, session, None);
                });
                if with_menu {
                    egui::Area::new(egui::Id::new("menu"))
                        .order(egui::Order::Foreground)
                        .fixed_pos(pos2(40.0, 40.0))
                        .show(ctx, |ui| {
                            if ui.button("Delete Selected").clicked() {
                                menu_clicked = true;
                            }
                        });
                }
            });
        }
        menu_clicked
    }

    #[test]
    fn test_click_on_canvas_selects_region() {
        let mut session = session();
        click(&mut session, false);
        assert_eq!(session.pointer.selected(), Some(1));
        assert!(!session.pointer.is_drawing());
    }

    #[test]
    fn test_click_on_overlapping_menu_leaves_canvas_alone() {
        let mut session = session();
        let menu_clicked = click(&mut session, true);

        assert!(menu_clicked);
        assert_eq!(session.pointer.selected(), Some(0));
        assert!(!session.pointer.is_drawing());
    }

    #[test]
    fn test_preview_mapping_inside_image() {
        let bbox = BoundingBox::new(100.0, 50.0, 200.0, 100.0).unwrap();
        let (uv, dest) = preview_mapping(&bbox, (400, 200), vec2(200.0, 100.0)).unwrap();

        assert_eq!(uv, Rect::from_min_max(pos2(0.25, 0.25), pos2(0.75, 0.75)));
        assert_eq!(dest, Rect::from_min_max(pos2(0.0, 0.0), pos2(200.0, 100.0)));
    }

    #[test]
    fn test_preview_mapping_pads_off_image_part() {
        // Left half of the box hangs off the image
        let bbox = BoundingBox::new(-100.0, 0.0, 200.0, 100.0).unwrap();
        let (uv, dest) = preview_mapping(&bbox, (400, 200), vec2(200.0, 100.0)).unwrap();

        assert_eq!(uv, Rect::from_min_max(pos2(0.0, 0.0), pos2(0.25, 0.5)));
        assert_eq!(dest, Rect::from_min_max(pos2(100.0, 0.0), pos2(200.0, 100.0)));

        let outside = BoundingBox::new(500.0, 0.0, 50.0, 50.0).unwrap();
        assert!(preview_mapping(&outside, (400, 200), vec2(200.0, 200.0)).is_none());
    }
}
