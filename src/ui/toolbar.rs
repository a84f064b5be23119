// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with zoom, editing, navigation and export controls.

use crate::io::export::ExportFormat;
use crate::models::session::Session;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    SetZoom(f64),
    DeleteSelectedRegion,
    DeleteImage,
    Undo,
    Redo,
    PrevImage,
    NextImage,
    SetExportFormat(ExportFormat),
    Export,
}

/// Display the toolbar for the current session.
pub fn show(ui: &mut egui::Ui, session: &Session) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if let Some(image) = session.active_image() {
            ui.label(
                egui::RichText::new(format!(
                    "Image {} of {}",
                    session.active_index() + 1,
                    session.image_count()
                ))
                .weak(),
            );
            ui.label(&image.name);
        }

        ui.separator();

        // Zoom
        let mut zoom = session.viewport.zoom;
        let slider = egui::Slider::new(&mut zoom, session.config.min_zoom..=session.config.max_zoom)
            .step_by(session.config.zoom_step)
            .show_value(false);
        if ui.add(slider).changed() {
            action = ToolbarAction::SetZoom(zoom);
        }
        ui.label(format!("{}%", (session.viewport.zoom * 100.0).round()));

        ui.separator();

        if ui
            .add_enabled(session.pointer.selected().is_some(), egui::Button::new("🗑 Delete Box"))
            .clicked()
        {
            action = ToolbarAction::DeleteSelectedRegion;
        }
        if ui.button("🗑 Delete Image").clicked() {
            action = ToolbarAction::DeleteImage;
        }

        ui.separator();

        if ui
            .add_enabled(session.can_undo(), egui::Button::new("⟲ Undo"))
            .on_hover_text("Undo (Ctrl+Z)")
            .clicked()
        {
            action = ToolbarAction::Undo;
        }
        if ui
            .add_enabled(session.can_redo(), egui::Button::new("⟳ Redo"))
            .on_hover_text("Redo (Ctrl+Y)")
            .clicked()
        {
            action = ToolbarAction::Redo;
        }

        ui.separator();

        if ui.add_enabled(session.has_prev(), egui::Button::new("◀ Prev")).clicked() {
            action = ToolbarAction::PrevImage;
        }
        if ui.add_enabled(session.has_next(), egui::Button::new("Next ▶")).clicked() {
            action = ToolbarAction::NextImage;
        }

        ui.separator();

        let mut format = session.export_format;
        egui::ComboBox::from_id_source("export_format")
            .selected_text(format.name())
            .width(80.0)
            .show_ui(ui, |ui| {
                for candidate in ExportFormat::ALL {
                    ui.selectable_value(&mut format, candidate, candidate.name());
                }
            });
        if format != session.export_format {
            action = ToolbarAction::SetExportFormat(format);
        }

        if ui.button("⬇ Export Regions").clicked() {
            action = ToolbarAction::Export;
        }
    });

    action
}
