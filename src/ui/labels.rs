// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label series panel.
//!
//! Series selection, the comma-separated label input for the current series
//! and the list of regions with the label each one currently binds to.

use crate::models::labels::display_label;
use crate::models::session::Session;

/// Result of label panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelsAction {
    None,
    SelectSeries(String),
    AddSeries,
    SetLabels(String),
    SelectRegion(usize),
    DeleteRegion(usize),
}

/// Display the label panel.
pub fn show(ui: &mut egui::Ui, session: &Session) -> LabelsAction {
    let mut action = LabelsAction::None;

    ui.heading("Labels");
    ui.separator();

    ui.horizontal(|ui| {
        let current_name = session
            .labels
            .current()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let mut selected = session.labels.current_id().to_string();
        egui::ComboBox::from_id_source("label_series")
            .selected_text(current_name)
            .show_ui(ui, |ui| {
                for series in session.labels.series() {
                    ui.selectable_value(&mut selected, series.id.clone(), &series.name);
                }
            });
        if selected != session.labels.current_id() {
            action = LabelsAction::SelectSeries(selected);
        }

        if ui.button("➕ New Series").clicked() {
            action = LabelsAction::AddSeries;
        }
    });

    let mut labels = session
        .labels
        .current()
        .map(|s| s.labels.clone())
        .unwrap_or_default();
    let edit = ui.add(
        egui::TextEdit::singleline(&mut labels)
            .hint_text("Labels (comma separated)")
            .desired_width(f32::INFINITY),
    );
    if edit.changed() {
        action = LabelsAction::SetLabels(labels);
    }

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Regions").strong());
    ui.separator();

    let regions = session.regions();
    if regions.is_empty() {
        ui.label(egui::RichText::new("Drag on the image to draw a region").weak());
        return action;
    }

    let label_list = session.labels.current_labels();
    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, bbox) in regions.iter().enumerate() {
            let is_selected = session.pointer.selected() == Some(index);
            ui.horizontal(|ui| {
                let entry = ui
                    .selectable_label(
                        is_selected,
                        format!("{}. {}", index + 1, display_label(&label_list, index)),
                    )
                    .on_hover_text(format!(
                        "x: {:.0}, y: {:.0}, {:.0} x {:.0}",
                        bbox.x, bbox.y, bbox.width, bbox.height
                    ));
                if entry.clicked() {
                    action = LabelsAction::SelectRegion(index);
                }
                if ui.small_button("🗑").on_hover_text("Delete region").clicked() {
                    action = LabelsAction::DeleteRegion(index);
                }
            });
        }
    });

    action
}
