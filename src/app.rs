// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait. It routes menu, toolbar, panel, canvas and
//! keyboard input to the session, polls background loading and export
//! jobs, and reports their outcome in the status bar.

use crate::config::ExportConfig;
use crate::io::export::{self, base_filename, ExportError, ExportSummary};
use crate::io::media::{self, LoadedBatch, SUPPORTED_EXTENSIONS};
use crate::io::serialization::{self, ImageRecord};
use crate::models::session::Session;
use crate::ui::{canvas, labels, toolbar};
use std::sync::mpsc::{Receiver, TryRecvError};

/// A message shown in the status bar.
struct Status {
    text: String,
    is_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryShortcut {
    Undo,
    Redo,
}

/// Ctrl+Z and Ctrl+Y everywhere, Cmd+Z and Cmd+Y on macOS. Shift+Z is not
/// bound.
fn history_shortcut(modifiers: egui::Modifiers, key: egui::Key) -> Option<HistoryShortcut> {
    if !(modifiers.ctrl || modifiers.mac_cmd) {
        return None;
    }
    match key {
        egui::Key::Z if !modifiers.shift => Some(HistoryShortcut::Undo),
        egui::Key::Y => Some(HistoryShortcut::Redo),
        _ => None,
    }
}

/// Main application state.
pub struct RoicropApp {
    /// Images, histories, labels and viewport
    session: Session,

    /// Encoding presets for region export
    export_config: ExportConfig,

    /// Texture of the active image, keyed by image id
    texture: Option<(u64, egui::TextureHandle)>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<LoadedBatch>>,

    /// Receiver for a running export
    exporter: Option<Receiver<Result<ExportSummary, ExportError>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last user-facing notification
    status: Option<Status>,
}

impl Default for RoicropApp {
    fn default() -> Self {
        Self::new()
    }
}

impl RoicropApp {
    /// Create a new application instance.
    pub fn new() -> Self {
        Self {
            session: Session::default(),
            export_config: ExportConfig::default(),
            texture: None,
            image_loader: None,
            exporter: None,
            loading_message: None,
            status: None,
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.status = Some(Status { text, is_error: false });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.status = Some(Status { text, is_error: true });
    }

    /// Ask for image files and decode them in the background.
    fn open_images(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .pick_files()
        else {
            return;
        };
        if paths.is_empty() {
            return;
        }

        log::info!("Loading {} image(s)", paths.len());
        self.image_loader = Some(media::spawn_batch_loader(paths));
        self.loading_message = Some("Loading images...".to_string());
    }

    /// Export the labeled regions of the active image to a zip archive.
    fn export_regions(&mut self) {
        if self.exporter.is_some() {
            return;
        }
        let Some(request) = self.session.export_request(self.export_config) else {
            return;
        };
        if request.regions.is_empty() {
            self.notify_error(ExportError::NoRegions.to_string());
            return;
        }

        let default_name = format!("{}.zip", base_filename(&request.source_name));
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Zip archive", &["zip"])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        self.exporter = Some(export::spawn_export(request, path));
        self.loading_message = Some("Exporting regions...".to_string());
    }

    /// Write the image record of the active image as JSON or YAML.
    fn save_image_record(&mut self) {
        let Some(image) = self.session.active_image() else {
            return;
        };
        let default_name = format!("{}.json", base_filename(&image.name));
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .add_filter("YAML", &["yaml", "yml"])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        let result = ImageRecord::from_image(image)
            .and_then(|record| serialization::export_record(&record, &path));
        match result {
            Ok(()) => self.notify(format!("Saved image record to {}", path.display())),
            Err(e) => self.notify_error(format!("Failed to save image record: {}", e)),
        }
    }

    /// Collect finished background jobs.
    fn poll_background(&mut self) {
        if let Some(ref receiver) = self.image_loader {
            match receiver.try_recv() {
                Ok(batch) => {
                    self.image_loader = None;
                    self.loading_message = None;
                    self.finish_loading(batch);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.image_loader = None;
                    self.loading_message = None;
                    self.notify_error("Image loading stopped unexpectedly");
                }
            }
        }

        if let Some(ref receiver) = self.exporter {
            match receiver.try_recv() {
                Ok(result) => {
                    self.exporter = None;
                    self.loading_message = None;
                    match result {
                        Ok(summary) => self.notify(format!(
                            "Exported {} labeled regions to {} ({})",
                            summary.exported,
                            summary.file_name,
                            summary.path.display()
                        )),
                        Err(e) => self.notify_error(format!("Export failed: {}", e)),
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.exporter = None;
                    self.loading_message = None;
                    self.notify_error("Export failed: export stopped unexpectedly");
                }
            }
        }
    }

    fn finish_loading(&mut self, batch: LoadedBatch) {
        let loaded = batch.images.len();
        let failed = batch.failures.len();

        if loaded == 0 {
            if let Some(first) = batch.failures.first() {
                self.notify_error(first.to_string());
            }
            return;
        }

        self.session.replace_images(batch.images);
        self.texture = None;

        if failed == 0 {
            self.notify(format!("Loaded {} image(s)", loaded));
        } else {
            let reasons: Vec<String> = batch.failures.iter().map(ToString::to_string).collect();
            self.notify_error(format!(
                "Loaded {} image(s), {} failed: {}",
                loaded,
                failed,
                reasons.join("; ")
            ));
        }
    }

    /// Texture for the active image, uploading it when the image changed.
    fn active_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureHandle> {
        let image = self.session.active_image()?;
        match &self.texture {
            Some((id, texture)) if *id == image.id() => Some(texture.clone()),
            _ => {
                let size = [image.width() as usize, image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.pixels.as_raw());
                let texture = ctx.load_texture(
                    format!("image-{}", image.id()),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                self.texture = Some((image.id(), texture.clone()));
                Some(texture)
            }
        }
    }

    /// Keyboard shortcuts for the active image.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Leave keys alone while a text field (the labels input) is focused
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.session.delete_selected_region();
        }

        let shortcuts: Vec<HistoryShortcut> = ctx.input(|i| {
            [egui::Key::Z, egui::Key::Y]
                .into_iter()
                .filter(|key| i.key_pressed(*key))
                .filter_map(|key| history_shortcut(i.modifiers, key))
                .collect()
        });
        for shortcut in shortcuts {
            match shortcut {
                HistoryShortcut::Undo => self.session.undo(),
                HistoryShortcut::Redo => self.session.redo(),
            };
        }
    }

    fn apply_toolbar(&mut self, action: toolbar::ToolbarAction) {
        use toolbar::ToolbarAction;
        match action {
            ToolbarAction::SetZoom(zoom) => self.session.set_zoom(zoom),
            ToolbarAction::DeleteSelectedRegion => {
                self.session.delete_selected_region();
            }
            ToolbarAction::DeleteImage => {
                if let Some(removed) = self.session.delete_active_image() {
                    log::info!("Removed image {}, {} left", removed.name, self.session.image_count());
                }
            }
            ToolbarAction::Undo => {
                self.session.undo();
            }
            ToolbarAction::Redo => {
                self.session.redo();
            }
            ToolbarAction::PrevImage => {
                self.session.prev_image();
            }
            ToolbarAction::NextImage => {
                self.session.next_image();
            }
            ToolbarAction::SetExportFormat(format) => self.session.set_export_format(format),
            ToolbarAction::Export => self.export_regions(),
            ToolbarAction::None => {}
        }
    }

    fn apply_labels(&mut self, action: labels::LabelsAction) {
        use labels::LabelsAction;
        match action {
            LabelsAction::SelectSeries(id) => self.session.select_label_series(&id),
            LabelsAction::AddSeries => self.session.add_label_series(),
            LabelsAction::SetLabels(text) => self.session.set_current_labels(text),
            LabelsAction::SelectRegion(index) => {
                self.session.select_region(index);
            }
            LabelsAction::DeleteRegion(index) => {
                self.session.delete_region(index);
            }
            LabelsAction::None => {}
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let has_image = self.session.active_image().is_some();

        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Images...").clicked() {
                    self.open_images();
                    ui.close_menu();
                }
                ui.separator();
                if ui.add_enabled(has_image, egui::Button::new("Export Regions...")).clicked() {
                    self.export_regions();
                    ui.close_menu();
                }
                if ui.add_enabled(has_image, egui::Button::new("Save Image Record...")).clicked() {
                    self.save_image_record();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(self.session.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.session.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(self.session.can_redo(), egui::Button::new("Redo (Ctrl+Y)"))
                    .clicked()
                {
                    self.session.redo();
                    ui.close_menu();
                }

                ui.separator();

                let has_selection = self.session.pointer.selected().is_some();
                if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                    self.session.delete_selected_region();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom In").clicked() {
                    self.session.zoom_in();
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.session.zoom_out();
                    ui.close_menu();
                }
                if ui.button("Reset Zoom").clicked() {
                    self.session.reset_zoom();
                    ui.close_menu();
                }
            });
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.session.active_image() {
                Some(image) => {
                    ui.label(format!("{} x {}", image.width(), image.height()));
                    ui.separator();
                    ui.label(format!("{} region(s)", image.regions().len()));
                    ui.separator();
                    let history = image.history();
                    ui.label(format!("History {} / {}", history.current_index() + 1, history.entry_count()));
                }
                None => {
                    ui.label("No images loaded");
                }
            }

            if let Some(status) = &self.status {
                ui.separator();
                let color = if status.is_error {
                    egui::Color32::from_rgb(0xef, 0x44, 0x44)
                } else {
                    ui.visuals().text_color()
                };
                ui.label(egui::RichText::new(&status.text).color(color));
            }
        });
    }
}

impl eframe::App for RoicropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background();

        // Request repaint while a background job runs (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        let has_images = self.session.image_count() > 0;

        if has_images {
            let toolbar_action = egui::TopBottomPanel::top("toolbar")
                .show(ctx, |ui| toolbar::show(ui, &self.session))
                .inner;
            self.apply_toolbar(toolbar_action);

            let labels_action = egui::SidePanel::right("labels")
                .default_width(250.0)
                .show(ctx, |ui| labels::show(ui, &self.session))
                .inner;
            self.apply_labels(labels_action);
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        self.handle_shortcuts(ctx);

        let texture = self.active_texture(ctx);
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    canvas::show_loading(ui, message);
                    canvas::CanvasAction::None
                } else if self.session.image_count() == 0 {
                    if canvas::show_welcome(ui) {
                        self.open_images();
                    }
                    canvas::CanvasAction::None
                } else {
                    canvas::show(ui, &mut self.session, texture.as_ref())
                }
            })
            .inner;

        if let canvas::CanvasAction::BoxDrawn(bbox) = canvas_action {
            self.session.draw_region(bbox);
        }

        // One repaint per batch of session changes
        if self.session.take_dirty() {
            ctx.request_repaint();
        }
    }
}
