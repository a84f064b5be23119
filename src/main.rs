// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROICROP - Region crop tool
//!
//! A desktop application for drawing labeled rectangular regions on a batch
//! of images and exporting each labeled region as its own image file.

mod app;
mod config;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::RoicropApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ROICROP - Region crop tool"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ROICROP",
        options,
        Box::new(|_cc| Ok(Box::new(RoicropApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
