// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading.
//!
//! This module reads a batch of image files, decodes each one to RGBA on a
//! background thread and hands the finished batch back over a channel.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use thiserror::Error;

/// Extensions offered in the open dialog.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// A single file that could not be turned into an image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// A decoded image together with the bytes it came from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// File name including extension.
    pub name: String,
    /// Original encoded file contents.
    pub data: Vec<u8>,
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Result of loading a batch of files, in the order they were selected.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub images: Vec<DecodedImage>,
    pub failures: Vec<MediaError>,
}

/// Decode an in-memory image file.
pub fn decode_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<DecodedImage, MediaError> {
    let name = name.into();
    let pixels = match image::load_from_memory(&data) {
        Ok(img) => img.to_rgba8(),
        Err(source) => return Err(MediaError::Decode { name, source }),
    };
    Ok(DecodedImage { name, data, pixels })
}

/// Read and decode an image file from disk.
pub fn load_image(path: &Path) -> Result<DecodedImage, MediaError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let data = std::fs::read(path).map_err(|source| MediaError::Read {
        name: name.clone(),
        source,
    })?;
    decode_bytes(name, data)
}

/// Load every path, keeping the successes in order and collecting failures.
pub fn load_batch(paths: &[PathBuf]) -> LoadedBatch {
    let mut batch = LoadedBatch::default();
    for path in paths {
        match load_image(path) {
            Ok(img) => {
                log::info!("Loaded image: {} ({}x{})", img.name, img.width(), img.height());
                batch.images.push(img);
            }
            Err(e) => {
                log::error!("{}", e);
                batch.failures.push(e);
            }
        }
    }
    batch
}

/// Load a batch on a background thread. The receiver yields exactly one
/// [`LoadedBatch`] once every file has been processed.
pub fn spawn_batch_loader(paths: Vec<PathBuf>) -> Receiver<LoadedBatch> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || {
        let batch = load_batch(&paths);
        let _ = sender.send(batch);
    });
    receiver
}
