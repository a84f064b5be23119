// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region export.
//!
//! Crops every labeled region out of the source image, encodes each crop and
//! packs them into a single zip archive. Regions without a label are left
//! out. Crops are produced one at a time so only one raster buffer is alive
//! at once.

use crate::config::ExportConfig;
use crate::models::annotation::{BoundingBox, RegionSet};
use crate::models::labels::label_for;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Output encoding for exported regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Webp];

    /// File extension, also used as the format key.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Webp => "WebP",
        }
    }
}

/// Why an export produced nothing.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No regions selected. Please draw at least one bounding box before exporting")]
    NoRegions,
    #[error("Failed to encode region '{label}': {source}")]
    Encode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the export needs, detached from the session so it can run on
/// another thread.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Source file name, used to name the archive.
    pub source_name: String,
    pub image: Arc<RgbaImage>,
    pub regions: RegionSet,
    /// Split labels of the current series.
    pub labels: Vec<String>,
    pub format: ExportFormat,
    pub config: ExportConfig,
}

/// A finished in-memory archive.
#[derive(Debug, Clone)]
pub struct ExportArchive {
    /// `<base>.zip`
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Number of labeled regions that were encoded.
    pub exported: usize,
}

/// Outcome of a background export.
#[derive(Debug)]
pub struct ExportSummary {
    pub file_name: String,
    pub path: PathBuf,
    pub exported: usize,
}

/// File name without its last extension. Names without a dot are kept whole.
pub fn base_filename(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Copy the box out of `source` at whole-pixel size. Parts of the box that
/// fall outside the source stay transparent.
pub fn crop_region(source: &RgbaImage, bbox: &BoundingBox) -> RgbaImage {
    let width = (bbox.width as u32).max(1);
    let height = (bbox.height as u32).max(1);
    let mut crop = RgbaImage::new(width, height);
    image::imageops::replace(&mut crop, source, -(bbox.x.floor() as i64), -(bbox.y.floor() as i64));
    crop
}

/// Encode a crop in the requested format.
pub fn encode_region(
    crop: RgbaImage,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    let image = DynamicImage::ImageRgba8(crop);
    match format {
        ExportFormat::Png => {
            image.write_with_encoder(PngEncoder::new(&mut bytes))?;
        }
        ExportFormat::Jpeg => {
            // JPEG has no alpha; transparent areas come out black
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, config.jpeg_quality()))?;
        }
        ExportFormat::Webp => {
            // Lossy VP8 at the shared quality preset
            let rgba = image.to_rgba8();
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode(config.webp_quality());
            bytes.extend_from_slice(&encoded);
        }
    }
    Ok(bytes)
}

/// Build the region archive in memory.
///
/// The archive holds a folder named after the source image with one
/// `<label>.<ext>` file per labeled region. A repeated label overwrites the
/// earlier file.
pub fn export_regions(request: &ExportRequest) -> Result<ExportArchive, ExportError> {
    if request.regions.is_empty() {
        return Err(ExportError::NoRegions);
    }

    let base = base_filename(&request.source_name);
    let ext = request.format.extension();
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut exported = 0;

    for (index, bbox) in request.regions.iter().enumerate() {
        let Some(label) = label_for(&request.labels, index) else {
            log::debug!("Skipping unlabeled region {}", index);
            continue;
        };

        let crop = crop_region(&request.image, bbox);
        let bytes = encode_region(crop, request.format, &request.config).map_err(|source| {
            ExportError::Encode {
                label: label.to_string(),
                source,
            }
        })?;

        let entry = format!("{}/{}.{}", base, label, ext);
        match files.iter_mut().find(|(name, _)| *name == entry) {
            Some(existing) => existing.1 = bytes,
            None => files.push((entry, bytes)),
        }
        exported += 1;
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(format!("{}/", base), options)?;
    for (name, bytes) in &files {
        writer.start_file(name.clone(), options)?;
        writer.write_all(bytes)?;
    }
    let bytes = writer.finish()?.into_inner();

    Ok(ExportArchive {
        file_name: format!("{}.zip", base),
        bytes,
        exported,
    })
}

/// Build the archive and write it to `path`. Nothing is written unless the
/// whole archive was built.
pub fn export_to_file(request: &ExportRequest, path: &Path) -> Result<ExportSummary, ExportError> {
    let archive = export_regions(request)?;
    std::fs::write(path, &archive.bytes)?;
    Ok(ExportSummary {
        file_name: archive.file_name,
        path: path.to_path_buf(),
        exported: archive.exported,
    })
}

/// Run [`export_to_file`] on a background thread.
pub fn spawn_export(request: ExportRequest, path: PathBuf) -> Receiver<Result<ExportSummary, ExportError>> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || {
        let result = export_to_file(&request, &path);
        let _ = sender.send(result);
    });
    receiver
}
