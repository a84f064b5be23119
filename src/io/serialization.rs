// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image record serialization.
//!
//! An image record is the flat storage shape of one annotated image: its
//! file name, the original file bytes as base64 and every region serialized
//! as its own JSON string. Records are written in JSON or YAML on request;
//! the session itself is never saved.

use crate::models::annotation::BoundingBox;
use crate::models::session::ImageSession;
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage shape of one annotated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    /// Base64 of the original file contents.
    pub data: String,
    /// One JSON object string per region.
    pub bounding_boxes: Vec<String>,
}

impl ImageRecord {
    /// Build a record from raw parts.
    pub fn new(filename: impl Into<String>, data: &[u8], regions: &[BoundingBox]) -> Result<Self> {
        let bounding_boxes = regions
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            filename: filename.into(),
            data: BASE64.encode(data),
            bounding_boxes,
        })
    }

    /// Record of an image's current regions.
    pub fn from_image(image: &ImageSession) -> Result<Self> {
        Self::new(image.name.clone(), &image.data, image.regions())
    }
}

/// Export a record to YAML format.
pub fn export_yaml(record: &ImageRecord, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(record)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a record to JSON format.
pub fn export_json(record: &ImageRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Export a record, picking the format from the file extension.
pub fn export_record(record: &ImageRecord, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(record, path),
        Some("json") => export_json(record, path),
        other => anyhow::bail!("Unsupported file extension: {:?}", other),
    }
}
