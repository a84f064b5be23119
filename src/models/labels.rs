// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label series.
//!
//! A label series is a named, comma-separated list of labels. Labels bind to
//! regions purely by position: label `i` names region `i` in draw order.
//! Deleting a region in the middle therefore shifts the labels of every
//! region after it.

use serde::{Deserialize, Serialize};

/// Text shown for a region that has no label.
pub const UNLABELED: &str = "Unlabeled Region";

/// A named, ordered list of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSeries {
    pub id: String,
    pub name: String,
    /// Comma-delimited labels, as typed by the user.
    pub labels: String,
}

impl LabelSeries {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            labels: String::new(),
        }
    }

    /// Split the raw labels into trimmed entries.
    ///
    /// An empty string yields no labels at all.
    pub fn label_list(&self) -> Vec<String> {
        split_labels(&self.labels)
    }
}

/// Split a comma-delimited label string, trimming every entry.
pub fn split_labels(labels: &str) -> Vec<String> {
    if labels.is_empty() {
        return Vec::new();
    }
    labels.split(',').map(|l| l.trim().to_string()).collect()
}

/// Label for the region at `index`, or `None` if the list is too short or
/// the entry is blank.
pub fn label_for(labels: &[String], index: usize) -> Option<&str> {
    labels
        .get(index)
        .map(String::as_str)
        .filter(|l| !l.is_empty())
}

/// Display text for the region at `index`.
pub fn display_label(labels: &[String], index: usize) -> &str {
    label_for(labels, index).unwrap_or(UNLABELED)
}

/// All label series of a session, exactly one of which is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSeriesCollection {
    series: Vec<LabelSeries>,
    current_id: String,
}

impl Default for LabelSeriesCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelSeriesCollection {
    /// A collection with a single empty "Series 1".
    pub fn new() -> Self {
        Self {
            series: vec![LabelSeries::new("1", "Series 1")],
            current_id: "1".to_string(),
        }
    }

    pub fn series(&self) -> &[LabelSeries] {
        &self.series
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    /// The current series.
    pub fn current(&self) -> Option<&LabelSeries> {
        self.series.iter().find(|s| s.id == self.current_id)
    }

    /// Labels of the current series, split and trimmed.
    pub fn current_labels(&self) -> Vec<String> {
        self.current().map(LabelSeries::label_list).unwrap_or_default()
    }

    /// Append a new empty series named after its position and make it current.
    pub fn add_series(&mut self) -> &LabelSeries {
        let id = (self.series.len() + 1).to_string();
        let name = format!("Series {}", id);
        self.current_id = id.clone();
        self.series.push(LabelSeries::new(id, name));
        &self.series[self.series.len() - 1]
    }

    /// Make the series with `id` current. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if self.series.iter().any(|s| s.id == id) {
            self.current_id = id.to_string();
            true
        } else {
            false
        }
    }

    /// Replace the raw labels of the current series.
    pub fn set_current_labels(&mut self, labels: String) {
        let current_id = self.current_id.clone();
        if let Some(series) = self.series.iter_mut().find(|s| s.id == current_id) {
            series.labels = labels;
        }
    }
}
