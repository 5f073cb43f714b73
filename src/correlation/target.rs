//! Correlation of feature dimensions with the classification label
//!
//! The label-aware asymmetric bit flip needs one coefficient per raw feature
//! dimension. Training data is assembled from the processed-feature files of
//! every music file in the training category, one row per classification
//! window, each row carrying its file's label.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Pearson correlation coefficient of two equally long series
///
/// Computed in a single pass with Welford's update. Returns 0 when either
/// series has zero variance or the series are empty. Only the common prefix
/// is used if the lengths differ.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut m2_x = 0.0;
    let mut m2_y = 0.0;
    let mut co_moment = 0.0;

    for (k, (&xi, &yi)) in x.iter().zip(y).enumerate() {
        let n = (k + 1) as f64;
        let dx = xi - mean_x;
        mean_x += dx / n;
        let dy = yi - mean_y;
        mean_y += dy / n;
        m2_x += dx * (xi - mean_x);
        m2_y += dy * (yi - mean_y);
        co_moment += dx * (yi - mean_y);
    }

    let denominator = (m2_x * m2_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let r = co_moment / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Column-major feature values with one label per window
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledDataset {
    feature_names: Vec<String>,
    columns: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl LabeledDataset {
    /// Empty dataset with the given feature dimension names
    pub fn new(feature_names: Vec<String>) -> Self {
        let columns = vec![Vec::new(); feature_names.len()];
        Self {
            feature_names,
            columns,
            labels: Vec::new(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of feature dimensions
    pub fn dimension_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of classification windows
    pub fn window_count(&self) -> usize {
        self.labels.len()
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Append one classification window
    pub fn push(&mut self, values: &[f64], label: f64) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::WindowWidth {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, &value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        self.labels.push(label);
        Ok(())
    }

    /// Pearson correlation of every feature dimension with the label
    pub fn label_correlations(&self) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| pearson(column, &self.labels))
            .collect()
    }
}

/// Processing chain that produced a set of processed-feature files
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingModel {
    pub processing_steps: String,
    pub conversion_steps: String,
    /// Classification window size
    pub window_size_ms: u64,
    /// Classification window step size
    pub step_size_ms: u64,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProcessingModel {
    pub fn new(
        processing_steps: impl Into<String>,
        conversion_steps: impl Into<String>,
        window_size_ms: u64,
        step_size_ms: u64,
    ) -> Self {
        Self {
            processing_steps: processing_steps.into(),
            conversion_steps: conversion_steps.into(),
            window_size_ms,
            step_size_ms,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name used in processed-feature file names
    ///
    /// `<steps>__<conversion>__<window>ms_<step>ms`, followed by
    /// `_<description>` when a non-empty description is set.
    pub fn name(&self) -> String {
        let mut name = format!(
            "{}__{}__{}ms_{}ms",
            self.processing_steps, self.conversion_steps, self.window_size_ms, self.step_size_ms
        );
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            name.push('_');
            name.push_str(description);
        }
        name
    }

    /// Processed-feature file of a music file
    ///
    /// The music file's path relative to `music_database` (or the path itself
    /// if it lies elsewhere), without extension, becomes a folder under
    /// `processed_database`; the file inside is `<stem>_<model name>.csv`.
    /// Returns `None` if the music file has no file name.
    pub fn processed_feature_path(
        &self,
        music_file: &Path,
        music_database: Option<&Path>,
        processed_database: &Path,
    ) -> Option<PathBuf> {
        let relative = music_database
            .and_then(|db| music_file.strip_prefix(db).ok())
            .unwrap_or(music_file);
        let relative: PathBuf = relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        let stem = relative.file_stem()?.to_string_lossy().into_owned();
        let folder = relative.with_extension("");
        Some(
            processed_database
                .join(folder)
                .join(format!("{}_{}.csv", stem, self.name())),
        )
    }
}

/// Category id of a training input such as `"12"` or `"12[...]"`
///
/// Fractional ids are truncated.
pub fn parse_training_category(input: &str) -> Option<i64> {
    let id = match input.find('[') {
        Some(end) => &input[..end],
        None => input,
    };
    let id: f64 = id.trim().parse().ok()?;
    id.is_finite().then(|| id.trunc() as i64)
}
