//! CSV loaders for correlation input
//!
//! Feature tables, coefficient files, category annotations and processed
//! feature files are all plain CSV with a header row.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::table::{CoefficientRecord, CorrelationTable, FeatureEntry, FeatureTable};
use super::target::{parse_training_category, LabeledDataset};
use crate::config::CorrelationTableConfig;
use crate::context::SearchContext;
use crate::error::{EvoResult, OperatorError, ResourceError};

/// Window metadata columns that are not feature dimensions
pub const WINDOW_METADATA_COLUMNS: [&str; 3] = ["Unit", "Start", "End"];

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ResourceError> {
    let file = std::fs::File::open(path).map_err(|e| ResourceError::io(path, e))?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file))
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ResourceError> {
    let mut rdr = reader(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result.map_err(|e| ResourceError::csv(path, e))?);
    }
    Ok(records)
}

/// Read a feature table (`Id,Dimensions`, further columns ignored)
pub fn read_feature_table(path: impl AsRef<Path>) -> Result<FeatureTable, ResourceError> {
    let path = path.as_ref();
    let entries: Vec<FeatureEntry> = read_records(path)?;
    FeatureTable::new(entries).map_err(|source| ResourceError::Table {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a correlation coefficient file
pub fn read_coefficients(path: impl AsRef<Path>) -> Result<Vec<CoefficientRecord>, ResourceError> {
    read_records(path.as_ref())
}

/// Build the correlation table described by a configuration
pub fn load_correlation_table(config: &CorrelationTableConfig) -> Result<CorrelationTable, ResourceError> {
    let features = read_feature_table(&config.feature_table)?;
    let records = read_coefficients(&config.coefficients)?;
    log::info!(
        "Loading {} correlation coefficient(s) from {}",
        records.len(),
        config.coefficients.display()
    );
    CorrelationTable::build(&features, &records, config.replication_factor).map_err(|source| {
        ResourceError::Table {
            path: config.coefficients.clone(),
            source,
        }
    })
}

/// Feature values of one processed-feature file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessedFeatures {
    /// Feature dimension names, metadata columns excluded
    pub feature_names: Vec<String>,
    /// One row per classification window
    pub windows: Vec<Vec<f64>>,
}

/// Read a processed-feature file, dropping the window metadata columns
pub fn read_processed_features(path: impl AsRef<Path>) -> Result<ProcessedFeatures, ResourceError> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let headers = rdr.headers().map_err(|e| ResourceError::csv(path, e))?.clone();

    let kept: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !WINDOW_METADATA_COLUMNS.contains(name))
        .map(|(i, _)| i)
        .collect();
    let feature_names = kept.iter().map(|&i| headers[i].to_string()).collect();

    let mut windows = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| ResourceError::csv(path, e))?;
        let values = kept
            .iter()
            .map(|&i| {
                let field = record.get(i).unwrap_or_default();
                field.parse::<f64>().map_err(|_| {
                    ResourceError::malformed(
                        path,
                        format!("window {}: '{}' in column '{}' is not a number", row + 1, field, &headers[i]),
                    )
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        windows.push(values);
    }

    Ok(ProcessedFeatures {
        feature_names,
        windows,
    })
}

/// One row of the category annotation table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnnotation {
    #[serde(rename = "Id")]
    pub id: i64,
    /// File listing the music files of the category
    #[serde(rename = "Path")]
    pub path: PathBuf,
    #[serde(rename = "CategoryName")]
    pub category_name: String,
}

/// One music file of a category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryMember {
    #[serde(rename = "Path")]
    pub path: PathBuf,
    #[serde(rename = "Id")]
    pub id: i64,
    /// Label of every window of this file
    #[serde(rename = "Relationship")]
    pub relationship: f64,
}

pub fn read_annotation_table(path: impl AsRef<Path>) -> Result<Vec<CategoryAnnotation>, ResourceError> {
    read_records(path.as_ref())
}

pub fn read_category_file(path: impl AsRef<Path>) -> Result<Vec<CategoryMember>, ResourceError> {
    read_records(path.as_ref())
}

fn required<'a, T>(value: Option<&'a T>, name: &str) -> Result<&'a T, OperatorError> {
    value.ok_or_else(|| OperatorError::MissingParameter(name.to_string()))
}

/// Assemble the labelled training windows of the run's training category
///
/// Every window of every music file in the category becomes one row,
/// labelled with the file's `Relationship`. All processed-feature files must
/// share the same feature columns.
pub fn load_labeled_dataset(context: &SearchContext) -> EvoResult<LabeledDataset> {
    let run = context.configuration();
    let training_input = required(run.training_input.as_ref(), "Training input")?;
    let annotation_table = context.resolve_path(required(run.annotation_table.as_ref(), "Annotation table")?);
    let processed_database = context.resolve_path(required(
        run.processed_feature_database.as_ref(),
        "Processed feature database",
    )?);
    let music_database = run.music_database.as_ref().map(|p| context.resolve_path(p));
    let model = required(run.processing.as_ref(), "Processing model")?;

    let category_id = parse_training_category(training_input).ok_or_else(|| {
        OperatorError::InvalidConfiguration(format!("Training input '{}' has no category id", training_input))
    })?;
    let category = read_annotation_table(&annotation_table)?
        .into_iter()
        .find(|a| a.id == category_id)
        .ok_or_else(|| {
            ResourceError::malformed(&annotation_table, format!("no category with id {}", category_id))
        })?;
    log::info!(
        "Calculating label correlation for category {}-{}",
        category.id,
        category.category_name
    );

    let members = read_category_file(context.resolve_path(&category.path))?;
    let mut dataset: Option<LabeledDataset> = None;
    for member in &members {
        let feature_file = model
            .processed_feature_path(&member.path, music_database.as_deref(), &processed_database)
            .ok_or_else(|| ResourceError::malformed(&category.path, format!("'{}' is not a file", member.path.display())))?;
        let features = read_processed_features(&feature_file)?;

        let data = dataset.get_or_insert_with(|| LabeledDataset::new(features.feature_names.clone()));
        if data.feature_names() != features.feature_names.as_slice() {
            return Err(ResourceError::malformed(
                &feature_file,
                "feature columns differ from the first processed-feature file",
            )
            .into());
        }
        for window in &features.windows {
            data.push(window, member.relationship)
                .map_err(|source| ResourceError::Table {
                    path: feature_file.clone(),
                    source,
                })?;
        }
    }

    let dataset = dataset.unwrap_or_default();
    log::info!(
        "Loaded {} window(s) with {} feature dimension(s) from {} music file(s)",
        dataset.window_count(),
        dataset.dimension_count(),
        members.len()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_feature_table_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        fs::write(&path, "Id,Name,Dimensions\n4,zcr,1\n7,mfcc,13\n").unwrap();

        let table = read_feature_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.dimension_count(), 14);
        assert_eq!(table.offset_of(7, 1).unwrap(), Some(1));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_feature_table("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn test_read_processed_features_drops_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.csv");
        fs::write(&path, "f1,f2,Unit,Start,End\n1.0,2.0,ms,0,1000\n3.0,4.0,ms,500,1500\n").unwrap();

        let features = read_processed_features(&path).unwrap();
        assert_eq!(features.feature_names, vec!["f1", "f2"]);
        assert_eq!(features.windows, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_read_processed_features_rejects_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.csv");
        fs::write(&path, "f1\nabc\n").unwrap();
        assert!(matches!(
            read_processed_features(&path),
            Err(ResourceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_labeled_dataset_requires_training_input() {
        let ctx = SearchContext::new(10, 1);
        let err = load_labeled_dataset(&ctx).unwrap_err();
        assert!(err.to_string().contains("Training input"));
    }
}
