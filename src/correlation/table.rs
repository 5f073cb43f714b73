//! Pairwise correlation between feature dimensions
//!
//! Raw features contribute one or more scalar dimensions each; a
//! [`FeatureTable`] fixes their order and therefore the flat offset of every
//! dimension. A [`CorrelationTable`] stores one coefficient per unordered
//! pair of flat dimensions, after each raw dimension has been replicated
//! `factor` times (derived features such as the mean and standard deviation
//! of a window inherit the correlation of their raw feature).

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// One feature of the feature table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEntry {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Dimensions")]
    pub dimensions: usize,
}

/// Ordered list of features and their dimension counts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTable {
    entries: Vec<FeatureEntry>,
}

impl FeatureTable {
    /// Create a table; feature ids must be unique
    pub fn new(entries: Vec<FeatureEntry>) -> Result<Self, TableError> {
        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(TableError::DuplicateFeature(entry.id));
            }
        }
        Ok(Self { entries })
    }

    /// Build from `(id, dimensions)` pairs
    pub fn from_pairs<I: IntoIterator<Item = (i64, usize)>>(pairs: I) -> Result<Self, TableError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(id, dimensions)| FeatureEntry { id, dimensions })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of scalar dimensions
    pub fn dimension_count(&self) -> usize {
        self.entries.iter().map(|e| e.dimensions).sum()
    }

    /// Zero-based flat offset of a feature dimension
    ///
    /// `dimension` is 1-based within its feature. Returns `Ok(None)` if the
    /// feature is not in the table.
    pub fn offset_of(&self, feature_id: i64, dimension: usize) -> Result<Option<usize>, TableError> {
        let mut offset = 0;
        for entry in &self.entries {
            if entry.id == feature_id {
                if dimension == 0 || dimension > entry.dimensions {
                    return Err(TableError::DimensionOutOfRange {
                        feature_id,
                        dimension,
                        dimensions: entry.dimensions,
                    });
                }
                return Ok(Some(offset + dimension - 1));
            }
            offset += entry.dimensions;
        }
        Ok(None)
    }
}

/// One row of a coefficient file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRecord {
    #[serde(rename = "First feature id")]
    pub first_feature_id: i64,
    #[serde(rename = "First feature dimension")]
    pub first_feature_dimension: usize,
    #[serde(rename = "Second feature id")]
    pub second_feature_id: i64,
    #[serde(rename = "Second feature dimension")]
    pub second_feature_dimension: usize,
    #[serde(rename = "Correlation coefficient")]
    pub coefficient: f64,
}

impl CoefficientRecord {
    pub fn new(first: (i64, usize), second: (i64, usize), coefficient: f64) -> Self {
        Self {
            first_feature_id: first.0,
            first_feature_dimension: first.1,
            second_feature_id: second.0,
            second_feature_dimension: second.1,
            coefficient,
        }
    }
}

/// Symmetric correlation matrix over replicated feature dimensions
///
/// Only the strict upper triangle is stored. Lookups canonicalize `(i, j)`
/// to `(min, max)`; pairs never given a coefficient read as 0 and the
/// diagonal reads as 1. Read-only once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTable {
    size: usize,
    upper: Vec<f64>,
}

impl CorrelationTable {
    /// Table of the given size with all off-diagonal coefficients 0
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            upper: vec![0.0; size * size.saturating_sub(1) / 2],
        }
    }

    /// Build a table from coefficient records
    ///
    /// Each record is broadcast to all `factor × factor` replicated pairs of
    /// its two raw dimensions. Records naming features absent from the
    /// feature table are skipped. A factor of 0 is treated as 1.
    pub fn build<'a, I>(features: &FeatureTable, records: I, factor: usize) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = &'a CoefficientRecord>,
    {
        let factor = factor.max(1);
        let mut table = Self::zeros(features.dimension_count() * factor);
        let mut applied = 0usize;
        let mut skipped = 0usize;

        for record in records {
            let first = features.offset_of(record.first_feature_id, record.first_feature_dimension)?;
            let second = features.offset_of(record.second_feature_id, record.second_feature_dimension)?;
            let (first, second) = match (first, second) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    log::warn!(
                        "Skipping correlation coefficient between features {} and {}: not in the feature table",
                        record.first_feature_id,
                        record.second_feature_id
                    );
                    skipped += 1;
                    continue;
                }
            };
            for m in 0..factor {
                for n in 0..factor {
                    table.set(first * factor + m, second * factor + n, record.coefficient);
                }
            }
            applied += 1;
        }

        log::info!(
            "Correlation table with {} dimensions built from {} coefficient(s) ({} skipped)",
            table.size,
            applied,
            skipped
        );
        Ok(table)
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    fn upper_index(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < column && column < self.size);
        row * self.size - row * (row + 1) / 2 + (column - row - 1)
    }

    /// Store a coefficient; the diagonal is ignored
    fn set(&mut self, i: usize, j: usize, value: f64) {
        if i == j || i >= self.size || j >= self.size {
            return;
        }
        let index = self.upper_index(i.min(j), i.max(j));
        self.upper[index] = value;
    }

    /// Coefficient between two dimensions, in either order
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.size && j < self.size,
            "index ({}, {}) out of range for table of size {}",
            i,
            j,
            self.size
        );
        if i == j {
            return 1.0;
        }
        self.upper[self.upper_index(i.min(j), i.max(j))]
    }

    /// Mean coefficient between `index` and every entry of `others`,
    /// skipping `index` itself if present
    ///
    /// Returns `None` if no other dimension remains.
    pub fn mean_correlation(&self, index: usize, others: &[usize]) -> Option<f64> {
        let (sum, count) = others
            .iter()
            .filter(|&&other| other != index)
            .fold((0.0, 0usize), |(sum, count), &other| {
                (sum + self.get(index, other), count + 1)
            });
        (count > 0).then(|| sum / count as f64)
    }
}
