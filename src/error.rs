//! Error types for evo-featsel
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for representation operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// An operator received a representation of the wrong shape
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Invalid representation structure
    #[error("Invalid genome structure: {0}")]
    InvalidStructure(String),

    /// Constraint violation in a representation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Error type for operator configuration and application
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),

    /// A required named parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A named parameter carried a value of the wrong kind
    #[error("Parameter '{name}' must be a {expected} value")]
    ParameterType { name: String, expected: &'static str },

    /// Unknown operator name
    #[error("Unknown mutation operator: {0}")]
    UnknownOperator(String),

    /// The operator cannot resume a run that did not start at generation 0
    #[error("{operator} cannot continue a run started in a previous experiment (generation {generation})")]
    UnsupportedContinuation {
        operator: &'static str,
        generation: usize,
    },
}

/// Error type for inconsistent correlation-table input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// A coefficient addresses a dimension the feature does not have
    #[error("feature {feature_id} has {dimensions} dimension(s), coefficient refers to dimension {dimension}")]
    DimensionOutOfRange {
        feature_id: i64,
        dimension: usize,
        dimensions: usize,
    },

    /// The same feature id appears twice in the feature table
    #[error("feature {0} is listed more than once")]
    DuplicateFeature(i64),

    /// A classification window does not have one value per feature dimension
    #[error("window has {actual} value(s), expected {expected}")]
    WindowWidth { expected: usize, actual: usize },
}

/// Error type for loading auxiliary tables
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The file could not be opened or read
    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid CSV or a row failed to deserialize
    #[error("Could not parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file parsed, but its content is inconsistent
    #[error("Malformed {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// Coefficients do not fit the feature table
    #[error("Inconsistent correlation input {}: {source}", .path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    /// JSON configuration could not be parsed
    #[error("Could not parse configuration {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ResourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Resource error
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_error_display() {
        let err = GenomeError::TypeMismatch {
            expected: "feature mask",
            actual: "bounded integer",
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected feature mask, got bounded integer"
        );

        let err = GenomeError::DimensionMismatch {
            expected: 10,
            actual: 5,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 10, got 5");
    }

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::ParameterType {
            name: "gamma".to_string(),
            expected: "double",
        };
        assert_eq!(err.to_string(), "Parameter 'gamma' must be a double value");

        let err = OperatorError::UnsupportedContinuation {
            operator: "IntegerMutation",
            generation: 7,
        };
        assert!(err.to_string().contains("generation 7"));
    }

    #[test]
    fn test_resource_error_keeps_path() {
        let err = ResourceError::io(
            "/tmp/missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_evolution_error_from_genome_error() {
        let genome_err = GenomeError::InvalidStructure("bad shape".to_string());
        let evo_err: EvolutionError = genome_err.into();
        assert!(matches!(evo_err, EvolutionError::Genome(_)));
    }

    #[test]
    fn test_evolution_error_from_resource_error() {
        let err: EvolutionError = ResourceError::malformed("t.csv", "bad row").into();
        assert!(matches!(err, EvolutionError::Resource(_)));
        assert_eq!(err.to_string(), "Resource error: Malformed t.csv: bad row");
    }
}
