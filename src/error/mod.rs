//! Error types and handling for `ccl_test_compiler`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Accepts `anyhow` errors through a transparent variant
//! - Shape and profile failures are collected, never reported one at a time
//! - Provides recovery hints and category exit codes via [`StructuredError`]

mod context;
mod structured;

pub use context::{OptionExt, ResultExt};
pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ccl_test_compiler` operations.
#[derive(Error, Debug)]
pub enum CclError {
    // === Corpus Errors ===
    /// Source directory or file does not exist.
    #[error("Test corpus not found at '{path}'")]
    CorpusNotFound { path: PathBuf },

    /// A suite file could not be parsed as a source test suite.
    #[error("Failed to parse suite '{path}': {reason}")]
    SuiteParse { path: PathBuf, reason: String },

    /// Two suites would compile to the same output file, or a suite would
    /// overwrite the manifest.
    #[error("Output '{output}' cannot be written: {reason}")]
    OutputCollision { output: String, reason: String },

    // === Shape Errors ===
    /// Compilation finished with one or more shape errors.
    #[error("Compilation failed with {} shape error(s)", failures.len())]
    ShapeErrors { failures: Vec<ShapeFailure> },

    // === Profile Errors ===
    /// The implementation profile is incomplete or contains invalid selections.
    #[error("Invalid implementation profile: {}", join_errors(errors))]
    InvalidProfile { errors: Vec<ValidationError> },

    // === Metadata Errors ===
    /// Behavior metadata document not found.
    #[error("Behavior metadata not found at '{path}'")]
    MetadataNotFound { path: PathBuf },

    /// Behavior metadata document has no behaviors section.
    #[error("Behavior metadata section missing in '{path}'")]
    MetadataSection { path: PathBuf },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A malformed validation payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The validation name has no known result shape.
    #[error("unknown validation '{0}'")]
    UnknownValidation(String),

    /// The payload must be an array.
    #[error("expected array for {shape} result, got {found}")]
    ExpectedArray {
        shape: &'static str,
        found: &'static str,
    },

    /// An element of an entries payload is not a `{key, value}` string pair.
    #[error("entry {index} must have string key and value: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// A case-list payload has no cases.
    #[error("case list is empty")]
    EmptyCases,
}

/// One located shape failure inside a batch compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeFailure {
    pub file: Option<String>,
    pub test: String,
    pub validation: String,
    pub error: ShapeError,
}

impl std::fmt::Display for ShapeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}: ")?;
        }
        write!(
            f,
            "test '{}' validation '{}': {}",
            self.test, self.validation, self.error
        )
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CclError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::CorpusNotFound { .. } => Some("Check --source or the source-dir config key"),
            Self::OutputCollision { .. } => {
                Some("Rename or move one of the source suites so every output name is unique")
            }
            Self::ShapeErrors { .. } => {
                Some("Fix the listed validation payloads in the source suite files")
            }
            Self::InvalidProfile { .. } => {
                Some("Select exactly one value for every behavior group and the variant group")
            }
            Self::MetadataNotFound { .. } => Some("Check --metadata or the metadata config key"),
            Self::MetadataSection { .. } => {
                Some("Add a 'behaviors' (or 'x-behaviorMetadata') section to the document")
            }
            _ => None,
        }
    }
}

/// Result type using `CclError`.
pub type Result<T> = std::result::Result<T, CclError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CclError::CorpusNotFound {
            path: PathBuf::from("tests"),
        };
        assert_eq!(err.to_string(), "Test corpus not found at 'tests'");
    }

    #[test]
    fn test_shape_errors_counts_failures() {
        let err = CclError::ShapeErrors {
            failures: vec![ShapeFailure {
                file: None,
                test: "k1".to_string(),
                validation: "parse".to_string(),
                error: ShapeError::ExpectedArray {
                    shape: "entries",
                    found: "object",
                },
            }],
        };
        assert_eq!(err.to_string(), "Compilation failed with 1 shape error(s)");
    }

    #[test]
    fn test_output_collision_names_output() {
        let err = CclError::OutputCollision {
            output: "manifest.json".to_string(),
            reason: "reserved for the manifest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Output 'manifest.json' cannot be written: reserved for the manifest"
        );
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_invalid_profile_lists_every_error() {
        let err = CclError::InvalidProfile {
            errors: vec![
                ValidationError::new("variant", "choice is required"),
                ValidationError::new("tab_handling", "choice is required"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("variant: choice is required"));
        assert!(text.contains("tab_handling: choice is required"));
    }

    #[test]
    fn test_shape_failure_display_includes_file() {
        let failure = ShapeFailure {
            file: Some("api_core.json".to_string()),
            test: "t".to_string(),
            validation: "get_list".to_string(),
            error: ShapeError::EmptyCases,
        };
        assert_eq!(
            failure.to_string(),
            "api_core.json: test 't' validation 'get_list': case list is empty"
        );
    }
}
