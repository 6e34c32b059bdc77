//! Structured error output for scripted callers.
//!
//! Every failure surfaces as a stable code, a message, an optional hint,
//! and a context object. `main` renders it as JSON for `--json` or piped
//! output and as colored text on a terminal.

use crate::error::CclError;
use serde::Serialize;
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    // === Corpus Errors (exit code 2) ===
    /// Source directory or file missing
    CorpusNotFound,
    /// Suite file is not a valid source suite
    SuiteParseError,
    /// Two suites share an output file, or a suite shadows the manifest
    OutputCollision,

    // === Shape Errors (exit code 3) ===
    /// One or more validation payloads could not be normalized
    ShapeError,

    // === Profile Errors (exit code 4) ===
    /// Implementation profile is incomplete or invalid
    InvalidProfile,

    // === Metadata Errors (exit code 5) ===
    /// Behavior metadata file missing
    MetadataNotFound,
    /// Behavior metadata has no behaviors section
    MetadataSectionMissing,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CorpusNotFound => "CORPUS_NOT_FOUND",
            Self::SuiteParseError => "SUITE_PARSE_ERROR",
            Self::OutputCollision => "OUTPUT_COLLISION",
            Self::ShapeError => "SHAPE_ERROR",
            Self::InvalidProfile => "INVALID_PROFILE",
            Self::MetadataNotFound => "METADATA_NOT_FOUND",
            Self::MetadataSectionMissing => "METADATA_SECTION_MISSING",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether rerunning the same command could succeed without input changes.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::IoError)
    }

    /// Process exit code for this category.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::CorpusNotFound | Self::SuiteParseError | Self::OutputCollision => 2,
            Self::ShapeError => 3,
            Self::InvalidProfile => 4,
            Self::MetadataNotFound | Self::MetadataSectionMissing => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `CclError`.
    #[must_use]
    pub fn from_error(err: &CclError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = err.suggestion().map(ToString::to_string);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    ///
    /// Shape and profile failures are listed one per line beneath the message.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }
        output.push_str(&self.message);

        if let Some(items) = self
            .context
            .as_ref()
            .and_then(|ctx| ctx.get("errors"))
            .and_then(Value::as_array)
        {
            for item in items.iter().filter_map(Value::as_str) {
                output.push_str("\n  - ");
                output.push_str(item);
            }
        }

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &CclError) -> (ErrorCode, Option<Value>) {
        match err {
            CclError::CorpusNotFound { path } => (
                ErrorCode::CorpusNotFound,
                Some(json!({ "path": path.display().to_string() })),
            ),
            CclError::SuiteParse { path, reason } => (
                ErrorCode::SuiteParseError,
                Some(json!({ "path": path.display().to_string(), "reason": reason })),
            ),
            CclError::OutputCollision { output, reason } => (
                ErrorCode::OutputCollision,
                Some(json!({ "output": output, "reason": reason })),
            ),
            CclError::ShapeErrors { failures } => {
                let errors: Vec<String> = failures.iter().map(ToString::to_string).collect();
                (
                    ErrorCode::ShapeError,
                    Some(json!({ "count": failures.len(), "errors": errors })),
                )
            }
            CclError::InvalidProfile { errors } => {
                let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
                (
                    ErrorCode::InvalidProfile,
                    Some(json!({ "count": errors.len(), "errors": errors })),
                )
            }
            CclError::MetadataNotFound { path } => (
                ErrorCode::MetadataNotFound,
                Some(json!({ "path": path.display().to_string() })),
            ),
            CclError::MetadataSection { path } => (
                ErrorCode::MetadataSectionMissing,
                Some(json!({ "path": path.display().to_string() })),
            ),
            CclError::Config(_) => (ErrorCode::ConfigError, None),
            CclError::Io(_) => (ErrorCode::IoError, None),
            CclError::Json(_) => (ErrorCode::JsonError, None),
            CclError::Yaml(_) => (ErrorCode::YamlError, None),
            CclError::WithContext { source, .. } => {
                let code = if source.downcast_ref::<std::io::Error>().is_some() {
                    ErrorCode::IoError
                } else if source.downcast_ref::<serde_json::Error>().is_some() {
                    ErrorCode::JsonError
                } else {
                    ErrorCode::InternalError
                };
                (code, None)
            }
            CclError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ShapeError, ShapeFailure, ValidationError};
    use std::path::PathBuf;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ShapeError.as_str(), "SHAPE_ERROR");
        assert_eq!(ErrorCode::InvalidProfile.as_str(), "INVALID_PROFILE");
    }

    #[test]
    fn test_error_code_exit_codes() {
        assert_eq!(ErrorCode::CorpusNotFound.exit_code(), 2);
        assert_eq!(ErrorCode::ShapeError.exit_code(), 3);
        assert_eq!(ErrorCode::InvalidProfile.exit_code(), 4);
        assert_eq!(ErrorCode::MetadataNotFound.exit_code(), 5);
        assert_eq!(ErrorCode::ConfigError.exit_code(), 7);
        assert_eq!(ErrorCode::IoError.exit_code(), 8);
        assert_eq!(ErrorCode::InternalError.exit_code(), 1);
    }

    #[test]
    fn test_shape_errors_carry_every_failure() {
        let err = CclError::ShapeErrors {
            failures: vec![
                ShapeFailure {
                    file: None,
                    test: "a".to_string(),
                    validation: "parse".to_string(),
                    error: ShapeError::EmptyCases,
                },
                ShapeFailure {
                    file: None,
                    test: "b".to_string(),
                    validation: "mystery".to_string(),
                    error: ShapeError::UnknownValidation("mystery".to_string()),
                },
            ],
        };
        let structured = StructuredError::from_error(&err);
        let json = structured.to_json();
        assert_eq!(json["error"]["code"], "SHAPE_ERROR");
        assert_eq!(json["error"]["context"]["count"], 2);
        assert_eq!(
            json["error"]["context"]["errors"][1],
            "test 'b' validation 'mystery': unknown validation 'mystery'"
        );
    }

    #[test]
    fn test_to_human_lists_profile_errors() {
        let err = CclError::InvalidProfile {
            errors: vec![ValidationError::new(
                "crlf_handling",
                "CRLF handling choice is required (crlf_normalize_to_lf | crlf_preserve_literal)",
            )],
        };
        let structured = StructuredError::from_error(&err);

        let plain = structured.to_human(false);
        assert!(plain.starts_with("Error: Invalid implementation profile"));
        assert!(plain.contains("\n  - crlf_handling: CRLF handling choice is required"));
        assert!(plain.contains("Hint: "));

        let colored = structured.to_human(true);
        assert!(colored.contains("\x1b[31m"));
        assert!(colored.contains("\x1b[33m"));
    }

    #[test]
    fn test_context_wrapped_io_maps_to_io_code() {
        let err = CclError::WithContext {
            context: "reading suite".to_string(),
            source: Box::new(std::io::Error::other("denied")),
        };
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.code, ErrorCode::IoError);
        assert!(structured.retryable);
    }

    #[test]
    fn test_output_collision_is_a_corpus_error() {
        let err = CclError::OutputCollision {
            output: "core.json".to_string(),
            reason: "also produced by 'a/core.json'".to_string(),
        };
        let json = StructuredError::from_error(&err).to_json();
        assert_eq!(json["error"]["code"], "OUTPUT_COLLISION");
        assert_eq!(json["error"]["context"]["output"], "core.json");
        assert_eq!(ErrorCode::OutputCollision.exit_code(), 2);
    }

    #[test]
    fn test_corpus_not_found_context_has_path() {
        let err = CclError::CorpusNotFound {
            path: PathBuf::from("missing"),
        };
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.context.unwrap()["path"], "missing");
    }
}
