//! Validation payload normalization.
//!
//! The corpus encodes expected results several ways. Each payload is
//! classified by trying typed shapes in a fixed order, then converted to a
//! [`CanonicalResult`] according to the validation's result kind:
//!
//! 1. `{error: true, error_message}` - error result, no value, count 0
//! 2. `{count, expected}` - unwrapped; a count mismatch only warns
//! 3. `{cases: [{args, expected}]}` - first case wins
//! 4. anything else, including a bare entries array - used as is

use crate::error::ShapeError;
use crate::model::{CanonicalResult, Entry};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::warn;

/// Canonical shape a validation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Entries,
    Object,
    Scalar,
    List,
}

impl ResultKind {
    /// Result kind for a validation name, or `None` if the name is unknown.
    #[must_use]
    pub fn for_validation(name: &str) -> Option<Self> {
        match name {
            "parse" | "parse_value" | "filter" | "expand_dotted" => Some(Self::Entries),
            "build_hierarchy" => Some(Self::Object),
            "get_string" | "get_int" | "get_bool" | "get_float" | "load" | "round_trip"
            | "canonical_format" | "associativity" => Some(Self::Scalar),
            "get_list" => Some(Self::List),
            _ => None,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Entries => "entries",
            Self::Object => "object",
            Self::Scalar => "value",
            Self::List => "list",
        }
    }
}

/// The payload describes an expected failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedError {
    pub message: Option<String>,
}

/// Outcome of normalizing one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub expected: CanonicalResult,
    pub args: Vec<String>,
    pub error: Option<ExpectedError>,
    pub warnings: Vec<String>,
}

impl Normalized {
    fn value(expected: CanonicalResult) -> Self {
        Self {
            expected,
            args: Vec::new(),
            error: None,
            warnings: Vec::new(),
        }
    }

    fn failure(message: Option<String>) -> Self {
        Self {
            expected: CanonicalResult::Scalar(None),
            args: Vec::new(),
            error: Some(ExpectedError { message }),
            warnings: Vec::new(),
        }
    }
}

fn expect_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    if bool::deserialize(deserializer)? {
        Ok(true)
    } else {
        Err(de::Error::custom("error flag is false"))
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(deserialize_with = "expect_true")]
    #[allow(dead_code)]
    error: bool,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct CountedPayload {
    count: Number,
    expected: Value,
}

#[derive(Deserialize)]
struct CasesPayload {
    cases: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    expected: Value,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    error_message: Option<String>,
}

enum PayloadShape<'a> {
    Error(Option<String>),
    Counted { count: Number, expected: Value },
    Cases(Vec<Case>),
    Direct(&'a Value),
}

impl<'a> PayloadShape<'a> {
    fn classify(payload: &'a Value) -> Self {
        // Arrays never hold a wrapper; serde would otherwise accept them as
        // positional structs.
        if payload.is_array() {
            return Self::Direct(payload);
        }
        if let Ok(err) = ErrorPayload::deserialize(payload) {
            return Self::Error(err.error_message);
        }
        if let Ok(counted) = CountedPayload::deserialize(payload) {
            return Self::Counted {
                count: counted.count,
                expected: counted.expected,
            };
        }
        if let Ok(cases) = CasesPayload::deserialize(payload) {
            return Self::Cases(cases.cases);
        }
        Self::Direct(payload)
    }
}

/// A declared count matches only if it is a non-negative integer equal to
/// `actual`. `2.0` counts as integral.
#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
fn count_matches(declared: &Number, actual: usize) -> bool {
    match declared.as_u64() {
        Some(n) => usize::try_from(n).is_ok_and(|n| n == actual),
        None => declared.as_f64().is_some_and(|f| f == actual as f64),
    }
}

/// Normalize the payload of `validation`.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the validation is unknown or the payload does
/// not fit its result kind.
pub fn normalize(validation: &str, payload: &Value) -> Result<Normalized, ShapeError> {
    let kind = ResultKind::for_validation(validation)
        .ok_or_else(|| ShapeError::UnknownValidation(validation.to_string()))?;

    match PayloadShape::classify(payload) {
        PayloadShape::Error(message) => Ok(Normalized::failure(message)),
        PayloadShape::Direct(value) => Ok(Normalized::value(convert(kind, value)?)),
        PayloadShape::Counted { count, expected } => {
            let result = convert(kind, &expected)?;
            let mut normalized = Normalized::value(result);
            let actual = normalized.expected.count();
            if !count_matches(&count, actual) {
                warn!(validation, declared = %count, actual, "Count does not match expected payload");
                normalized.warnings.push(format!(
                    "declared count {count} does not match {actual} expected item(s); using {actual}"
                ));
            }
            Ok(normalized)
        }
        PayloadShape::Cases(cases) => {
            let total = cases.len();
            let first = cases.into_iter().next().ok_or(ShapeError::EmptyCases)?;
            let mut normalized = if first.error {
                Normalized::failure(first.error_message)
            } else {
                Normalized::value(convert(kind, &first.expected)?)
            };
            normalized.args = first.args.iter().map(render_arg).collect();
            if total > 1 {
                warn!(validation, dropped = total - 1, "Extra cases dropped");
                normalized
                    .warnings
                    .push(format!("{} extra case(s) dropped; only the first is compiled", total - 1));
            }
            Ok(normalized)
        }
    }
}

fn convert(kind: ResultKind, value: &Value) -> Result<CanonicalResult, ShapeError> {
    match kind {
        ResultKind::Entries => {
            let items = as_array(kind, value)?;
            let entries = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    Entry::deserialize(item).map_err(|err| ShapeError::InvalidEntry {
                        index,
                        reason: err.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CanonicalResult::Entries(entries))
        }
        ResultKind::List => Ok(CanonicalResult::List(as_array(kind, value)?.clone())),
        ResultKind::Object => Ok(CanonicalResult::Object(value.clone())),
        ResultKind::Scalar => Ok(CanonicalResult::Scalar(Some(value.clone()))),
    }
}

fn as_array(kind: ResultKind, value: &Value) -> Result<&Vec<Value>, ShapeError> {
    value.as_array().ok_or_else(|| ShapeError::ExpectedArray {
        shape: kind.label(),
        found: json_type(value),
    })
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_arg(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
