//! Core data types for `ccl_test_compiler`.
//!
//! - `SourceSuite` / `SourceTest` - one input, many named validations
//! - `AtomicTestUnit` - one input, one validation, one expected result
//! - `CanonicalResult` - the normalized expected result
//! - `ConflictsByCategory` - declared conflicts split by tag category

pub mod tag;

pub use tag::{Tag, TagCategory, TagSets, parse_tag, partition};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// One source specification file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSuite {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tests: Vec<SourceTest>,
}

/// A source test: one input and an ordered mapping of validations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTest {
    pub name: String,
    #[serde(default)]
    pub input: String,
    /// Validation name to payload, in document order.
    #[serde(default)]
    pub validations: Map<String, Value>,
    #[serde(default)]
    pub meta: SourceMeta,
}

impl SourceTest {
    /// Partition this test's tags.
    #[must_use]
    pub fn tag_sets(&self) -> TagSets {
        partition(&self.meta.tags)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMeta {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
}

/// A key/value pair produced by parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Canonical expected result.
///
/// `count` is never stored; it is always the natural size of the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ExpectedRepr")]
pub enum CanonicalResult {
    Entries(Vec<Entry>),
    Object(Value),
    /// `None` for error results, which carry no value and count zero.
    Scalar(Option<Value>),
    List(Vec<Value>),
}

impl CanonicalResult {
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Entries(entries) => entries.len(),
            Self::List(items) => items.len(),
            Self::Object(_) | Self::Scalar(Some(_)) => 1,
            Self::Scalar(None) => 0,
        }
    }
}

/// Wire form of [`CanonicalResult`]: `{count, entries|object|value|list}`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExpectedRepr {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Value>>,
}

impl From<CanonicalResult> for ExpectedRepr {
    fn from(result: CanonicalResult) -> Self {
        let count = result.count();
        let mut repr = Self {
            count,
            entries: None,
            object: None,
            value: None,
            list: None,
        };
        match result {
            CanonicalResult::Entries(entries) => repr.entries = Some(entries),
            CanonicalResult::Object(object) => repr.object = Some(object),
            CanonicalResult::Scalar(value) => repr.value = value,
            CanonicalResult::List(list) => repr.list = Some(list),
        }
        repr
    }
}

/// Declared conflicts split by tag category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ConflictsByCategory {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl ConflictsByCategory {
    /// Parse declared conflict strings with the tag colon convention.
    ///
    /// Legacy (colon-less) entries are dropped.
    #[must_use]
    pub fn parse<I, S>(conflicts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sets = partition(conflicts);
        Self {
            functions: sets.functions,
            behaviors: sets.behaviors,
            variants: sets.variants,
            features: sets.features,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.behaviors.is_empty()
            && self.variants.is_empty()
            && self.features.is_empty()
    }
}

/// One compiled test: a single input, validation and expected result.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AtomicTestUnit {
    /// `{source_test}_{validation}`
    pub name: String,
    pub input: String,
    pub validation: String,
    #[schemars(with = "ExpectedRepr")]
    pub expected: CanonicalResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    pub functions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
    #[serde(skip_serializing_if = "ConflictsByCategory::is_empty")]
    pub conflicts: ConflictsByCategory,
    /// Direct prerequisites of the validation's function.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub level: u32,
    pub source_test: String,
    #[serde(skip_serializing_if = "is_false")]
    pub expect_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl AtomicTestUnit {
    /// Every typed tag this unit carries.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        tagged(TagCategory::Function, &self.functions)
            .chain(tagged(TagCategory::Feature, &self.features))
            .chain(tagged(TagCategory::Behavior, &self.behaviors))
            .chain(tagged(TagCategory::Variant, &self.variants))
    }
}

fn tagged(category: TagCategory, names: &[String]) -> impl Iterator<Item = Tag> + '_ {
    names
        .iter()
        .map(move |name| Tag::new(category.clone(), name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_counts() {
        let entries = CanonicalResult::Entries(vec![Entry::new("a", "1"), Entry::new("b", "2")]);
        assert_eq!(entries.count(), 2);
        assert_eq!(CanonicalResult::Object(json!({"a": {}})).count(), 1);
        assert_eq!(CanonicalResult::Scalar(Some(json!(42))).count(), 1);
        assert_eq!(CanonicalResult::Scalar(None).count(), 0);
        assert_eq!(CanonicalResult::List(vec![json!("x")]).count(), 1);
    }

    #[test]
    fn canonical_serializes_wire_form() {
        let value = serde_json::to_value(CanonicalResult::Entries(vec![Entry::new("a", "1")]))
            .unwrap();
        assert_eq!(
            value,
            json!({"count": 1, "entries": [{"key": "a", "value": "1"}]})
        );

        let error = serde_json::to_value(CanonicalResult::Scalar(None)).unwrap();
        assert_eq!(error, json!({"count": 0}));
    }

    #[test]
    fn conflicts_parse_by_category() {
        let conflicts = ConflictsByCategory::parse([
            "behavior:tabs_as_whitespace",
            "variant:reference_compliant",
            "bare",
        ]);
        assert_eq!(conflicts.behaviors, vec!["tabs_as_whitespace"]);
        assert_eq!(conflicts.variants, vec!["reference_compliant"]);
        assert!(conflicts.functions.is_empty());
        assert!(!conflicts.is_empty());
    }

    #[test]
    fn source_test_keeps_validation_order() {
        let test: SourceTest = serde_json::from_value(json!({
            "name": "ordered",
            "input": "a = 1",
            "validations": {"get_int": 1, "parse": [], "build_hierarchy": {}},
            "meta": {"tags": ["function:parse"], "level": 2}
        }))
        .unwrap();
        let names: Vec<&str> = test.validations.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["get_int", "parse", "build_hierarchy"]);
        assert_eq!(test.meta.level, 2);
    }
}
