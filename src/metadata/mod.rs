//! Declared behavior conflicts.
//!
//! The store is loaded once and then only queried. It is fail-open: a
//! behavior the store does not know is treated as applying to every
//! function. The profile validator is deliberately the opposite (it rejects
//! unknown group values), see [`crate::validation`].

use crate::error::{CclError, Result};
use crate::model::tag::push_unique;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Key the declarations live under when embedded in a larger schema document.
pub const EMBEDDED_SECTION: &str = "x-behaviorMetadata";

/// One declared behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorDeclaration {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub affected_functions: Vec<String>,
    #[serde(default)]
    pub mutually_exclusive_with: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDefaults {
    #[serde(default)]
    pub unmapped_behavior: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// The conflict declaration store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BehaviorMetadata {
    pub behaviors: BTreeMap<String, BehaviorDeclaration>,
    #[serde(default)]
    pub defaults: MetadataDefaults,
}

/// Advisory findings for one source test. Never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataReport {
    pub test_name: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl MetadataReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

impl BehaviorMetadata {
    /// Load from a file holding either the bare document or a schema with an
    /// `x-behaviorMetadata` section.
    ///
    /// # Errors
    ///
    /// - `MetadataNotFound` if the file does not exist
    /// - `MetadataSection` if neither form is present
    /// - `Json` if the section is malformed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CclError::MetadataNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let metadata = Self::from_json_str(&text).map_err(|err| match err {
            CclError::MetadataSection { .. } => CclError::MetadataSection {
                path: path.to_path_buf(),
            },
            other => other,
        })?;
        debug!(path = %path.display(), behaviors = metadata.behaviors.len(), "Loaded behavior metadata");
        Ok(metadata)
    }

    /// Parse from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `MetadataSection` if no behaviors section is found, or `Json`
    /// if the text or section is malformed.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        let section = if document.get("behaviors").is_some() {
            document
        } else if let Some(embedded) = document.get(EMBEDDED_SECTION) {
            embedded.clone()
        } else {
            return Err(CclError::MetadataSection {
                path: std::path::PathBuf::new(),
            });
        };
        Ok(serde_json::from_value(section)?)
    }

    #[must_use]
    pub fn is_known(&self, behavior: &str) -> bool {
        self.behaviors.contains_key(behavior)
    }

    /// Known behavior names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.behaviors.keys().map(String::as_str)
    }

    /// Behaviors that apply to `function`.
    ///
    /// Unmapped behaviors are kept (fail-open); mapped ones only when
    /// `function` is listed in their affected functions.
    #[must_use]
    pub fn filter_for_function(&self, behaviors: &[String], function: &str) -> Vec<String> {
        behaviors
            .iter()
            .filter(|behavior| {
                self.behaviors.get(behavior.as_str()).is_none_or(|decl| {
                    decl.affected_functions.iter().any(|f| f == function)
                })
            })
            .cloned()
            .collect()
    }

    /// Union of everything the given behaviors exclude, sorted and deduplicated.
    ///
    /// Exclusion is symmetric: if `x` declares `b` exclusive, `x` is returned
    /// for `b` even when `b` itself does not list `x`.
    #[must_use]
    pub fn conflicts_of(&self, behaviors: &[String]) -> Vec<String> {
        let mut out = BTreeSet::new();
        for behavior in behaviors {
            if let Some(decl) = self.behaviors.get(behavior) {
                out.extend(decl.mutually_exclusive_with.iter().cloned());
            }
            for (other, decl) in &self.behaviors {
                if decl.mutually_exclusive_with.iter().any(|b| b == behavior) {
                    out.insert(other.clone());
                }
            }
        }
        out.into_iter().collect()
    }

    /// Are `a` and `b` declared exclusive in either direction?
    #[must_use]
    pub fn declares_exclusive(&self, a: &str, b: &str) -> bool {
        let lists = |x: &str, y: &str| {
            self.behaviors
                .get(x)
                .is_some_and(|decl| decl.mutually_exclusive_with.iter().any(|c| c == y))
        };
        lists(a, b) || lists(b, a)
    }

    /// Check one source test against the store.
    ///
    /// `declared_conflicts` may hold bare names or `behavior:` tags.
    #[must_use]
    pub fn validate(
        &self,
        test_name: &str,
        behaviors: &[String],
        declared_conflicts: &[String],
    ) -> MetadataReport {
        let mut report = MetadataReport {
            test_name: test_name.to_string(),
            ..MetadataReport::default()
        };

        for behavior in behaviors {
            if !self.is_known(behavior) {
                report.warnings.push(format!(
                    "unknown behavior '{behavior}' (not in metadata, treating as global)"
                ));
            }
        }

        let declared: Vec<&str> = declared_conflicts
            .iter()
            .map(|c| c.strip_prefix("behavior:").unwrap_or(c))
            .collect();
        for implied in self.conflicts_of(behaviors) {
            if declared.contains(&implied.as_str()) {
                continue;
            }
            let cause = self.cause_of(behaviors, &implied);
            report.warnings.push(format!(
                "behavior '{cause}' implies conflict with '{implied}' but 'behavior:{implied}' is not declared"
            ));
        }

        report
    }

    fn cause_of(&self, behaviors: &[String], conflict: &str) -> String {
        behaviors
            .iter()
            .find(|b| self.declares_exclusive(b, conflict))
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Extend declared behavior conflicts with those implied by the store.
    ///
    /// Declared entries keep their order and come first.
    #[must_use]
    pub fn merged_conflicts(&self, declared: &[String], behaviors: &[String]) -> Vec<String> {
        let mut merged = declared.to_vec();
        for implied in self.conflicts_of(behaviors) {
            push_unique(&mut merged, &implied);
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn store() -> BehaviorMetadata {
        serde_json::from_value(json!({
            "behaviors": {
                "tabs_as_content": {
                    "description": "Tabs are preserved",
                    "affectedFunctions": ["parse", "canonical_format"],
                    "mutuallyExclusiveWith": ["tabs_as_whitespace"]
                },
                "tabs_as_whitespace": {
                    "description": "Tabs are whitespace",
                    "affectedFunctions": ["parse"],
                    "mutuallyExclusiveWith": []
                },
                "boolean_strict": {
                    "affectedFunctions": ["get_bool"],
                    "mutuallyExclusiveWith": ["boolean_lenient"]
                }
            },
            "defaults": {"unmappedBehavior": "global"}
        }))
        .unwrap()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn filter_keeps_unmapped_and_affected() {
        let store = store();
        let behaviors = names(&["tabs_as_content", "boolean_strict", "brand_new"]);
        assert_eq!(
            store.filter_for_function(&behaviors, "parse"),
            names(&["tabs_as_content", "brand_new"])
        );
        assert_eq!(
            store.filter_for_function(&behaviors, "get_bool"),
            names(&["boolean_strict", "brand_new"])
        );
    }

    #[test]
    fn conflicts_are_symmetric() {
        let store = store();
        assert_eq!(
            store.conflicts_of(&names(&["tabs_as_whitespace"])),
            names(&["tabs_as_content"])
        );
        assert_eq!(
            store.conflicts_of(&names(&["tabs_as_content", "boolean_strict"])),
            names(&["boolean_lenient", "tabs_as_whitespace"])
        );
        assert!(store.conflicts_of(&names(&["unknown"])).is_empty());
    }

    #[test]
    fn validate_warns_never_errors() {
        let store = store();
        let report = store.validate(
            "t1",
            &names(&["tabs_as_content", "mystery"]),
            &names(&[]),
        );
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(
            report.warnings[0],
            "unknown behavior 'mystery' (not in metadata, treating as global)"
        );
        assert!(report.warnings[1].contains("'tabs_as_content'"));
        assert!(report.warnings[1].contains("'behavior:tabs_as_whitespace'"));
    }

    #[test]
    fn validate_accepts_declared_conflict() {
        let store = store();
        let report = store.validate(
            "t2",
            &names(&["tabs_as_content"]),
            &names(&["behavior:tabs_as_whitespace"]),
        );
        assert!(report.is_clean());
    }

    #[test]
    fn merged_conflicts_keep_declared_first() {
        let store = store();
        let merged = store.merged_conflicts(
            &names(&["zeta", "tabs_as_whitespace"]),
            &names(&["tabs_as_content", "boolean_strict"]),
        );
        assert_eq!(
            merged,
            names(&["zeta", "tabs_as_whitespace", "boolean_lenient"])
        );
    }

    #[test]
    fn loads_embedded_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({"$schema": "x", "x-behaviorMetadata": {"behaviors": {"crlf_preserve_literal": {}}}})
        )
        .unwrap();
        let store = BehaviorMetadata::load(file.path()).unwrap();
        assert!(store.is_known("crlf_preserve_literal"));
    }

    #[test]
    fn missing_section_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"other\": 1}}").unwrap();
        let err = BehaviorMetadata::load(file.path()).unwrap_err();
        match err {
            CclError::MetadataSection { path } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = BehaviorMetadata::load(Path::new("/nonexistent/metadata.json")).unwrap_err();
        assert!(matches!(err, CclError::MetadataNotFound { .. }));
    }
}
