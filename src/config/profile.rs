//! Implementation profile document.
//!
//! ```yaml
//! name: my-ccl
//! functions: [parse, build_hierarchy, get_string]
//! features: [comments]
//! behaviors:                 # a list, or a map of group -> value
//!   crlf_handling: crlf_normalize_to_lf
//!   tab_handling: tabs_as_whitespace
//!   indent_output: indent_spaces
//!   boolean: boolean_lenient
//!   list_coercion: list_coercion_disabled
//! variants: [proposed_behavior]
//! skip_tests: [deep_nested_objects]
//! skip_tags: ["feature:unicode"]
//! run_only: []
//! ```
//!
//! The document is parsed here and checked by
//! [`ProfileValidator`](crate::validation::ProfileValidator).

use crate::error::{CclError, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Behavior or variant selections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Selections {
    /// Values are assigned to whichever group owns them.
    List(Vec<String>),
    /// Group id to value. A null value counts as unset.
    ByGroup(BTreeMap<String, Option<String>>),
}

impl Default for Selections {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Raw profile as written by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct ProfileDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub behaviors: Selections,
    #[serde(default)]
    pub variants: Selections,
    #[serde(default)]
    pub skip_tests: Vec<String>,
    #[serde(default)]
    pub skip_tags: Vec<String>,
    #[serde(default)]
    pub run_only: Vec<String>,
}

impl ProfileDocument {
    /// Load a profile from a YAML (or JSON) file.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file is missing, or `Yaml` if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CclError::Config(format!(
                "profile not found: {}",
                path.display()
            )));
        }
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// # Errors
    ///
    /// Returns `Yaml` if the text is not a valid profile document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
