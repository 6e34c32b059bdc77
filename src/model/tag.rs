//! Structured capability tags.
//!
//! A tag is written `category:name` and split on the first colon. Strings
//! without a colon are legacy tags; they never reach the typed sets but stay
//! available as raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag category prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    Function,
    Feature,
    Behavior,
    Variant,
    Legacy,
    #[serde(untagged)]
    Custom(String),
}

impl TagCategory {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Function => "function",
            Self::Feature => "feature",
            Self::Behavior => "behavior",
            Self::Variant => "variant",
            Self::Legacy => "legacy",
            Self::Custom(value) => value,
        }
    }

    /// Function, feature, behavior or variant.
    #[must_use]
    pub const fn is_typed(&self) -> bool {
        matches!(
            self,
            Self::Function | Self::Feature | Self::Behavior | Self::Variant
        )
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TagCategory {
    fn from(s: &str) -> Self {
        match s {
            "function" => Self::Function,
            "feature" => Self::Feature,
            "behavior" => Self::Behavior,
            "variant" => Self::Variant,
            "legacy" => Self::Legacy,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// A `(category, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub category: TagCategory,
    pub name: String,
}

impl Tag {
    #[must_use]
    pub fn new(category: TagCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// Parse a raw tag string. Every string is representable.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((category, name)) => Self::new(TagCategory::from(category), name),
            None => Self::new(TagCategory::Legacy, raw),
        }
    }

    /// Does this tag match `pattern`?
    ///
    /// A pattern without a colon matches a tag of any category with that name.
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match pattern.split_once(':') {
            Some((category, name)) => self.category.as_str() == category && self.name == name,
            None => self.name == pattern,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category == TagCategory::Legacy {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.category, self.name)
        }
    }
}

impl FromStr for Tag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Parse a single raw tag.
#[must_use]
pub fn parse_tag(raw: &str) -> Tag {
    Tag::parse(raw)
}

/// Tags grouped by category.
///
/// Each typed list keeps first-seen order and holds no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSets {
    pub functions: Vec<String>,
    pub features: Vec<String>,
    pub behaviors: Vec<String>,
    pub variants: Vec<String>,
    /// Raw strings of legacy and unrecognized-category tags.
    pub untyped: Vec<String>,
}

impl TagSets {
    /// Add a function name unless it is already present.
    pub fn add_function(&mut self, name: &str) {
        push_unique(&mut self.functions, name);
    }
}

/// Group a tag list by category.
#[must_use]
pub fn partition<I, S>(tags: I) -> TagSets
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sets = TagSets::default();
    for raw in tags {
        let raw = raw.as_ref();
        let tag = Tag::parse(raw);
        let slot = match tag.category {
            TagCategory::Function => &mut sets.functions,
            TagCategory::Feature => &mut sets.features,
            TagCategory::Behavior => &mut sets.behaviors,
            TagCategory::Variant => &mut sets.variants,
            TagCategory::Legacy | TagCategory::Custom(_) => {
                sets.untyped.push(raw.to_string());
                continue;
            }
        };
        push_unique(slot, &tag.name);
    }
    sets
}

pub(crate) fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_first_colon() {
        let tag = parse_tag("behavior:a:b");
        assert_eq!(tag.category, TagCategory::Behavior);
        assert_eq!(tag.name, "a:b");
    }

    #[test]
    fn parse_without_colon_is_legacy() {
        let tag = parse_tag("whitespace");
        assert_eq!(tag.category, TagCategory::Legacy);
        assert_eq!(tag.name, "whitespace");
        assert_eq!(tag.to_string(), "whitespace");
    }

    #[test]
    fn parse_unknown_category_is_custom() {
        let tag = parse_tag("level:3");
        assert_eq!(tag.category, TagCategory::Custom("level".to_string()));
        assert!(!tag.category.is_typed());
        assert_eq!(tag.to_string(), "level:3");
    }

    #[test]
    fn partition_groups_by_category() {
        let sets = partition([
            "function:parse",
            "feature:comments",
            "behavior:tabs_as_content",
            "variant:proposed_behavior",
            "basic",
            "function:parse",
        ]);
        assert_eq!(sets.functions, vec!["parse"]);
        assert_eq!(sets.features, vec!["comments"]);
        assert_eq!(sets.behaviors, vec!["tabs_as_content"]);
        assert_eq!(sets.variants, vec!["proposed_behavior"]);
        assert_eq!(sets.untyped, vec!["basic"]);
    }

    #[test]
    fn matches_with_and_without_category() {
        let tag = parse_tag("function:get_int");
        assert!(tag.matches("function:get_int"));
        assert!(tag.matches("get_int"));
        assert!(!tag.matches("feature:get_int"));
    }

    #[test]
    fn add_function_is_idempotent() {
        let mut sets = partition(["function:parse"]);
        sets.add_function("parse");
        sets.add_function("build_hierarchy");
        assert_eq!(sets.functions, vec!["parse", "build_hierarchy"]);
    }
}
