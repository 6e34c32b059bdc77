//! Implementation profile validation.
//!
//! A profile is either `Incomplete` or `Valid`. Validation keeps no state
//! between calls and collects every error in one pass.
//!
//! Unknown group values are rejected here (fail-closed), while the metadata
//! store and the compile gate treat unknown behaviors, functions and features
//! as applicable (fail-open).

use crate::config::profile::{ProfileDocument, Selections};
use crate::error::{CclError, Result, ValidationError};
use crate::model::TagCategory;
use serde::Serialize;
use std::collections::BTreeMap;

/// Functions a profile may list.
pub const KNOWN_FUNCTIONS: &[&str] = &[
    "parse",
    "parse_value",
    "filter",
    "expand_dotted",
    "build_hierarchy",
    "get_string",
    "get_int",
    "get_bool",
    "get_float",
    "get_list",
    "load",
    "round_trip",
    "canonical_format",
    "associativity",
];

/// Features a profile may list.
pub const KNOWN_FEATURES: &[&str] = &[
    "comments",
    "experimental_dotted_keys",
    "unicode",
    "multiline",
    "whitespace",
    "empty_keys",
    "optional_typed_accessors",
];

/// A set of mutually exclusive options of which a profile picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BehaviorGroup {
    pub id: &'static str,
    #[serde(skip)]
    pub label: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    pub category: TagCategory,
    pub options: &'static [&'static str],
    pub required: bool,
}

impl BehaviorGroup {
    const fn behavior(
        id: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        required: bool,
    ) -> Self {
        Self {
            id,
            label,
            aliases: &[],
            category: TagCategory::Behavior,
            options,
            required,
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.options.contains(&value)
    }

    #[must_use]
    pub fn options_text(&self) -> String {
        self.options.join(" | ")
    }

    fn answers_to(&self, key: &str) -> bool {
        self.id == key || self.aliases.contains(&key)
    }
}

/// Every known group, in reporting order.
#[must_use]
pub fn behavior_groups() -> &'static [BehaviorGroup] {
    static GROUPS: std::sync::LazyLock<Vec<BehaviorGroup>> = std::sync::LazyLock::new(|| {
        vec![
            BehaviorGroup::behavior(
                "crlf_handling",
                "CRLF handling",
                &["crlf_normalize_to_lf", "crlf_preserve_literal"],
                true,
            ),
            BehaviorGroup::behavior(
                "tab_handling",
                "Tab handling",
                &["tabs_as_content", "tabs_as_whitespace"],
                true,
            ),
            BehaviorGroup {
                aliases: &["spacing"],
                ..BehaviorGroup::behavior(
                    "indent_output",
                    "Indent output",
                    &["indent_spaces", "indent_tabs"],
                    true,
                )
            },
            BehaviorGroup::behavior(
                "boolean",
                "Boolean parsing",
                &["boolean_strict", "boolean_lenient"],
                true,
            ),
            BehaviorGroup::behavior(
                "list_coercion",
                "List coercion",
                &["list_coercion_enabled", "list_coercion_disabled"],
                true,
            ),
            BehaviorGroup::behavior(
                "array_order",
                "Array order",
                &["array_order_insertion", "array_order_lexicographic"],
                false,
            ),
            BehaviorGroup::behavior(
                "toplevel_indent",
                "Toplevel indent",
                &["toplevel_indent_strip", "toplevel_indent_preserve"],
                false,
            ),
            BehaviorGroup {
                id: "specification",
                label: "Specification variant",
                aliases: &["variant"],
                category: TagCategory::Variant,
                options: &["proposed_behavior", "reference_compliant"],
                required: true,
            },
        ]
    });
    &GROUPS
}

/// Look up a group by id or alias.
#[must_use]
pub fn find_group(key: &str) -> Option<&'static BehaviorGroup> {
    behavior_groups().iter().find(|group| group.answers_to(key))
}

/// One selected group value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub group: &'static str,
    pub category: TagCategory,
    pub value: String,
}

/// A validated profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImplementationProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub functions: Vec<String>,
    pub features: Vec<String>,
    /// One entry per selected group, in group table order.
    pub choices: Vec<Choice>,
    pub skip_tests: Vec<String>,
    pub skip_tags: Vec<String>,
    pub run_only: Vec<String>,
}

impl ImplementationProfile {
    /// Selected value for a group id.
    #[must_use]
    pub fn selected(&self, group: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.group == group)
            .map(|choice| choice.value.as_str())
    }

    pub fn behaviors(&self) -> impl Iterator<Item = &str> {
        self.values_of(TagCategory::Behavior)
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.values_of(TagCategory::Variant)
    }

    fn values_of(&self, category: TagCategory) -> impl Iterator<Item = &str> {
        self.choices
            .iter()
            .filter(move |choice| choice.category == category)
            .map(|choice| choice.value.as_str())
    }

    /// Tags of every option that was not selected, as `category:name`.
    ///
    /// A unit carrying any of these must be excluded. Optional groups with no
    /// selection contribute nothing.
    #[must_use]
    pub fn conflicting_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for group in behavior_groups() {
            let Some(selected) = self.selected(group.id) else {
                continue;
            };
            tags.extend(
                group
                    .options
                    .iter()
                    .filter(|option| **option != selected)
                    .map(|option| format!("{}:{option}", group.category)),
            );
        }
        tags
    }
}

/// Result of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    Incomplete(Vec<ValidationError>),
    Valid(ImplementationProfile),
}

impl ProfileStatus {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Validates implementation profiles.
pub struct ProfileValidator;

impl ProfileValidator {
    /// Validate a profile document and return all errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any group is unset, set twice, or
    /// set to a value outside its options, or if a function or feature is
    /// unknown.
    pub fn validate(doc: &ProfileDocument) -> std::result::Result<ImplementationProfile, Vec<ValidationError>> {
        let mut errors = Vec::new();

        check_vocabulary("functions", "function", &doc.functions, KNOWN_FUNCTIONS, &mut errors);
        check_vocabulary("features", "feature", &doc.features, KNOWN_FEATURES, &mut errors);

        let mut picked: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        collect_selections(&doc.behaviors, &TagCategory::Behavior, &mut picked, &mut errors);
        collect_selections(&doc.variants, &TagCategory::Variant, &mut picked, &mut errors);

        let mut choices = Vec::new();
        for group in behavior_groups() {
            match picked.get(group.id).map(Vec::as_slice) {
                None | Some([]) => {
                    if group.required {
                        errors.push(ValidationError::new(
                            group.id,
                            format!(
                                "{} choice is required ({})",
                                group.label,
                                group.options_text()
                            ),
                        ));
                    }
                }
                Some([value]) => choices.push(Choice {
                    group: group.id,
                    category: group.category.clone(),
                    value: value.clone(),
                }),
                Some(values) => errors.push(ValidationError::new(
                    group.id,
                    format!("conflicting {}s: {} (pick only one)", group.category, values.join(", ")),
                )),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ImplementationProfile {
            name: doc.name.clone(),
            functions: doc.functions.clone(),
            features: doc.features.clone(),
            choices,
            skip_tests: doc.skip_tests.clone(),
            skip_tags: doc.skip_tags.clone(),
            run_only: doc.run_only.clone(),
        })
    }

    #[must_use]
    pub fn status(doc: &ProfileDocument) -> ProfileStatus {
        match Self::validate(doc) {
            Ok(profile) => ProfileStatus::Valid(profile),
            Err(errors) => ProfileStatus::Incomplete(errors),
        }
    }

    /// Like [`ProfileValidator::validate`], folded into the crate error type.
    ///
    /// # Errors
    ///
    /// Returns `CclError::InvalidProfile` carrying every error.
    pub fn require(doc: &ProfileDocument) -> Result<ImplementationProfile> {
        Self::validate(doc).map_err(|errors| CclError::InvalidProfile { errors })
    }
}

fn check_vocabulary(
    field: &str,
    noun: &str,
    values: &[String],
    known: &[&str],
    errors: &mut Vec<ValidationError>,
) {
    for value in values {
        if !known.contains(&value.as_str()) {
            errors.push(ValidationError::new(
                field,
                format!("unknown {noun} '{value}'. Valid options: {}", known.join(" | ")),
            ));
        }
    }
}

fn collect_selections(
    selections: &Selections,
    category: &TagCategory,
    picked: &mut BTreeMap<&'static str, Vec<String>>,
    errors: &mut Vec<ValidationError>,
) {
    let field = format!("{category}s");
    match selections {
        Selections::List(values) => {
            for value in values {
                let owner = behavior_groups()
                    .iter()
                    .find(|group| &group.category == category && group.contains(value));
                match owner {
                    Some(group) => {
                        let slot = picked.entry(group.id).or_default();
                        if !slot.contains(value) {
                            slot.push(value.clone());
                        }
                    }
                    None => errors.push(ValidationError::new(
                        field.as_str(),
                        format!("unknown {category} '{value}' (not in any {category} group)"),
                    )),
                }
            }
        }
        Selections::ByGroup(map) => {
            for (key, value) in map {
                let Some(group) = find_group(key).filter(|group| &group.category == category)
                else {
                    errors.push(ValidationError::new(
                        field.as_str(),
                        format!("unknown {category} group '{key}'"),
                    ));
                    continue;
                };
                let Some(value) = value else {
                    continue;
                };
                if group.contains(value) {
                    picked.entry(group.id).or_default().push(value.clone());
                } else {
                    errors.push(ValidationError::new(
                        group.id,
                        format!(
                            "invalid {category} '{value}' for group '{}'. Valid options: {}",
                            group.id,
                            group.options_text()
                        ),
                    ));
                }
            }
        }
    }
}
