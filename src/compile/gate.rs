//! Profile gating of compiled units.
//!
//! Precedence: `skip_tests` by name, then `skip_tags`, then conflicting
//! behavior/variant tags, then either the `run_only` filter or the
//! function/feature support check. Unknown functions and features pass
//! (fail-open, see [`crate::validation`]).

use crate::model::{AtomicTestUnit, Tag};
use crate::validation::{ImplementationProfile, KNOWN_FEATURES, KNOWN_FUNCTIONS};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Why a unit was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "tag", rename_all = "snake_case")]
pub enum SkipReason {
    ByName,
    SkipTag(String),
    ConflictingTag(String),
    UnsupportedFunction(String),
    UnsupportedFeature(String),
    RunOnly,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName => f.write_str("skipped by name"),
            Self::SkipTag(tag) => write!(f, "skip tag '{tag}'"),
            Self::ConflictingTag(tag) => write!(f, "conflicting tag '{tag}'"),
            Self::UnsupportedFunction(name) => write!(f, "unsupported function '{name}'"),
            Self::UnsupportedFeature(name) => write!(f, "unsupported feature '{name}'"),
            Self::RunOnly => f.write_str("run-only filter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Retain,
    Skip(SkipReason),
}

/// Admission check built from a validated profile.
#[derive(Debug)]
pub struct Gate<'p> {
    profile: &'p ImplementationProfile,
    conflicting: HashSet<String>,
}

impl<'p> Gate<'p> {
    #[must_use]
    pub fn new(profile: &'p ImplementationProfile) -> Self {
        Self {
            profile,
            conflicting: profile.conflicting_tags().into_iter().collect(),
        }
    }

    /// Decide whether `unit` belongs in the profile's suite.
    #[must_use]
    pub fn admits(&self, unit: &AtomicTestUnit) -> Decision {
        let profile = self.profile;

        if profile
            .skip_tests
            .iter()
            .any(|name| *name == unit.name || *name == unit.source_test)
        {
            return Decision::Skip(SkipReason::ByName);
        }

        let tags: Vec<Tag> = unit.tags().collect();

        if let Some(tag) = tags
            .iter()
            .find(|tag| profile.skip_tags.iter().any(|pattern| tag.matches(pattern)))
        {
            return Decision::Skip(SkipReason::SkipTag(tag.to_string()));
        }

        if let Some(tag) = tags
            .iter()
            .map(ToString::to_string)
            .find(|tag| self.conflicting.contains(tag))
        {
            return Decision::Skip(SkipReason::ConflictingTag(tag));
        }

        if !profile.run_only.is_empty() {
            let selected = tags
                .iter()
                .any(|tag| profile.run_only.iter().any(|pattern| tag.matches(pattern)));
            return if selected {
                Decision::Retain
            } else {
                Decision::Skip(SkipReason::RunOnly)
            };
        }

        if let Some(function) = unit.functions.iter().find(|f| {
            KNOWN_FUNCTIONS.contains(&f.as_str()) && !profile.functions.contains(f)
        }) {
            return Decision::Skip(SkipReason::UnsupportedFunction(function.clone()));
        }

        if let Some(feature) = unit.features.iter().find(|f| {
            KNOWN_FEATURES.contains(&f.as_str()) && !profile.features.contains(f)
        }) {
            return Decision::Skip(SkipReason::UnsupportedFeature(feature.clone()));
        }

        Decision::Retain
    }
}
