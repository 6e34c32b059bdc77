//! Corpus statistics.
//!
//! Each validation of a source test counts as one assertion. A test uses a
//! function when it is tagged with it or when one of its validations is
//! named after it.

use crate::corpus::Corpus;
use crate::inference::{self, ConflictGroup};
use crate::model::tag::push_unique;
use serde::Serialize;
use std::collections::BTreeMap;

/// Usage of one tag across the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagStats {
    pub tests: usize,
    pub assertions: usize,
    /// File stems, in first-seen order.
    pub files: Vec<String>,
    /// Behaviors only: conflicting names declared alongside this tag.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicts: BTreeMap<String, usize>,
}

impl TagStats {
    fn record(&mut self, assertions: usize, file: &str) {
        self.tests += 1;
        self.assertions += assertions;
        push_unique(&mut self.files, file);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub total_tests: usize,
    pub total_assertions: usize,
    pub total_files: usize,
    pub functions: BTreeMap<String, TagStats>,
    pub features: BTreeMap<String, TagStats>,
    pub behaviors: BTreeMap<String, TagStats>,
    pub variants: BTreeMap<String, TagStats>,
    pub conflict_groups: Vec<ConflictGroup>,
    pub mutually_exclusive_tests: usize,
}

/// Collect statistics over every suite in `corpus`.
#[must_use]
pub fn collect(corpus: &Corpus) -> CorpusStats {
    let mut stats = CorpusStats::default();

    for loaded in &corpus.suites {
        if loaded.suite.tests.is_empty() {
            continue;
        }
        stats.total_files += 1;

        for test in &loaded.suite.tests {
            let assertions = test.validations.len();
            stats.total_tests += 1;
            stats.total_assertions += assertions;

            let mut sets = test.tag_sets();
            for validation in test.validations.keys() {
                sets.add_function(validation);
            }

            let file = loaded.stem.as_str();
            for name in &sets.functions {
                stats.functions.entry(name.clone()).or_default().record(assertions, file);
            }
            for name in &sets.features {
                stats.features.entry(name.clone()).or_default().record(assertions, file);
            }
            for name in &sets.variants {
                stats.variants.entry(name.clone()).or_default().record(assertions, file);
            }
            for name in &sets.behaviors {
                let entry = stats.behaviors.entry(name.clone()).or_default();
                entry.record(assertions, file);
                for conflict in &test.meta.conflicts {
                    let target = conflict.split_once(':').map_or(conflict.as_str(), |(_, n)| n);
                    *entry.conflicts.entry(target.to_string()).or_default() += 1;
                }
            }
        }
    }

    let analysis = inference::analyze(corpus.tests());
    stats.conflict_groups = analysis.groups;
    stats.mutually_exclusive_tests = analysis.mutually_exclusive_tests;
    stats
}
