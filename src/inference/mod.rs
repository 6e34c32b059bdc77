//! Conflict-group inference.
//!
//! Recovers mutually exclusive behavior groups from the conflicts tests
//! declare, without any formal declaration.
//!
//! # Passes
//!
//! 1. **Evidence.** For every test that declares conflicts, each behavior `b`
//!    it carries gets a directed edge `b -> c` to every declared conflict `c`
//!    of the same family (see [`same_family`]).
//! 2. **Clustering.** Tags are visited in first-seen order. A tag joins the
//!    open group only when edges run both ways between it and every member
//!    already in it. A tag placed in a group is never reconsidered.
//!
//! Attribution and reporting run after clustering and only count pairs whose
//! members share a group. Declared conflicts with no same-family partner are
//! not errors; they simply contribute no evidence.

use crate::metadata::BehaviorMetadata;
use crate::model::SourceTest;
use crate::validation::behavior_groups;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, trace};

/// Name prefixes that identify one behavior dimension.
pub const FAMILY_PREFIXES: &[&str] = &[
    "list_coercion_",
    "array_order_",
    "tabs_as_",
    "crlf_",
    "toplevel_indent_",
    "boolean_",
];

/// Could `a` and `b` be alternatives of the same behavior dimension?
///
/// A known prefix must be shared by both names; if only one name carries a
/// known prefix they are different dimensions. Otherwise the first
/// underscore-delimited token decides, and both names need at least two.
#[must_use]
pub fn same_family(a: &str, b: &str) -> bool {
    for prefix in FAMILY_PREFIXES {
        let a_has = a.starts_with(prefix);
        let b_has = b.starts_with(prefix);
        if a_has || b_has {
            return a_has && b_has;
        }
    }

    let mut a_parts = a.split('_');
    let mut b_parts = b.split('_');
    match (a_parts.next(), a_parts.next(), b_parts.next(), b_parts.next()) {
        (Some(a_head), Some(_), Some(b_head), Some(_)) => a_head == b_head,
        _ => false,
    }
}

/// Directed same-family conflict edges, with nodes in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct EvidenceGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
    order: Vec<String>,
}

impl EvidenceGraph {
    fn touch(&mut self, node: &str) {
        if !self.edges.contains_key(node) {
            self.edges.insert(node.to_string(), BTreeSet::new());
            self.order.push(node.to_string());
        }
    }

    pub fn record(&mut self, from: &str, to: &str) {
        self.touch(from);
        if let Some(targets) = self.edges.get_mut(from) {
            targets.insert(to.to_string());
        }
    }

    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(to))
    }

    #[must_use]
    pub fn is_mutual(&self, a: &str, b: &str) -> bool {
        self.has_edge(a, b) && self.has_edge(b, a)
    }

    /// Nodes in the order they were first seen.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Group mutually confirmed tags, first writer wins.
    #[must_use]
    pub fn cluster(&self) -> Vec<Vec<String>> {
        let mut assigned: HashSet<&str> = HashSet::new();
        let mut groups = Vec::new();

        for node in &self.order {
            if assigned.contains(node.as_str()) {
                continue;
            }
            assigned.insert(node);
            let mut group = vec![node.clone()];
            for other in &self.order {
                if assigned.contains(other.as_str()) {
                    continue;
                }
                if group.iter().all(|member| self.is_mutual(member, other)) {
                    assigned.insert(other);
                    group.push(other.clone());
                }
            }
            if group.len() > 1 {
                groups.push(group);
            }
        }
        groups
    }
}

/// A set of tags confirmed mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictGroup {
    /// Sorted alphabetically.
    pub tags: Vec<String>,
    /// Tests whose declared conflicts link two members of the group.
    pub count: usize,
}

/// An unordered conflict pair, reported once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictPair {
    pub category: String,
    pub first: String,
    pub second: String,
    pub count: usize,
}

/// Everything the engine found.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAnalysis {
    /// `"category:tag"` to the names it conflicts with, same-group only.
    pub conflict_map: BTreeMap<String, Vec<String>>,
    pub pairs: Vec<ConflictPair>,
    pub groups: Vec<ConflictGroup>,
    /// Tests declaring at least one conflict.
    pub mutually_exclusive_tests: usize,
    #[serde(skip)]
    pub evidence: EvidenceGraph,
    #[serde(skip)]
    membership: BTreeMap<String, usize>,
}

impl ConflictAnalysis {
    /// The group `tag` was clustered into.
    #[must_use]
    pub fn group_of(&self, tag: &str) -> Option<&ConflictGroup> {
        self.membership.get(tag).map(|&index| &self.groups[index])
    }

    /// Are `a` and `b` members of the same group?
    #[must_use]
    pub fn same_group(&self, a: &str, b: &str) -> bool {
        a != b
            && matches!(
                (self.membership.get(a), self.membership.get(b)),
                (Some(x), Some(y)) if x == y
            )
    }
}

struct Observation {
    behaviors: Vec<String>,
    variants: Vec<String>,
    conflicts: Vec<String>,
}

/// Accumulates evidence test by test, then clusters once.
#[derive(Default)]
pub struct InferenceEngine {
    graph: EvidenceGraph,
    observations: Vec<Observation>,
}

impl InferenceEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass 1 for one test.
    pub fn observe(&mut self, test: &SourceTest) {
        if test.meta.conflicts.is_empty() {
            return;
        }
        let sets = test.tag_sets();
        let conflicts: Vec<String> = test
            .meta
            .conflicts
            .iter()
            .map(|raw| conflict_name(raw).to_string())
            .collect();

        for behavior in &sets.behaviors {
            self.graph.touch(behavior);
            for conflict in &conflicts {
                if same_family(behavior, conflict) {
                    trace!(from = %behavior, to = %conflict, "Conflict edge");
                    self.graph.record(behavior, conflict);
                } else {
                    trace!(test = %test.name, from = %behavior, to = %conflict, "No same-family partner");
                }
            }
        }

        self.observations.push(Observation {
            behaviors: sets.behaviors,
            variants: sets.variants,
            conflicts,
        });
    }

    /// Pass 2 and reporting. Runs only after every test was observed.
    #[must_use]
    pub fn finish(self) -> ConflictAnalysis {
        let mut analysis = ConflictAnalysis {
            mutually_exclusive_tests: self.observations.len(),
            ..ConflictAnalysis::default()
        };

        for (index, members) in self.graph.cluster().into_iter().enumerate() {
            for member in &members {
                analysis.membership.insert(member.clone(), index);
            }
            let mut tags = members;
            tags.sort();
            analysis.groups.push(ConflictGroup { tags, count: 0 });
        }

        let mut directed: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut pair_counts: BTreeMap<(String, String, String), usize> = BTreeMap::new();

        for observation in &self.observations {
            let mut supported: BTreeSet<usize> = BTreeSet::new();
            let tagged = observation
                .behaviors
                .iter()
                .map(|name| ("behavior", name))
                .chain(observation.variants.iter().map(|name| ("variant", name)));

            for (category, name) in tagged {
                for conflict in &observation.conflicts {
                    if !analysis.same_group(name, conflict) {
                        continue;
                    }
                    *directed
                        .entry(format!("{category}:{name}"))
                        .or_default()
                        .entry(conflict.clone())
                        .or_default() += 1;

                    let (first, second) = if name <= conflict {
                        (name.clone(), conflict.clone())
                    } else {
                        (conflict.clone(), name.clone())
                    };
                    *pair_counts
                        .entry((category.to_string(), first, second))
                        .or_default() += 1;

                    if let Some(&group) = analysis.membership.get(name.as_str()) {
                        supported.insert(group);
                    }
                }
            }

            for group in supported {
                analysis.groups[group].count += 1;
            }
        }

        analysis.conflict_map = directed
            .into_iter()
            .map(|(tag, targets)| (tag, targets.into_keys().collect()))
            .collect();
        analysis.pairs = pair_counts
            .into_iter()
            .map(|((category, first, second), count)| ConflictPair {
                category,
                first,
                second,
                count,
            })
            .collect();

        debug!(
            nodes = self.graph.nodes().len(),
            edges = self.graph.edge_count(),
            groups = analysis.groups.len(),
            "Inferred conflict groups"
        );
        analysis.evidence = self.graph;
        analysis
    }
}

/// Run both passes over a corpus.
#[must_use]
pub fn analyze<'a, I>(tests: I) -> ConflictAnalysis
where
    I: IntoIterator<Item = &'a SourceTest>,
{
    let mut engine = InferenceEngine::new();
    for test in tests {
        engine.observe(test);
    }
    engine.finish()
}

fn conflict_name(raw: &str) -> &str {
    raw.split_once(':').map_or(raw, |(_, name)| name)
}

/// Compare inferred groups and the builtin groups against a declaration store.
///
/// Reports every inferred pair the store does not declare exclusive, and
/// every builtin behavior group whose options the store does not declare
/// exclusive of each other.
#[must_use]
pub fn undeclared_conflicts(analysis: &ConflictAnalysis, store: &BehaviorMetadata) -> Vec<String> {
    let mut findings = Vec::new();

    for pair in &analysis.pairs {
        if pair.category == "behavior" && !store.declares_exclusive(&pair.first, &pair.second) {
            findings.push(format!(
                "inferred conflict '{}' <-> '{}' is not declared in metadata",
                pair.first, pair.second
            ));
        }
    }

    for group in behavior_groups() {
        if group.category != crate::model::TagCategory::Behavior {
            continue;
        }
        for (i, a) in group.options.iter().enumerate() {
            for b in &group.options[i + 1..] {
                if !store.declares_exclusive(a, b) {
                    findings.push(format!(
                        "group '{}': '{a}' and '{b}' are not declared mutually exclusive",
                        group.id
                    ));
                }
            }
        }
    }

    findings
}
