//! Source-to-atomic compilation.
//!
//! Every `(validation, payload)` pair of a source test becomes one
//! [`AtomicTestUnit`] named `{test}_{validation}`, in the validation map's
//! document order. Shape errors are collected across the whole batch; one
//! bad payload never stops its siblings from compiling.

pub mod gate;
pub mod normalize;

pub use gate::{Decision, Gate, SkipReason};
pub use normalize::{Normalized, ResultKind, normalize};

use crate::error::{CclError, Result, ShapeError, ShapeFailure};
use crate::metadata::{BehaviorMetadata, MetadataReport};
use crate::model::{AtomicTestUnit, ConflictsByCategory, SourceSuite, SourceTest};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

/// Direct prerequisites per validation function. Recorded flat; never chased.
pub const FUNCTION_DEPENDENCIES: &[(&str, &[&str])] = &[
    ("parse", &[]),
    ("parse_value", &["parse"]),
    ("filter", &["parse"]),
    ("expand_dotted", &["parse"]),
    ("build_hierarchy", &["parse"]),
    ("get_string", &["parse", "build_hierarchy"]),
    ("get_int", &["parse", "build_hierarchy"]),
    ("get_bool", &["parse", "build_hierarchy"]),
    ("get_float", &["parse", "build_hierarchy"]),
    ("get_list", &["parse", "build_hierarchy"]),
    ("load", &["parse"]),
    ("round_trip", &["parse"]),
    ("canonical_format", &["parse"]),
    ("associativity", &["parse"]),
];

/// Prerequisites of `validation`; empty if it has none or is unknown.
#[must_use]
pub fn requires_for(validation: &str) -> Vec<String> {
    FUNCTION_DEPENDENCIES
        .iter()
        .find(|(name, _)| *name == validation)
        .map(|(_, deps)| deps.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions<'m> {
    pub metadata: Option<&'m BehaviorMetadata>,
    /// Narrow behaviors per function and add store-implied conflicts.
    pub auto_conflicts: bool,
    /// Check every source test against the store.
    pub validate_metadata: bool,
}

/// Everything a compilation pass produced.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub units: Vec<AtomicTestUnit>,
    pub failures: Vec<ShapeFailure>,
    /// Normalizer notes, prefixed with the unit name.
    pub warnings: Vec<String>,
    /// Non-clean store reports only.
    pub metadata_reports: Vec<MetadataReport>,
}

impl Compilation {
    pub fn absorb(&mut self, other: Self) {
        self.units.extend(other.units);
        self.failures.extend(other.failures);
        self.warnings.extend(other.warnings);
        self.metadata_reports.extend(other.metadata_reports);
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// The units, or every shape failure at once.
    ///
    /// # Errors
    ///
    /// Returns `CclError::ShapeErrors` if any payload failed to normalize.
    pub fn into_result(self) -> Result<Vec<AtomicTestUnit>> {
        if self.failures.is_empty() {
            Ok(self.units)
        } else {
            Err(CclError::ShapeErrors {
                failures: self.failures,
            })
        }
    }
}

/// A unit the gate excluded, and why.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedUnit {
    pub name: String,
    pub reason: SkipReason,
}

/// Units split by a [`Gate`].
#[derive(Debug, Clone, Default)]
pub struct Gated {
    pub retained: Vec<AtomicTestUnit>,
    pub skipped: Vec<SkippedUnit>,
}

/// Split `units` into retained and skipped, preserving order.
#[must_use]
pub fn apply_gate(gate: &Gate<'_>, units: Vec<AtomicTestUnit>) -> Gated {
    let mut gated = Gated::default();
    for unit in units {
        match gate.admits(&unit) {
            Decision::Retain => gated.retained.push(unit),
            Decision::Skip(reason) => {
                trace!(unit = %unit.name, %reason, "Unit skipped");
                gated.skipped.push(SkippedUnit {
                    name: unit.name,
                    reason,
                });
            }
        }
    }
    gated
}

/// Compiles source tests into atomic units.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler<'m> {
    options: CompileOptions<'m>,
}

impl<'m> Compiler<'m> {
    #[must_use]
    pub const fn new(options: CompileOptions<'m>) -> Self {
        Self { options }
    }

    /// Compile every test of a suite. `file` labels shape failures.
    #[must_use]
    pub fn compile_suite(&self, suite: &SourceSuite, file: Option<&str>) -> Compilation {
        let mut compilation = Compilation::default();
        for test in &suite.tests {
            compilation.absorb(self.compile_test(test, file));
        }
        debug!(
            suite = %suite.suite,
            tests = suite.tests.len(),
            units = compilation.units.len(),
            failures = compilation.failures.len(),
            "Compiled suite"
        );
        compilation
    }

    /// Compile one source test.
    #[must_use]
    pub fn compile_test(&self, test: &SourceTest, file: Option<&str>) -> Compilation {
        let mut compilation = Compilation::default();

        if self.options.validate_metadata {
            if let Some(store) = self.options.metadata {
                let sets = test.tag_sets();
                let report = store.validate(&test.name, &sets.behaviors, &test.meta.conflicts);
                if !report.is_clean() {
                    compilation.metadata_reports.push(report);
                }
            }
        }

        for (validation, payload) in &test.validations {
            match self.compile_unit(test, validation, payload) {
                Ok((unit, warnings)) => {
                    compilation
                        .warnings
                        .extend(warnings.into_iter().map(|w| format!("{}: {w}", unit.name)));
                    compilation.units.push(unit);
                }
                Err(error) => compilation.failures.push(ShapeFailure {
                    file: file.map(ToString::to_string),
                    test: test.name.clone(),
                    validation: validation.clone(),
                    error,
                }),
            }
        }

        compilation
    }

    /// Build the unit for one validation of `test`.
    ///
    /// # Errors
    ///
    /// Returns the [`ShapeError`] from normalizing `payload`.
    pub fn compile_unit(
        &self,
        test: &SourceTest,
        validation: &str,
        payload: &Value,
    ) -> std::result::Result<(AtomicTestUnit, Vec<String>), ShapeError> {
        let normalized = normalize(validation, payload)?;

        let mut sets = test.tag_sets();
        sets.add_function(validation);

        let mut conflicts = ConflictsByCategory::parse(&test.meta.conflicts);
        let mut behaviors = sets.behaviors;
        if self.options.auto_conflicts {
            if let Some(store) = self.options.metadata {
                behaviors = store.filter_for_function(&behaviors, validation);
                conflicts.behaviors = store.merged_conflicts(&conflicts.behaviors, &behaviors);
            }
        }

        let (expect_error, error_type) = match normalized.error {
            Some(err) => (true, err.message),
            None => (false, None),
        };

        let unit = AtomicTestUnit {
            name: format!("{}_{validation}", test.name),
            input: test.input.clone(),
            validation: validation.to_string(),
            expected: normalized.expected,
            args: normalized.args,
            functions: sets.functions,
            features: sets.features,
            behaviors,
            variants: sets.variants,
            conflicts,
            requires: requires_for(validation),
            level: test.meta.level,
            source_test: test.name.clone(),
            expect_error,
            error_type,
        };
        Ok((unit, normalized.warnings))
    }
}
