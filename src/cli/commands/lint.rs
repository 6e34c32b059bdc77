//! Lint command implementation.
//!
//! Checks the corpus against the behavior metadata: every source test is
//! validated against the store, and the inferred conflict groups are checked
//! for pairs the store does not declare. Findings exit with status 1 in
//! human mode; JSON output always exits 0.

use super::{CommandContext, load_metadata, print_json};
use crate::cli::LintArgs;
use crate::config::CliOverrides;
use crate::corpus::{self, Corpus};
use crate::error::{OptionExt, Result};
use crate::format::Palette;
use crate::inference;
use crate::metadata::{BehaviorMetadata, MetadataReport};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

#[derive(Debug, Default, Serialize)]
struct LintOutput {
    checked: usize,
    findings: usize,
    tests: Vec<MetadataReport>,
    undeclared: Vec<String>,
}

fn lint_corpus(corpus: &Corpus, store: &BehaviorMetadata) -> LintOutput {
    let mut output = LintOutput::default();
    for test in corpus.tests() {
        output.checked += 1;
        let sets = test.tag_sets();
        let report = store.validate(&test.name, &sets.behaviors, &test.meta.conflicts);
        if !report.is_clean() {
            output.findings += report.warnings.len() + report.errors.len();
            output.tests.push(report);
        }
    }

    let analysis = inference::analyze(corpus.tests());
    output.undeclared = inference::undeclared_conflicts(&analysis, store);
    output.findings += output.undeclared.len();
    output
}

fn render(output: &LintOutput, palette: Palette) -> String {
    if output.findings == 0 {
        return format!(
            "{} No metadata findings ({} tests checked)",
            palette.ok("✓"),
            output.checked
        );
    }

    let mut out = format!(
        "{} ({} findings, {} tests checked)",
        palette.warn("Metadata findings"),
        output.findings,
        output.checked
    );
    for report in &output.tests {
        let _ = write!(out, "\n\n{}", report.test_name);
        for line in report.errors.iter().chain(&report.warnings) {
            let _ = write!(out, "\n  ⚠ {line}");
        }
    }
    if !output.undeclared.is_empty() {
        let _ = write!(out, "\n\n{}", palette.heading("Undeclared conflicts"));
        for line in &output.undeclared {
            let _ = write!(out, "\n  ⚠ {line}");
        }
    }
    out
}

/// Execute the lint command.
///
/// # Errors
///
/// Returns an error if no metadata is configured, or the corpus or metadata
/// cannot be loaded.
pub fn execute(args: &LintArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.tool_config(&CliOverrides {
        source_dir: args.corpus.source.clone(),
        metadata: args.metadata.clone(),
        ..CliOverrides::default()
    })?;
    let store = load_metadata(config.metadata.as_deref())?
        .ok_or_config("lint requires behavior metadata (--metadata or the 'metadata' config key)")?;
    let corpus = corpus::load_corpus(&config.source_dir)?;
    info!(tests = corpus.test_count(), "Linting corpus against metadata");

    let output = lint_corpus(&corpus, &store);

    if ctx.json {
        print_json(&output)?;
        return Ok(());
    }

    println!("{}", render(&output, ctx.palette()));
    if output.findings > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LoadedSuite;
    use serde_json::json;
    use std::path::PathBuf;

    fn corpus(tests: serde_json::Value) -> Corpus {
        Corpus {
            suites: vec![LoadedSuite {
                path: PathBuf::from("suite.json"),
                relative: PathBuf::from("suite.json"),
                stem: "suite".to_string(),
                content_hash: String::new(),
                suite: serde_json::from_value(json!({ "tests": tests })).unwrap(),
            }],
        }
    }

    fn store() -> BehaviorMetadata {
        BehaviorMetadata::from_json_str(
            r#"{"behaviors": {
                "boolean_strict": {"mutuallyExclusiveWith": ["boolean_lenient"]},
                "boolean_lenient": {"mutuallyExclusiveWith": ["boolean_strict"]}
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn clean_corpus_has_no_findings() {
        let corpus = corpus(json!([
            {"name": "a", "validations": {"parse": []},
             "meta": {"tags": ["behavior:boolean_strict"], "conflicts": ["behavior:boolean_lenient"]}}
        ]));
        let output = lint_corpus(&corpus, &store());
        assert_eq!(output.checked, 1);
        assert!(output.tests.is_empty());
        assert!(output.undeclared.iter().all(|f| !f.contains("boolean_strict")));
        assert!(
            output
                .undeclared
                .iter()
                .any(|f| f.starts_with("group 'tab_handling'"))
        );
    }

    #[test]
    fn no_findings_renders_summary() {
        let output = LintOutput {
            checked: 3,
            ..LintOutput::default()
        };
        assert!(render(&output, Palette::plain()).contains("No metadata findings (3 tests checked)"));
    }

    #[test]
    fn unknown_behavior_is_reported() {
        let corpus = corpus(json!([
            {"name": "a", "validations": {"parse": []},
             "meta": {"tags": ["behavior:brand_new"]}}
        ]));
        let output = lint_corpus(&corpus, &store());
        assert_eq!(output.tests.len(), 1);
        assert!(output.findings >= 1);
        let text = render(&output, Palette::plain());
        assert!(text.contains("unknown behavior 'brand_new'"));
    }
}
