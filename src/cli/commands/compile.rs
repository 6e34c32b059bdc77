//! Compile command implementation.
//!
//! Loads the corpus, compiles every suite, gates the units through the
//! profile if one is configured, and writes one output file per suite plus
//! a manifest. Shape failures are collected across the whole corpus and
//! reported together; nothing is written if any occurred.

use super::{CommandContext, load_metadata, print_json};
use crate::cli::CompileArgs;
use crate::compile::{CompileOptions, Compilation, Compiler, Gate, SkippedUnit, apply_gate};
use crate::config::CliOverrides;
use crate::config::profile::ProfileDocument;
use crate::corpus::{self, LoadedSuite};
use crate::error::{CclError, Result};
use crate::format::{
    Manifest, ManifestEntry, check_output_names, output_name, write_manifest, write_suite,
};
use crate::metadata::MetadataReport;
use crate::model::AtomicTestUnit;
use crate::util::progress::FileProgress;
use crate::validation::{ImplementationProfile, ProfileValidator};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary printed after a compile.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    pub files: usize,
    pub tests: usize,
    pub units: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub skipped: Vec<SkippedUnit>,
    pub warnings: Vec<String>,
    pub metadata_reports: Vec<MetadataReport>,
    pub dry_run: bool,
}

/// Units for one suite after gating.
struct CompiledSuite<'a> {
    loaded: &'a LoadedSuite,
    units: Vec<AtomicTestUnit>,
    skipped: usize,
}

fn overrides(args: &CompileArgs) -> CliOverrides {
    CliOverrides {
        source_dir: args.corpus.source.clone(),
        output_dir: args.output.clone(),
        metadata: args.metadata.clone(),
        profile: args.profile.clone(),
        auto_conflicts: args.auto_conflicts_override(),
        validate_metadata: args.validate_metadata.then_some(true),
    }
}

fn load_profile(path: Option<&Path>) -> Result<Option<ImplementationProfile>> {
    path.map(|path| {
        let doc = ProfileDocument::load(path)?;
        ProfileValidator::require(&doc)
    })
    .transpose()
}

/// Execute the compile command.
///
/// # Errors
///
/// Returns an error if loading fails, the profile is invalid, any payload
/// has the wrong shape, or the output cannot be written.
pub fn execute(args: &CompileArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.tool_config(&overrides(args))?;
    info!(
        source = %config.source_dir.display(),
        output = %config.output_dir.display(),
        "Compiling corpus"
    );

    let corpus = corpus::load_corpus(&config.source_dir)?;
    check_output_names(&corpus.suites)?;
    let metadata = load_metadata(config.metadata.as_deref())?;
    let profile = load_profile(config.profile.as_deref())?;

    if config.validate_metadata && metadata.is_none() {
        warn!("validate-metadata is set but no metadata file is configured");
    }

    let compiler = Compiler::new(CompileOptions {
        metadata: metadata.as_ref(),
        auto_conflicts: config.auto_conflicts,
        validate_metadata: config.validate_metadata,
    });
    let gate = profile.as_ref().map(Gate::new);

    let progress = FileProgress::new(corpus.suites.len(), "Compiling", ctx.quiet || ctx.json);
    let mut totals = Compilation::default();
    let mut skipped = Vec::new();
    let mut compiled = Vec::with_capacity(corpus.suites.len());

    for loaded in &corpus.suites {
        progress.advance(&loaded.relative.display().to_string());
        let label = loaded.path.display().to_string();
        let mut compilation = compiler.compile_suite(&loaded.suite, Some(&label));
        let units = std::mem::take(&mut compilation.units);
        totals.absorb(compilation);

        let (units, suite_skipped) = match &gate {
            Some(gate) => {
                let gated = apply_gate(gate, units);
                let count = gated.skipped.len();
                skipped.extend(gated.skipped);
                (gated.retained, count)
            }
            None => (units, 0),
        };
        compiled.push(CompiledSuite {
            loaded,
            units,
            skipped: suite_skipped,
        });
    }
    progress.finish();

    for warning in &totals.warnings {
        warn!("{warning}");
    }
    for report in &totals.metadata_reports {
        for warning in &report.warnings {
            warn!(test = %report.test_name, "{warning}");
        }
    }

    if !totals.failures.is_empty() {
        return Err(CclError::ShapeErrors {
            failures: totals.failures,
        });
    }

    let profile_name = profile
        .as_ref()
        .and_then(|p| p.name.clone())
        .or_else(|| config.profile.as_ref().map(|p| p.display().to_string()));

    if !args.dry_run {
        write_outputs(&config.output_dir, &compiled, profile_name.clone())?;
    }

    let report = CompileReport {
        files: compiled.len(),
        tests: corpus.test_count(),
        units: compiled.iter().map(|suite| suite.units.len()).sum(),
        output_dir: (!args.dry_run).then(|| config.output_dir.clone()),
        profile: profile_name,
        skipped,
        warnings: totals.warnings,
        metadata_reports: totals.metadata_reports,
        dry_run: args.dry_run,
    };
    info!(units = report.units, skipped = report.skipped.len(), "Compile finished");

    if ctx.json {
        print_json(&report)?;
    } else if !ctx.quiet {
        println!("{}", render_report(&report, ctx));
    }
    Ok(())
}

fn write_outputs(dir: &Path, compiled: &[CompiledSuite<'_>], profile: Option<String>) -> Result<()> {
    let mut manifest = Manifest::new(profile);
    for suite in compiled {
        let output = output_name(&suite.loaded.relative);
        write_suite(dir, &output, &suite.units)?;
        manifest.push(ManifestEntry {
            source: suite.loaded.path.display().to_string(),
            content_hash: suite.loaded.content_hash.clone(),
            output,
            units: suite.units.len(),
            skipped: suite.skipped,
        });
    }
    write_manifest(dir, &manifest)?;
    Ok(())
}

fn render_report(report: &CompileReport, ctx: &CommandContext) -> String {
    let palette = ctx.palette();
    let mut out = format!(
        "{} {} units from {} tests in {} files",
        palette.ok("Compiled"),
        report.units,
        report.tests,
        report.files
    );
    match &report.output_dir {
        Some(dir) => {
            let _ = write!(out, " -> {}", dir.display());
        }
        None => out.push_str(&palette.dim(" (dry run, nothing written)")),
    }

    if !report.skipped.is_empty() {
        let _ = write!(out, "\n{} {} units", palette.warn("Skipped"), report.skipped.len());
        for unit in &report.skipped {
            let _ = write!(out, "\n  {} {}", unit.name, palette.dim(&format!("({})", unit.reason)));
        }
    }

    if !report.warnings.is_empty() {
        let _ = write!(out, "\n{} ({})", palette.warn("Warnings"), report.warnings.len());
        for warning in &report.warnings {
            let _ = write!(out, "\n  {warning}");
        }
    }

    for metadata in &report.metadata_reports {
        let _ = write!(out, "\n{} {}", palette.warn("Metadata"), metadata.test_name);
        for line in metadata.warnings.iter().chain(&metadata.errors) {
            let _ = write!(out, "\n  {line}");
        }
    }
    out
}
