//! Human-readable rendering of reports.
//!
//! Every renderer returns a `String`; callers decide where it goes.

use crate::inference::ConflictAnalysis;
use crate::stats::{CorpusStats, TagStats};
use crate::validation::{ImplementationProfile, ProfileStatus, behavior_groups};
use crossterm::style::Stylize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Optional ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub color: bool,
}

impl Palette {
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self { color: false }
    }

    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn ok(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn bad(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dark_grey().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Conflict groups, pairs and the per-tag conflict map.
#[must_use]
pub fn render_conflicts(analysis: &ConflictAnalysis, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        palette.heading(&format!("Conflict groups ({})", analysis.groups.len()))
    );
    if analysis.groups.is_empty() {
        let _ = writeln!(out, "  {}", palette.dim("none"));
    }
    for group in &analysis.groups {
        let _ = writeln!(
            out,
            "  {{{}}} {}",
            group.tags.join(", "),
            palette.dim(&format!("({} tests)", group.count))
        );
    }

    if !analysis.pairs.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", palette.heading("Conflict pairs"));
        for pair in &analysis.pairs {
            let _ = writeln!(
                out,
                "  {}: {} <-> {} {}",
                pair.category,
                pair.first,
                pair.second,
                palette.dim(&format!("(x{})", pair.count))
            );
        }
    }

    if !analysis.conflict_map.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", palette.heading("Conflict map"));
        for (tag, targets) in &analysis.conflict_map {
            let _ = writeln!(out, "  {tag} -> [{}]", targets.join(", "));
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "{} tests declare conflicts",
        analysis.mutually_exclusive_tests
    );
    out
}

fn render_tag_table(out: &mut String, title: &str, table: &BTreeMap<String, TagStats>, palette: Palette) {
    if table.is_empty() {
        return;
    }
    let width = table.keys().map(String::len).max().unwrap_or(0);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", palette.heading(&format!("{title} ({})", table.len())));
    for (name, stats) in table {
        let _ = writeln!(
            out,
            "  {name:<width$}  {:>4} tests  {:>5} assertions  {}",
            stats.tests,
            stats.assertions,
            palette.dim(&stats.files.join(", "))
        );
    }
}

/// Totals followed by one table per tag category.
#[must_use]
pub fn render_stats(stats: &CorpusStats, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Corpus statistics"));
    let _ = writeln!(out, "  Files:      {}", stats.total_files);
    let _ = writeln!(out, "  Tests:      {}", stats.total_tests);
    let _ = writeln!(out, "  Assertions: {}", stats.total_assertions);
    let _ = writeln!(
        out,
        "  Mutually exclusive tests: {}",
        stats.mutually_exclusive_tests
    );

    render_tag_table(&mut out, "Functions", &stats.functions, palette);
    render_tag_table(&mut out, "Features", &stats.features, palette);
    render_tag_table(&mut out, "Behaviors", &stats.behaviors, palette);
    render_tag_table(&mut out, "Variants", &stats.variants, palette);

    if !stats.conflict_groups.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", palette.heading("Conflict groups"));
        for group in &stats.conflict_groups {
            let _ = writeln!(out, "  {{{}}}", group.tags.join(", "));
        }
    }
    out.truncate(out.trim_end().len());
    out
}

fn render_valid(profile: &ImplementationProfile, palette: Palette) -> String {
    let mut out = String::new();
    let title = profile.name.as_deref().unwrap_or("profile");
    let _ = writeln!(out, "{} {}", palette.ok("valid"), palette.heading(title));
    let _ = writeln!(out, "  functions: {}", profile.functions.join(", "));
    if !profile.features.is_empty() {
        let _ = writeln!(out, "  features:  {}", profile.features.join(", "));
    }
    for group in behavior_groups() {
        match profile.selected(group.id) {
            Some(value) => {
                let _ = writeln!(out, "  {:<16} {value}", format!("{}:", group.id));
            }
            None => {
                let _ = writeln!(
                    out,
                    "  {:<16} {}",
                    format!("{}:", group.id),
                    palette.dim("(unset)")
                );
            }
        }
    }
    let conflicting = profile.conflicting_tags();
    let _ = write!(out, "  excludes {} conflicting tags", conflicting.len());
    out
}

/// `valid` with the resolved selections, or every error found.
#[must_use]
pub fn render_profile(status: &ProfileStatus, palette: Palette) -> String {
    match status {
        ProfileStatus::Valid(profile) => render_valid(profile, palette),
        ProfileStatus::Incomplete(errors) => {
            let mut out = format!(
                "{} ({} errors)",
                palette.bad("invalid profile"),
                errors.len()
            );
            for error in errors {
                let _ = write!(out, "\n  - {}", error.message);
            }
            out
        }
    }
}
