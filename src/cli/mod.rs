//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Behavior-aware compiler for capability-tagged CCL test specifications
#[derive(Parser, Debug)]
#[command(name = "ccltc", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Tool configuration file (default: ./ccltc.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile source suites into atomic test units
    Compile(CompileArgs),

    /// Validate an implementation profile
    CheckProfile(CheckProfileArgs),

    /// Infer conflict groups from the corpus
    Conflicts(CorpusArgs),

    /// Cross-check the corpus against behavior metadata
    Lint(LintArgs),

    /// Show tag usage statistics for the corpus
    Stats(CorpusArgs),

    /// Print a JSON Schema
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

/// Where the source suites live.
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// Source directory or single suite file (default: tests)
    #[arg(long, short = 's')]
    pub source: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CompileArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Output directory (default: generated_tests)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Behavior metadata document
    #[arg(long, short = 'm')]
    pub metadata: Option<PathBuf>,

    /// Implementation profile; units it cannot run are skipped
    #[arg(long, short = 'p')]
    pub profile: Option<PathBuf>,

    /// Derive behavior conflicts from metadata (default)
    #[arg(long, overrides_with = "no_auto_conflicts")]
    pub auto_conflicts: bool,

    /// Keep only the conflicts declared in the source suites
    #[arg(long, overrides_with = "auto_conflicts")]
    pub no_auto_conflicts: bool,

    /// Check every source test against the metadata
    #[arg(long)]
    pub validate_metadata: bool,

    /// Compile and report without writing files
    #[arg(long)]
    pub dry_run: bool,
}

impl CompileArgs {
    /// `Some` only when one of the two flags was given.
    #[must_use]
    pub const fn auto_conflicts_override(&self) -> Option<bool> {
        if self.no_auto_conflicts {
            Some(false)
        } else if self.auto_conflicts {
            Some(true)
        } else {
            None
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CheckProfileArgs {
    /// Profile YAML file
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LintArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Behavior metadata document
    #[arg(long, short = 'm')]
    pub metadata: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Which document to describe
    #[arg(value_enum, default_value_t = SchemaKind::Unit)]
    pub kind: SchemaKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum SchemaKind {
    /// Compiled output file (array of units)
    #[default]
    Unit,
    /// Behavior metadata document
    Metadata,
    /// Implementation profile
    Profile,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    PowerShell,
    Elvish,
}
