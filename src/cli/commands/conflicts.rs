//! Conflicts command implementation.

use super::{CommandContext, print_json};
use crate::cli::CorpusArgs;
use crate::config::CliOverrides;
use crate::corpus;
use crate::error::Result;
use crate::format::render_conflicts;
use crate::inference;
use tracing::info;

/// Execute the conflicts command.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded.
pub fn execute(args: &CorpusArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.tool_config(&CliOverrides {
        source_dir: args.source.clone(),
        ..CliOverrides::default()
    })?;
    let corpus = corpus::load_corpus(&config.source_dir)?;
    info!(tests = corpus.test_count(), "Inferring conflict groups");

    let analysis = inference::analyze(corpus.tests());

    if ctx.json {
        print_json(&analysis)?;
    } else {
        println!("{}", render_conflicts(&analysis, ctx.palette()));
    }
    Ok(())
}
