//! Stats command implementation.

use super::{CommandContext, print_json};
use crate::cli::CorpusArgs;
use crate::config::CliOverrides;
use crate::corpus;
use crate::error::Result;
use crate::format::render_stats;
use crate::stats;
use tracing::{debug, info};

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded.
pub fn execute(args: &CorpusArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.tool_config(&CliOverrides {
        source_dir: args.source.clone(),
        ..CliOverrides::default()
    })?;
    info!(source = %config.source_dir.display(), "Computing corpus statistics");

    let corpus = corpus::load_corpus(&config.source_dir)?;
    let stats = stats::collect(&corpus);
    debug!(
        functions = stats.functions.len(),
        behaviors = stats.behaviors.len(),
        "Collected tag usage"
    );

    if ctx.json {
        print_json(&stats)?;
    } else {
        println!("{}", render_stats(&stats, ctx.palette()));
    }
    Ok(())
}
