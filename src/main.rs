use ccl_test_compiler::cli::commands::{self, CommandContext};
use ccl_test_compiler::cli::{Cli, Commands};
use ccl_test_compiler::logging::init_logging;
use ccl_test_compiler::{CclError, StructuredError};
use clap::Parser;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let ctx = CommandContext {
        json: cli.json,
        quiet: cli.quiet,
        no_color: cli.no_color,
        config_path: cli.config.clone(),
    };

    let result = match &cli.command {
        Commands::Compile(args) => commands::compile::execute(args, &ctx),
        Commands::CheckProfile(args) => commands::check_profile::execute(args, &ctx),
        Commands::Conflicts(args) => commands::conflicts::execute(args, &ctx),
        Commands::Lint(args) => commands::lint::execute(args, &ctx),
        Commands::Stats(args) => commands::stats::execute(args, &ctx),
        Commands::Schema(args) => commands::schema::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Version => commands::version::execute(cli.json),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json, cli.no_color);
    }
}

/// Print the error and exit with its category's code.
///
/// JSON goes to stderr when --json is set or stdout is not a terminal;
/// otherwise a human-readable message, colored if stderr is a terminal.
fn handle_error(err: &CclError, json_mode: bool, no_color: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if json_mode || !io::stdout().is_terminal() {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = !no_color && io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}
