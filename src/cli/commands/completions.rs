//! Shell completions generation command.
//!
//! ```bash
//! ccltc completions bash > ~/.local/share/bash-completion/completions/ccltc
//! ccltc completions zsh -o ~/.zsh/completions/_ccltc
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::{Result, ResultExt};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;
use tracing::info;

const BIN_NAME: &str = "ccltc";

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be created.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    info!(shell = ?args.shell, output = ?args.output, "Generating shell completions");

    let mut cmd = Cli::command();
    let shell = convert_shell_type(args.shell);

    if let Some(output_path) = &args.output {
        let mut file = std::fs::File::create(output_path)
            .with_context(|| format!("failed to create {}", output_path.display()))?;
        generate(shell, &mut cmd, BIN_NAME, &mut file);
        eprintln!(
            "Generated {} completions to {}",
            shell_name(args.shell),
            output_path.display()
        );
    } else {
        generate(shell, &mut cmd, BIN_NAME, &mut io::stdout());
    }

    Ok(())
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}

const fn shell_name(shell: ShellType) -> &'static str {
    match shell {
        ShellType::Bash => "bash",
        ShellType::Zsh => "zsh",
        ShellType::Fish => "fish",
        ShellType::PowerShell => "PowerShell",
        ShellType::Elvish => "elvish",
    }
}
