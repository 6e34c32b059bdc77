//! Command implementations.

pub mod check_profile;
pub mod compile;
pub mod completions;
pub mod conflicts;
pub mod lint;
pub mod schema;
pub mod stats;
pub mod version;

use crate::config::{self, CliOverrides, ToolConfig};
use crate::error::Result;
use crate::format::Palette;
use crate::metadata::BehaviorMetadata;
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub json: bool,
    pub quiet: bool,
    pub no_color: bool,
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Color only for humans at a terminal.
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::new(!self.json && !self.no_color && io::stdout().is_terminal())
    }

    /// Resolve the tool configuration with `overrides` on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is missing or invalid.
    pub fn tool_config(&self, overrides: &CliOverrides) -> Result<ToolConfig> {
        config::load_config(self.config_path.as_deref(), overrides)
    }
}

/// Pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load the metadata document if one is configured.
///
/// # Errors
///
/// Returns an error if the configured file is missing or malformed.
pub fn load_metadata(path: Option<&Path>) -> Result<Option<BehaviorMetadata>> {
    path.map(BehaviorMetadata::load).transpose()
}
