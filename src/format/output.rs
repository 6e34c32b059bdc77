//! Compiled output files.
//!
//! Every source suite compiles to a pretty-printed array of units at the
//! same path below the output directory as the suite has below the source
//! directory. `manifest.json` lists what was written and from which inputs.

use crate::corpus::LoadedSuite;
use crate::error::{CclError, Result, ResultExt};
use crate::model::AtomicTestUnit;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// One source file and the output compiled from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub source: String,
    /// Hex SHA256 of the source file.
    pub content_hash: String,
    pub output: String,
    pub units: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub generator: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub files: Vec<ManifestEntry>,
    pub total_units: usize,
    pub total_skipped: usize,
}

impl Manifest {
    #[must_use]
    pub fn new(profile: Option<String>) -> Self {
        Self {
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            generated_at: Utc::now(),
            profile,
            files: Vec::new(),
            total_units: 0,
            total_skipped: 0,
        }
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.total_units += entry.units;
        self.total_skipped += entry.skipped;
        self.files.push(entry);
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Output file name for a suite at `relative` below the source directory,
/// `/`-separated.
#[must_use]
pub fn output_name(relative: &Path) -> String {
    relative
        .with_extension("json")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject suites that would overwrite each other or the manifest.
///
/// Names compare case-insensitively: `Core.json` and `core.json` are one
/// file on some filesystems.
///
/// # Errors
///
/// Returns `OutputCollision` for the first clash found.
pub fn check_output_names<'a, I>(suites: I) -> Result<()>
where
    I: IntoIterator<Item = &'a LoadedSuite>,
{
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for loaded in suites {
        let output = output_name(&loaded.relative);
        let key = output.to_lowercase();
        if key == MANIFEST_FILENAME {
            return Err(CclError::OutputCollision {
                output,
                reason: format!("'{}' would overwrite the manifest", loaded.path.display()),
            });
        }
        if let Some(previous) = seen.insert(key, &loaded.path) {
            return Err(CclError::OutputCollision {
                output,
                reason: format!(
                    "produced by both '{}' and '{}'",
                    previous.display(),
                    loaded.path.display()
                ),
            });
        }
    }
    Ok(())
}

/// Write the units compiled from one suite to `<dir>/<output>`.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_suite(dir: &Path, output: &str, units: &[AtomicTestUnit]) -> Result<PathBuf> {
    let path = dir.join(output);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_json(&path, units)?;
    debug!(path = %path.display(), units = units.len(), "Wrote compiled suite");
    Ok(path)
}

/// Write `<dir>/manifest.json`.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(MANIFEST_FILENAME);
    write_json(&path, manifest)?;
    Ok(path)
}
