//! Output for `ccl_test_compiler`.
//!
//! - [`output`] writes compiled suites and the manifest to disk
//! - [`text`] renders reports for humans, with optional color
//!
//! Machine-readable output is plain `serde_json` of the report types, sent
//! to stdout; diagnostics go to stderr.

pub mod output;
pub mod text;

pub use output::{
    MANIFEST_FILENAME, Manifest, ManifestEntry, check_output_names, output_name, write_manifest,
    write_suite,
};
pub use text::{Palette, render_conflicts, render_profile, render_stats};
