//! Schema command implementation.
//!
//! Prints the JSON Schema of a compiled output file, the behavior metadata
//! document, or the implementation profile.

use super::print_json;
use crate::cli::{SchemaArgs, SchemaKind};
use crate::config::profile::ProfileDocument;
use crate::error::Result;
use crate::metadata::BehaviorMetadata;
use crate::model::AtomicTestUnit;
use schemars::schema::RootSchema;
use schemars::schema_for;

/// Schema for `kind`.
#[must_use]
pub fn schema(kind: SchemaKind) -> RootSchema {
    match kind {
        SchemaKind::Unit => schema_for!(Vec<AtomicTestUnit>),
        SchemaKind::Metadata => schema_for!(BehaviorMetadata),
        SchemaKind::Profile => schema_for!(ProfileDocument),
    }
}

/// Execute the schema command. The output is JSON regardless of `--json`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn execute(args: &SchemaArgs) -> Result<()> {
    print_json(&schema(args.kind))
}
