//! Check-profile command implementation.
//!
//! Prints the resolved selections of a valid profile, or every problem with
//! an invalid one. An invalid profile exits with the profile error code.

use super::{CommandContext, print_json};
use crate::cli::CheckProfileArgs;
use crate::config::profile::ProfileDocument;
use crate::error::{ErrorCode, Result, ValidationError};
use crate::format::render_profile;
use crate::validation::{ImplementationProfile, ProfileStatus, ProfileValidator};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct CheckOutput<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a ImplementationProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conflicting_tags: Vec<String>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    errors: &'a [ValidationError],
}

fn output(status: &ProfileStatus) -> CheckOutput<'_> {
    match status {
        ProfileStatus::Valid(profile) => CheckOutput {
            valid: true,
            profile: Some(profile),
            conflicting_tags: profile.conflicting_tags(),
            errors: &[],
        },
        ProfileStatus::Incomplete(errors) => CheckOutput {
            valid: false,
            profile: None,
            conflicting_tags: Vec::new(),
            errors,
        },
    }
}

/// Execute the check-profile command.
///
/// # Errors
///
/// Returns an error if the profile file cannot be read or parsed.
pub fn execute(args: &CheckProfileArgs, ctx: &CommandContext) -> Result<()> {
    info!(path = %args.file.display(), "Checking profile");
    let doc = ProfileDocument::load(&args.file)?;
    let status = ProfileValidator::status(&doc);

    if ctx.json {
        print_json(&output(&status))?;
    } else if !ctx.quiet || !status.is_valid() {
        println!("{}", render_profile(&status, ctx.palette()));
    }

    if !status.is_valid() {
        std::process::exit(ErrorCode::InvalidProfile.exit_code());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_output_lists_errors_without_profile() {
        let doc = ProfileDocument::from_yaml_str("functions: [parse]\n").unwrap();
        let status = ProfileValidator::status(&doc);
        let value = serde_json::to_value(output(&status)).unwrap();
        assert_eq!(value["valid"], false);
        assert!(value.get("profile").is_none());
        assert!(value["errors"].as_array().unwrap().len() >= 6);
    }
}
