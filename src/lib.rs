//! `ccl_test_compiler` - behavior-aware compiler for CCL test specifications.
//!
//! Source suites hold tests with one input and several named validations.
//! The compiler splits them into atomic units (one input, one validation,
//! one canonical expected result), keeping the capability tags that let an
//! implementation select only the tests it can run.
//!
//! - [`model`] - source and compiled data types, tags
//! - [`compile`] - source-to-atomic compilation, payload normalization, gating
//! - [`metadata`] - declared behavior conflicts
//! - [`validation`] - implementation profile validation
//! - [`inference`] - conflict groups inferred from the corpus
//! - [`stats`] - corpus statistics

pub mod cli;
pub mod compile;
pub mod config;
pub mod corpus;
pub mod error;
pub mod format;
pub mod inference;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod stats;
pub mod util;
pub mod validation;

pub use error::{CclError, ErrorCode, Result, StructuredError};
