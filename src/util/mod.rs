//! Shared utilities for `ccl_test_compiler`.
//!
//! - Content hashing (SHA256) for the compile manifest
//! - Progress indicators over corpus files

mod hash;
pub mod progress;

pub use hash::{content_hash, content_hash_hex};
