//! Shared utilities.

mod filename;

pub use filename::{file_extension, sanitize_filename};
