//! Service layer: pipeline logic separated from transport concerns.
//!
//! The intake service is used by both the web server and the CLI.

pub mod intake;

pub use intake::{IntakeError, IntakeService, ProcessedFile};
