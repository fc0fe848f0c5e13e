//! CLI command handlers.
//!
//! Handlers hold the logic behind each subcommand so it can be tested without
//! spawning the binary; `main.rs` only parses arguments and dispatches.

mod detect;
mod extract;
mod output;

pub use detect::{detect_documents, run_detect, DetectionReport};
pub use extract::{run_extract, ExtractOverrides};
pub use output::{OutputTarget, RecordSink};

/// Exit codes for scripted use
pub mod exit_codes {
    /// Every document was processed
    pub const SUCCESS: i32 = 0;
    /// `extract` skipped a document it could not read or write; `detect` met
    /// a document it did not recognize
    pub const DOCUMENTS_SKIPPED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 2;
}
