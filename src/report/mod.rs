//! Output rendering for analysis results.
//!
//! Every result record is `Serialize`, so JSON output is shared; the text
//! renderers in [`text`] produce the human-readable report.

pub mod text;

use serde::Serialize;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON output formatting.
pub mod json {
    use super::Serialize;

    /// Pretty-printed JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(data)
    }
}
