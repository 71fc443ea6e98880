//! Descriptive statistics, IQR outliers and market concentration for
//! datasets of named entities with a visit count.
//!
//! ```text
//!   .csv / .tsv ──► parser::load ──► Dataset ──► analyzer ──► report
//! ```

pub mod analyzer;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod utils;

pub use config::{AnalyzerConfig, load_config};
pub use model::{AnalyzerError, Dataset, DegenerateInputError, FormatError};
pub use parser::load;
