// Analyzer module: statistics, outliers, ranking and concentration over a Dataset.

pub mod daily;
pub mod market_indicators;
pub mod visit_analysis;

// `Analyzer` and `AnalyzerImpl` are reached through this module, not the crate root.
pub use visit_analysis::{Analyzer, AnalyzerImpl};
