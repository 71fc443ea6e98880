use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Header names of the columns the parser looks for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    pub id: String,
    pub visits: String,
    pub share: String,
    pub date: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: "Slug".into(),
            visits: "Visits".into(),
            share: "Total Share".into(),
            date: "Capture Date".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub columns: ColumnConfig,
    pub delimiter: char,
    /// Number of records listed as top performers in the report.
    pub top_performers: usize,
    /// Multiplier `k` of the `Q1 - k*IQR` / `Q3 + k*IQR` fences.
    pub iqr_multiplier: f64,
    /// Default row limit of the ranking table.
    pub rank_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            columns: ColumnConfig::default(),
            delimiter: ',',
            top_performers: 10,
            iqr_multiplier: 1.5,
            rank_limit: 20,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "iqr_multiplier must be a non-negative number, got {}",
                self.iqr_multiplier
            )));
        }
        if self.columns.visits.trim().is_empty() {
            return Err(ConfigError::Invalid("columns.visits must not be empty".into()));
        }
        Ok(())
    }

    /// Delimiter byte for the CSV reader. A `.tsv` path switches the default
    /// comma to a tab.
    pub fn delimiter_for(&self, path: &Path) -> u8 {
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        if self.delimiter == ',' && is_tsv {
            b'\t'
        } else {
            self.delimiter as u8
        }
    }
}

pub fn load_config(path: &Path) -> Result<AnalyzerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AnalyzerConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
