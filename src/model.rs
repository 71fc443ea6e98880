// Core structs: Record, Dataset, analysis results and the error taxonomy
use chrono::NaiveDate;
use serde::Serialize;
use std::cell::OnceCell;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One row of the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// 0-based position of the data row in the source file.
    pub row: usize,
    pub id: String,
    pub visits: Option<u64>,
    /// Share-of-total as written in the file (percentage).
    pub share: Option<f64>,
    pub captured_on: Option<NaiveDate>,
}

/// A value that could not be coerced and was treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoercionWarning {
    pub row: usize,
    pub column: String,
    pub raw: String,
}

/// The loaded dataset. Records are never mutated after load; the computed
/// market share column is filled on first use.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub source: PathBuf,
    pub records: Vec<Record>,
    pub warnings: Vec<CoercionWarning>,
    market_shares: OnceCell<Vec<Option<f64>>>,
}

impl Dataset {
    pub fn new(source: PathBuf, records: Vec<Record>, warnings: Vec<CoercionWarning>) -> Self {
        Self {
            source,
            records,
            warnings,
            market_shares: OnceCell::new(),
        }
    }

    /// Builds an in-memory dataset, mostly useful for tests and callers that
    /// already hold parsed rows.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(PathBuf::new(), records, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Present visit counts, in row order.
    pub fn present_visits(&self) -> Vec<u64> {
        self.records.iter().filter_map(|r| r.visits).collect()
    }

    /// Sum of all present visit counts. Fails instead of wrapping when the
    /// sum does not fit in a `u64`.
    pub fn total_visits(&self) -> Result<u64, DegenerateInputError> {
        checked_total(self.records.iter().filter_map(|r| r.visits))
    }

    /// Per-record share of total visits (`visits / total`), aligned with
    /// `records`. Absent visits have no share.
    pub fn market_shares(&self) -> Result<&[Option<f64>], DegenerateInputError> {
        if let Some(shares) = self.market_shares.get() {
            return Ok(shares.as_slice());
        }
        if self.records.is_empty() {
            return Err(DegenerateInputError::EmptyDataset);
        }
        let total = self.total_visits()?;
        if total == 0 {
            return Err(DegenerateInputError::ZeroTotal);
        }
        let total = total as f64;
        let shares: Vec<Option<f64>> = self
            .records
            .iter()
            .map(|r| r.visits.map(|v| v as f64 / total))
            .collect();
        Ok(self.market_shares.get_or_init(|| shares).as_slice())
    }
}

/// Overflow-checked sum of visit counts.
pub fn checked_total(values: impl IntoIterator<Item = u64>) -> Result<u64, DegenerateInputError> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or(DegenerateInputError::TotalOverflow)
}

/// Fixed quantile set reported by `describe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub sum: u64,
    pub mean: f64,
    /// Sample standard deviation; absent with fewer than two values.
    pub std: Option<f64>,
    pub min: u64,
    pub max: u64,
    pub quantiles: Quantiles,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierList {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Outlying records, visits descending.
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketClass {
    Competitive,
    ModeratelyConcentrated,
    HighlyConcentrated,
}

impl MarketClass {
    pub fn from_hhi(hhi: f64) -> Self {
        if hhi < 1500.0 {
            MarketClass::Competitive
        } else if hhi < 2500.0 {
            MarketClass::ModeratelyConcentrated
        } else {
            MarketClass::HighlyConcentrated
        }
    }
}

impl fmt::Display for MarketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketClass::Competitive => "Competitive",
            MarketClass::ModeratelyConcentrated => "Moderately Concentrated",
            MarketClass::HighlyConcentrated => "Highly Concentrated",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationReport {
    pub total_visits: u64,
    /// Fractions of total visits held by the largest 5/10/20 records.
    pub top_5_share: f64,
    pub top_10_share: f64,
    pub top_20_share: f64,
    pub hhi: f64,
    pub classification: MarketClass,
}

/// Plain totals over the visits column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitTotals {
    pub total: u64,
    pub count: usize,
    pub average: f64,
    pub max: u64,
    pub min: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceCategory {
    HighPerformer,
    AveragePerformer,
    LowPerformer,
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceCategory::HighPerformer => "High Performer",
            PerformanceCategory::AveragePerformer => "Average Performer",
            PerformanceCategory::LowPerformer => "Low Performer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    pub rank: usize,
    pub id: String,
    pub visits: u64,
    pub share: Option<f64>,
    pub category: PerformanceCategory,
    pub market_share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub records: usize,
    pub visits: u64,
}

/// Everything `report()` renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub record_count: usize,
    pub skipped_values: usize,
    pub stats: StatsSummary,
    pub top_performers: Vec<Record>,
    pub concentration: ConcentrationReport,
    pub outliers: OutlierList,
    pub daily_totals: Vec<DailyTotal>,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("required column '{column}' not found in header of {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("column '{column}' in {} has no parseable values", .path.display())]
    NoParseableValues { path: PathBuf, column: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DegenerateInputError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("total visits is zero, shares are undefined")]
    ZeroTotal,
    #[error("no present visit values to aggregate")]
    NoValues,
    #[error("total visits exceeds {}", u64::MAX)]
    TotalOverflow,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Degenerate(#[from] DegenerateInputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),
}
