use crate::analyzer::daily::build_daily_totals;
use crate::analyzer::market_indicators::MarketAnalyzer;
use crate::config::AnalyzerConfig;
use crate::model::{
    AnalysisReport, ConcentrationReport, DailyTotal, Dataset, DegenerateInputError, MarketClass,
    OutlierList, Quantiles, RankedRecord, Record, StatsSummary, VisitTotals, checked_total,
};
use tracing::debug;

const QUANTILE_LEVELS: [f64; 7] = [0.10, 0.25, 0.50, 0.75, 0.90, 0.95, 0.99];

/// Trait defining the interface for a visits analyzer.
pub trait Analyzer {
    fn describe(&self, dataset: &Dataset) -> Result<StatsSummary, DegenerateInputError>;
    fn detect_outliers(&self, dataset: &Dataset) -> OutlierList;
    fn top_n(&self, dataset: &Dataset, n: usize) -> Vec<Record>;
    fn market_concentration(&self, dataset: &Dataset) -> Result<ConcentrationReport, DegenerateInputError>;
    fn totals(&self, dataset: &Dataset) -> Result<VisitTotals, DegenerateInputError>;
    fn rank(&self, dataset: &Dataset, limit: usize) -> Result<Vec<RankedRecord>, DegenerateInputError>;
    fn daily_totals(&self, dataset: &Dataset) -> Result<Vec<DailyTotal>, DegenerateInputError>;
    /// Assembles every analysis into a single report.
    fn report(&self, dataset: &Dataset) -> Result<AnalysisReport, DegenerateInputError>;
}

/// Implementation of the visits analyzer.
pub struct AnalyzerImpl {
    iqr_multiplier: f64,
    top_performers: usize,
}

impl AnalyzerImpl {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            iqr_multiplier: config.iqr_multiplier,
            top_performers: config.top_performers,
        }
    }

    pub fn with_top_performers(mut self, n: usize) -> Self {
        self.top_performers = n;
        self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

/// Present visits as ascending floats.
fn sorted_values(dataset: &Dataset) -> Vec<f64> {
    let mut values = dataset.present_visits();
    values.sort_unstable();
    values.into_iter().map(|v| v as f64).collect()
}

impl Analyzer for AnalyzerImpl {
    /// Count, mean, sample deviation, range and quantiles over present visits.
    fn describe(&self, dataset: &Dataset) -> Result<StatsSummary, DegenerateInputError> {
        let present = dataset.present_visits();
        let (Some(&min), Some(&max)) = (present.iter().min(), present.iter().max()) else {
            return Err(DegenerateInputError::NoValues);
        };
        let sum = checked_total(present.iter().copied())?;

        let values = sorted_values(dataset);
        let mean = MarketAnalyzer::mean(&values).ok_or(DegenerateInputError::NoValues)?;

        let q: Vec<f64> = QUANTILE_LEVELS
            .iter()
            .map(|&level| MarketAnalyzer::quantile(&values, level))
            .collect::<Option<_>>()
            .ok_or(DegenerateInputError::NoValues)?;

        let summary = StatsSummary {
            count: values.len(),
            sum,
            mean,
            std: MarketAnalyzer::sample_std_dev(&values, mean),
            min,
            max,
            quantiles: Quantiles {
                p10: q[0],
                p25: q[1],
                p50: q[2],
                p75: q[3],
                p90: q[4],
                p95: q[5],
                p99: q[6],
            },
        };
        debug!("describe: count = {}, mean = {:.2}", summary.count, summary.mean);
        Ok(summary)
    }

    /// IQR fence rule. Outliers are returned by visits descending.
    fn detect_outliers(&self, dataset: &Dataset) -> OutlierList {
        let values = sorted_values(dataset);
        let (Some(q1), Some(q3)) = (
            MarketAnalyzer::quantile(&values, 0.25),
            MarketAnalyzer::quantile(&values, 0.75),
        ) else {
            return OutlierList {
                q1: 0.0,
                q3: 0.0,
                iqr: 0.0,
                lower_fence: 0.0,
                upper_fence: 0.0,
                records: Vec::new(),
            };
        };

        let iqr = q3 - q1;
        let lower_fence = q1 - self.iqr_multiplier * iqr;
        let upper_fence = q3 + self.iqr_multiplier * iqr;

        let mut records: Vec<Record> = dataset
            .records
            .iter()
            .filter(|r| {
                r.visits
                    .map(|v| (v as f64) < lower_fence || (v as f64) > upper_fence)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.visits.cmp(&a.visits));

        debug!(
            "outliers: fences [{:.2}, {:.2}], {} flagged",
            lower_fence,
            upper_fence,
            records.len()
        );
        OutlierList {
            q1,
            q3,
            iqr,
            lower_fence,
            upper_fence,
            records,
        }
    }

    /// Largest `n` records; ties keep row order, absent visits come last.
    fn top_n(&self, dataset: &Dataset, n: usize) -> Vec<Record> {
        let mut ordered: Vec<&Record> = dataset.records.iter().collect();
        ordered.sort_by(|a, b| b.visits.cmp(&a.visits));
        ordered.into_iter().take(n).cloned().collect()
    }

    /// Top-5/10/20 shares and HHI from the computed market share column.
    fn market_concentration(&self, dataset: &Dataset) -> Result<ConcentrationReport, DegenerateInputError> {
        let mut shares: Vec<f64> = dataset.market_shares()?.iter().flatten().copied().collect();
        // descending order makes both the top-k sums and the HHI independent of row order
        shares.sort_by(|a, b| b.total_cmp(a));

        let hhi = MarketAnalyzer::hhi(&shares);
        let report = ConcentrationReport {
            total_visits: dataset.total_visits()?,
            top_5_share: MarketAnalyzer::top_k_share(&shares, 5),
            top_10_share: MarketAnalyzer::top_k_share(&shares, 10),
            top_20_share: MarketAnalyzer::top_k_share(&shares, 20),
            hhi,
            classification: MarketClass::from_hhi(hhi),
        };
        debug!("concentration: hhi = {:.2} ({})", report.hhi, report.classification);
        Ok(report)
    }

    fn totals(&self, dataset: &Dataset) -> Result<VisitTotals, DegenerateInputError> {
        let values = dataset.present_visits();
        let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
            return Err(DegenerateInputError::NoValues);
        };
        let total = checked_total(values.iter().copied())?;
        Ok(VisitTotals {
            total,
            count: values.len(),
            average: MarketAnalyzer::round_to(total as f64 / values.len() as f64, 2),
            max,
            min,
        })
    }

    /// Competition-ranked table with performance categories relative to the mean.
    fn rank(&self, dataset: &Dataset, limit: usize) -> Result<Vec<RankedRecord>, DegenerateInputError> {
        // rejects empty and zero-total datasets before any division
        dataset.market_shares()?;
        let total = dataset.total_visits()? as f64;
        let present_count = dataset.records.iter().filter(|r| r.visits.is_some()).count();
        let mean = total / present_count as f64;

        let mut present: Vec<(&Record, u64)> = dataset
            .records
            .iter()
            .filter_map(|r| r.visits.map(|v| (r, v)))
            .collect();
        present.sort_by(|a, b| b.1.cmp(&a.1));

        let visits_desc: Vec<u64> = present.iter().map(|(_, v)| *v).collect();
        let ranks = MarketAnalyzer::competition_ranks(&visits_desc);

        Ok(present
            .into_iter()
            .zip(ranks)
            .take(limit)
            .map(|((record, visits), rank)| RankedRecord {
                rank,
                id: record.id.clone(),
                visits,
                share: record.share,
                category: MarketAnalyzer::categorize(visits, mean),
                market_share_pct: MarketAnalyzer::round_to(visits as f64 * 100.0 / total, 4),
            })
            .collect())
    }

    fn daily_totals(&self, dataset: &Dataset) -> Result<Vec<DailyTotal>, DegenerateInputError> {
        build_daily_totals(&dataset.records)
    }

    fn report(&self, dataset: &Dataset) -> Result<AnalysisReport, DegenerateInputError> {
        let stats = self.describe(dataset)?;
        let concentration = self.market_concentration(dataset)?;

        Ok(AnalysisReport {
            source: dataset.source.display().to_string(),
            record_count: dataset.len(),
            skipped_values: dataset.warnings.len(),
            stats,
            top_performers: self.top_n(dataset, self.top_performers),
            concentration,
            outliers: self.detect_outliers(dataset),
            daily_totals: self.daily_totals(dataset)?,
        })
    }
}
