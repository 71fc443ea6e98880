use crate::model::PerformanceCategory;

/// Stateless numeric helpers shared by the analyzer.
pub struct MarketAnalyzer;

impl MarketAnalyzer {
    /// Linear-interpolated quantile of an ascending slice; position `(n - 1) * q`.
    /// Returns `None` for an empty slice.
    pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
        if sorted.is_empty() {
            return None;
        }
        let q = q.clamp(0.0, 1.0);
        let pos = (sorted.len() - 1) as f64 * q;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        let frac = pos - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
    }

    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn sample_std_dev(values: &[f64], mean: f64) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (values.len() - 1) as f64;
        Some(variance.sqrt())
    }

    /// Sum of the `k` largest entries of a descending slice.
    pub fn top_k_share(shares_desc: &[f64], k: usize) -> f64 {
        shares_desc.iter().take(k).sum()
    }

    /// Herfindahl–Hirschman Index on fractional shares, scaled to 0..=10 000.
    pub fn hhi(shares: &[f64]) -> f64 {
        shares.iter().map(|s| s * s).sum::<f64>() * 10_000.0
    }

    /// Competition ranks ("1224") for values already sorted descending.
    pub fn competition_ranks(values_desc: &[u64]) -> Vec<usize> {
        let mut ranks = Vec::with_capacity(values_desc.len());
        for (i, value) in values_desc.iter().enumerate() {
            let rank = match (i, ranks.last()) {
                (i, Some(&prev)) if values_desc[i - 1] == *value => prev,
                _ => i + 1,
            };
            ranks.push(rank);
        }
        ranks
    }

    pub fn categorize(visits: u64, mean: f64) -> PerformanceCategory {
        let v = visits as f64;
        if v > mean * 2.0 {
            PerformanceCategory::HighPerformer
        } else if v > mean {
            PerformanceCategory::AveragePerformer
        } else {
            PerformanceCategory::LowPerformer
        }
    }

    pub fn round_to(value: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(MarketAnalyzer::quantile(&values, 0.0), Some(1.0));
        assert_eq!(MarketAnalyzer::quantile(&values, 0.5), Some(2.5));
        assert_eq!(MarketAnalyzer::quantile(&values, 0.25), Some(1.75));
        assert_eq!(MarketAnalyzer::quantile(&values, 1.0), Some(4.0));
        assert_eq!(MarketAnalyzer::quantile(&[7.0], 0.9), Some(7.0));
        assert_eq!(MarketAnalyzer::quantile(&[], 0.5), None);
    }

    #[test]
    fn sample_std_dev_needs_two_values() {
        assert_eq!(MarketAnalyzer::sample_std_dev(&[5.0], 5.0), None);
        let sd = MarketAnalyzer::sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 5.0)
            .unwrap();
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn competition_ranking_skips_after_ties() {
        assert_eq!(MarketAnalyzer::competition_ranks(&[9, 7, 7, 3, 3, 3, 1]), vec![1, 2, 2, 4, 4, 4, 7]);
        assert!(MarketAnalyzer::competition_ranks(&[]).is_empty());
    }

    #[test]
    fn categories_follow_mean_multiples() {
        assert_eq!(MarketAnalyzer::categorize(21, 10.0), PerformanceCategory::HighPerformer);
        assert_eq!(MarketAnalyzer::categorize(20, 10.0), PerformanceCategory::AveragePerformer);
        assert_eq!(MarketAnalyzer::categorize(10, 10.0), PerformanceCategory::LowPerformer);
    }

    #[test]
    fn hhi_of_single_holder_is_maximal() {
        assert_eq!(MarketAnalyzer::hhi(&[1.0]), 10_000.0);
        assert_eq!(MarketAnalyzer::round_to(12.345_678, 4), 12.3457);
    }
}
