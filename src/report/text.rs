use crate::model::{AnalysisReport, RankedRecord, Record, VisitTotals};
use crate::utils::{group_thousands, group_thousands_f64, percent};

const RULE: &str = "════════════════════════════════";

fn visits_cell(visits: Option<u64>) -> String {
    visits.map(group_thousands).unwrap_or_else(|| "-".into())
}

fn share_cell(share: Option<f64>) -> String {
    share.map(|s| format!("{s:.2}")).unwrap_or_else(|| "-".into())
}

fn record_table(records: &[Record]) -> String {
    if records.is_empty() {
        return "  (none)\n".into();
    }
    let width = records.iter().map(|r| r.id.len()).max().unwrap_or(0).max(4);
    let mut out = format!("  {:<width$}  {:>12}  {:>11}\n", "Slug", "Visits", "Total Share");
    for r in records {
        out.push_str(&format!(
            "  {:<width$}  {:>12}  {:>11}\n",
            r.id,
            visits_cell(r.visits),
            share_cell(r.share)
        ));
    }
    out
}

/// Renders the full analysis as a human-readable report.
pub fn render_report(report: &AnalysisReport) -> String {
    let stats = &report.stats;
    let conc = &report.concentration;
    let q = &stats.quantiles;

    let mut out = String::new();
    out.push_str(&format!("📊 MARKET ANALYSIS REPORT: {}\n{RULE}\n\n", report.source));

    out.push_str("📈 MARKET OVERVIEW:\n");
    out.push_str(&format!("  • Records: {}\n", report.record_count));
    out.push_str(&format!("  • Total visits: {}\n", group_thousands(stats.sum)));
    out.push_str(&format!("  • Market type: {}\n", conc.classification));
    if report.skipped_values > 0 {
        out.push_str(&format!(
            "  • Values treated as missing: {}\n",
            report.skipped_values
        ));
    }

    out.push_str(&format!("\n🏆 TOP {} PERFORMERS:\n", report.top_performers.len()));
    out.push_str(&record_table(&report.top_performers));

    out.push_str("\n📊 MARKET CONCENTRATION:\n");
    out.push_str(&format!("  • Top 5 control: {}\n", percent(conc.top_5_share)));
    out.push_str(&format!("  • Top 10 control: {}\n", percent(conc.top_10_share)));
    out.push_str(&format!("  • Top 20 control: {}\n", percent(conc.top_20_share)));
    out.push_str(&format!("  • HHI: {:.2}\n", conc.hhi));

    out.push_str("\n🎯 VISIT STATISTICS:\n");
    out.push_str(&format!("  • Count: {}\n", stats.count));
    out.push_str(&format!("  • Mean: {}\n", group_thousands_f64(stats.mean)));
    match stats.std {
        Some(std) => out.push_str(&format!("  • Std deviation: {}\n", group_thousands_f64(std))),
        None => out.push_str("  • Std deviation: n/a\n"),
    }
    out.push_str(&format!(
        "  • Min / Max: {} / {}\n",
        group_thousands(stats.min),
        group_thousands(stats.max)
    ));
    for (label, value) in [
        ("10th", q.p10),
        ("25th", q.p25),
        ("50th", q.p50),
        ("75th", q.p75),
        ("90th", q.p90),
        ("95th", q.p95),
        ("99th", q.p99),
    ] {
        out.push_str(&format!("  • {label} percentile: {}\n", group_thousands_f64(value)));
    }

    let outliers = &report.outliers;
    out.push_str(&format!(
        "\n⚠️  OUTLIERS DETECTED: {} (fences {:.2} .. {:.2})\n",
        outliers.records.len(),
        outliers.lower_fence,
        outliers.upper_fence
    ));
    if !outliers.records.is_empty() {
        out.push_str(&record_table(&outliers.records));
    }

    if report.daily_totals.len() > 1 {
        out.push_str("\n📅 VISITS BY CAPTURE DATE:\n");
        for day in &report.daily_totals {
            out.push_str(&format!(
                "  • {}: {} visits over {} records\n",
                day.date,
                group_thousands(day.visits),
                day.records
            ));
        }
    }

    out
}

pub fn render_totals(totals: &VisitTotals) -> String {
    format!(
        "Total visits: {}\nNumber of entries: {}\nAverage visits: {:.2}\nHighest visits: {}\nLowest visits: {}\n",
        group_thousands(totals.total),
        totals.count,
        totals.average,
        group_thousands(totals.max),
        group_thousands(totals.min)
    )
}

pub fn render_rank(rows: &[RankedRecord]) -> String {
    if rows.is_empty() {
        return "(no ranked records)\n".into();
    }
    let width = rows.iter().map(|r| r.id.len()).max().unwrap_or(0).max(4);
    let mut out = format!(
        "{:>4}  {:<width$}  {:>12}  {:>11}  {:<17}  {:>9}\n",
        "Rank", "Slug", "Visits", "Total Share", "Category", "Share %"
    );
    for r in rows {
        out.push_str(&format!(
            "{:>4}  {:<width$}  {:>12}  {:>11}  {:<17}  {:>9.4}\n",
            r.rank,
            r.id,
            group_thousands(r.visits),
            share_cell(r.share),
            r.category.to_string(),
            r.market_share_pct
        ));
    }
    out
}
