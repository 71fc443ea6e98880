use market_lens::analyzer::{Analyzer, AnalyzerImpl};
use market_lens::config::AnalyzerConfig;
use market_lens::model::{DegenerateInputError, FormatError, MarketClass};
use market_lens::parser::load;
use market_lens::report::{json, text};
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const SAMPLE: &str = "\
Slug,Visits,Total Share,Capture Date
search,52000,41.2,2023-11-17
mail,21000,16.6,2023-11-17
maps,20500,16.2,2023-11-17
video,n/a,,2023-11-17
news,9800,7.8,2023-11-18
docs,9000,7.1,2023-11-18
drive,8700,6.9,2023-11-18
photos,5100,4.0,2023-11-18
";

#[test]
fn non_numeric_visits_are_excluded_but_kept() {
    let file = csv_file(SAMPLE);
    let ds = load(file.path(), &AnalyzerConfig::default()).unwrap();

    assert_eq!(ds.len(), 8);
    let video = ds.records.iter().find(|r| r.id == "video").unwrap();
    assert_eq!(video.visits, None);
    assert_eq!(ds.warnings.len(), 1);

    let stats = AnalyzerImpl::default().describe(&ds).unwrap();
    assert_eq!(stats.count, 7);
    assert_eq!(stats.sum, 126_100);
    assert!((stats.mean - 126_100.0 / 7.0).abs() < 1e-9);
}

#[test]
fn full_report_from_file() {
    let file = csv_file(SAMPLE);
    let ds = load(file.path(), &AnalyzerConfig::default()).unwrap();
    let report = AnalyzerImpl::default().report(&ds).unwrap();

    assert_eq!(report.top_performers[0].id, "search");
    // absent visits sort last
    assert_eq!(report.top_performers.last().unwrap().id, "video");
    assert_eq!(report.concentration.classification, MarketClass::ModeratelyConcentrated);
    assert_eq!(report.outliers.records.len(), 1);
    assert_eq!(report.outliers.records[0].id, "search");
    assert_eq!(report.daily_totals.len(), 2);

    let rendered = text::render_report(&report);
    assert!(rendered.contains("Total visits: 126,100"));
    assert!(rendered.contains("VISITS BY CAPTURE DATE"));

    let as_json = json::format(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&as_json).unwrap();
    assert_eq!(value["concentration"]["classification"], "ModeratelyConcentrated");
    assert_eq!(value["daily_totals"][0]["date"], "2023-11-17");
}

#[test]
fn missing_file_is_unreadable() {
    let err = load(Path::new("/definitely/not/here.csv"), &AnalyzerConfig::default()).unwrap_err();
    assert!(matches!(err, FormatError::Unreadable { .. }));
    assert!(err.to_string().contains("/definitely/not/here.csv"));
}

#[test]
fn missing_visits_column_names_the_column() {
    let file = csv_file("Slug,Hits\na,1\n");
    let err = load(file.path(), &AnalyzerConfig::default()).unwrap_err();
    assert!(err.to_string().contains("'Visits'"));
}

#[test]
fn header_only_file_is_degenerate_for_concentration() {
    let file = csv_file("Slug,Visits\n");
    let ds = load(file.path(), &AnalyzerConfig::default()).unwrap();
    let err = AnalyzerImpl::default().market_concentration(&ds).unwrap_err();
    assert_eq!(err, DegenerateInputError::EmptyDataset);
}

#[test]
fn tab_separated_file_with_custom_columns() {
    let mut file = Builder::new().suffix(".tsv").tempfile().unwrap();
    file.write_all(b"name\thits\nx\t10\ny\t30\n").unwrap();

    let mut config = AnalyzerConfig::default();
    config.columns.id = "name".into();
    config.columns.visits = "hits".into();

    let ds = load(file.path(), &config).unwrap();
    let totals = AnalyzerImpl::new(&config).totals(&ds).unwrap();
    assert_eq!(totals.total, 40);
    assert_eq!(totals.average, 20.0);
    assert_eq!(ds.records[1].id, "y");
}
