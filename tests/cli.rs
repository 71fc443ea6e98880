use std::io::Write;
use std::process::{Command, Output};
use tempfile::{Builder, NamedTempFile};

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn market_lens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_market-lens"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn run_on(subcommand: &str, file: &NamedTempFile) -> Output {
    market_lens(&[subcommand, file.path().to_str().unwrap()])
}

#[test]
fn analyze_valid_file_prints_report() {
    let file = csv_file("Slug,Visits\na,100\nb,50\nc,50\n");
    let out = run_on("analyze", &file);

    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("MARKET ANALYSIS REPORT"));
    assert!(stdout.contains("Market type: Highly Concentrated"));
    assert!(stdout.contains("HHI: 3750.00"));
    assert!(out.stderr.is_empty());
}

#[test]
fn analyze_json_output_parses() {
    let file = csv_file("Slug,Visits\na,100\nb,50\nc,50\n");
    let out = market_lens(&["analyze", file.path().to_str().unwrap(), "--format", "json"]);

    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["concentration"]["total_visits"], 200);
}

#[test]
fn missing_visits_column_exits_with_error() {
    let file = csv_file("Slug,Hits\na,1\n");
    let out = run_on("analyze", &file);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("'Visits'"));
}

#[test]
fn all_zero_visits_exit_with_zero_total() {
    let file = csv_file("Slug,Visits\na,0\nb,0\n");
    let out = run_on("analyze", &file);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: total visits is zero"));
}

#[test]
fn overflowing_visits_exit_with_error() {
    let file = csv_file("Slug,Visits\na,10000000000000000000\nb,10000000000000000000\n");
    let out = run_on("totals", &file);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error: total visits exceeds"));
}

#[test]
fn rank_respects_limit() {
    let file = csv_file("Slug,Visits\na,10\nb,100\nc,25\nd,25\n");
    let out = market_lens(&["rank", file.path().to_str().unwrap(), "--limit", "2"]);

    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    // header plus two rows
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.lines().nth(1).unwrap().contains("High Performer"));
}
