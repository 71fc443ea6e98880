use clap::{Parser, Subcommand};
use market_lens::analyzer::{Analyzer, AnalyzerImpl};
use market_lens::config::{AnalyzerConfig, load_config};
use market_lens::model::AnalyzerError;
use market_lens::parser::load;
use market_lens::report::{OutputFormat, json, text};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Descriptive statistics, outliers and market concentration for visit datasets.
#[derive(Parser, Debug)]
#[command(name = "market-lens", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (column names, delimiter, limits)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full report: statistics, top performers, concentration and outliers
    Analyze {
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Number of top performers to list
        #[arg(long)]
        top: Option<usize>,
    },

    /// Total, count, average, max and min of the visits column
    Totals {
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Ranked table with performance categories and market share
    Rank {
        path: PathBuf,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout only carries the report. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<String, AnalyzerError> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            load_config(path)?
        }
        None => AnalyzerConfig::default(),
    };

    match cli.command {
        Commands::Analyze { path, format, top } => {
            let analyzer = match top {
                Some(n) => AnalyzerImpl::new(&config).with_top_performers(n),
                None => AnalyzerImpl::new(&config),
            };
            let report = analyzer.report(&load_dataset(&path, &config)?)?;
            render(&report, format, text::render_report)
        }
        Commands::Totals { path, format } => {
            let totals = AnalyzerImpl::new(&config).totals(&load_dataset(&path, &config)?)?;
            render(&totals, format, text::render_totals)
        }
        Commands::Rank { path, limit, format } => {
            let limit = limit.unwrap_or(config.rank_limit);
            let rows = AnalyzerImpl::new(&config).rank(&load_dataset(&path, &config)?, limit)?;
            render(&rows, format, |rows: &Vec<_>| text::render_rank(rows))
        }
    }
}

fn load_dataset(path: &Path, config: &AnalyzerConfig) -> Result<market_lens::Dataset, AnalyzerError> {
    info!("Analyzing {}", path.display());
    Ok(load(path, config)?)
}

fn render<T: serde::Serialize>(
    data: &T,
    format: OutputFormat,
    as_text: impl Fn(&T) -> String,
) -> Result<String, AnalyzerError> {
    match format {
        OutputFormat::Text => Ok(as_text(data)),
        OutputFormat::Json => Ok(json::format(data)? + "\n"),
    }
}
