// Delimited-file parsing with per-value coercion
use crate::config::AnalyzerConfig;
use crate::model::{CoercionWarning, Dataset, FormatError, Record};
use crate::normalizer::normalize_all;
use crate::utils::{parse_date, parse_share, parse_visits};
use csv::{ReaderBuilder, StringRecord};
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub trait Parser {
    fn parse<R: Read>(&self, input: R, source: &Path) -> Result<Dataset, FormatError>;
}

pub struct CsvParser<'a> {
    config: &'a AnalyzerConfig,
    delimiter: u8,
}

/// Column positions resolved from the header row.
struct Columns {
    visits: usize,
    id: Option<usize>,
    share: Option<usize>,
    date: Option<usize>,
}

impl<'a> CsvParser<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self {
            config,
            delimiter: config.delimiter as u8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn resolve_columns(&self, headers: &StringRecord, source: &Path) -> Result<Columns, FormatError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
        };
        let names = &self.config.columns;

        let visits = find(&names.visits).ok_or_else(|| FormatError::MissingColumn {
            path: source.to_path_buf(),
            column: names.visits.clone(),
        })?;

        let columns = Columns {
            visits,
            id: find(&names.id),
            share: find(&names.share),
            date: find(&names.date),
        };
        for (name, idx) in [
            (&names.id, columns.id),
            (&names.share, columns.share),
            (&names.date, columns.date),
        ] {
            if idx.is_none() {
                debug!("Optional column '{}' not present", name);
            }
        }
        Ok(columns)
    }
}

impl Parser for CsvParser<'_> {
    fn parse<R: Read>(&self, input: R, source: &Path) -> Result<Dataset, FormatError> {
        let unreadable = |source_err: csv::Error| FormatError::Unreadable {
            path: source.to_path_buf(),
            source: source_err,
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(input);

        // cells are decoded lossily so a stray invalid byte only spoils its own cell
        let headers: StringRecord = reader
            .byte_headers()
            .map_err(unreadable)?
            .iter()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .into();
        let columns = self.resolve_columns(&headers, source)?;
        let names = &self.config.columns;

        let mut records = Vec::new();
        let mut warnings = Vec::new();

        for (row, result) in reader.byte_records().enumerate() {
            let raw = result.map_err(unreadable)?;
            let fields: Vec<Cow<'_, str>> = raw.iter().map(String::from_utf8_lossy).collect();

            let cell = |idx: Option<usize>| {
                idx.and_then(|i| fields.get(i))
                    .map(|f| &**f)
                    .unwrap_or("")
            };
            let mut coerce = |column: &str, text: &str, parsed: bool| {
                if !parsed && !text.trim().is_empty() {
                    debug!("Row {}: cannot coerce {} value {:?}", row, column, text);
                    warnings.push(CoercionWarning {
                        row,
                        column: column.to_string(),
                        raw: text.to_string(),
                    });
                }
            };

            let visits_raw = cell(Some(columns.visits));
            let visits = parse_visits(visits_raw);
            coerce(&names.visits, visits_raw, visits.is_some());

            let share_raw = cell(columns.share);
            let share = parse_share(share_raw);
            coerce(&names.share, share_raw, share.is_some());

            let date_raw = cell(columns.date);
            let captured_on = parse_date(date_raw);
            coerce(&names.date, date_raw, captured_on.is_some());

            records.push(Record {
                row,
                id: cell(columns.id).to_string(),
                visits,
                share,
                captured_on,
            });
        }

        if !records.is_empty() && records.iter().all(|r| r.visits.is_none()) {
            return Err(FormatError::NoParseableValues {
                path: source.to_path_buf(),
                column: names.visits.clone(),
            });
        }

        normalize_all(&mut records);

        if !warnings.is_empty() {
            warn!(
                "{} value(s) could not be coerced in {} and were treated as missing",
                warnings.len(),
                source.display()
            );
        }
        info!("Loaded {} records from {}", records.len(), source.display());

        Ok(Dataset::new(source.to_path_buf(), records, warnings))
    }
}

/// Reads the file at `path` into a Dataset.
pub fn load(path: &Path, config: &AnalyzerConfig) -> Result<Dataset, FormatError> {
    let file = File::open(path).map_err(|e| FormatError::Unreadable {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    CsvParser::new(config)
        .with_delimiter(config.delimiter_for(path))
        .parse(file, path)
}
