// Parser module: turns delimited files into a Dataset.

pub mod csv_parser;

pub use csv_parser::{CsvParser, Parser, load};
