//! Tabular parsing for fetched timing data.
//!
//! Provides a stable parsing abstraction over the CSV reader.
//!
//! ### Stable Abstraction
//! - Uses the `TableParser` trait for loose coupling between the loader and
//!   the parsing engine.
//!
//! ### Output Shape
//! - Header row (when present) becomes [`ParsedTable::headers`]; every other
//!   record becomes a row of strings.
//! - Malformed input surfaces as an error, never as a partial table.

use pitwall_core::{Error, ParsedTable};

/// Configuration for table parsing.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Whether the first record holds column headers (default: true)
    pub has_headers: bool,

    /// Field delimiter (default: `,`)
    pub delimiter: u8,

    /// Trim whitespace around headers and fields (default: true)
    pub trim: bool,

    /// Accept records with varying field counts (default: false)
    pub flexible: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self { has_headers: true, delimiter: b',', trim: true, flexible: false }
    }
}

impl ParseConfig {
    /// Convert to the csv reader's builder type.
    fn to_reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None })
            .flexible(self.flexible);
        builder
    }
}

/// Stable parser trait for tabular content.
///
/// This allows swapping the parsing engine later without changing loader code.
pub trait TableParser: Send + Sync {
    /// Parse raw bytes into a table.
    fn parse(&self, bytes: &[u8], config: &ParseConfig) -> Result<ParsedTable, Error>;
}

/// CSV-based parser implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvParser;

impl TableParser for CsvParser {
    fn parse(&self, bytes: &[u8], config: &ParseConfig) -> Result<ParsedTable, Error> {
        let mut reader = config.to_reader_builder().from_reader(bytes);

        let headers = if config.has_headers {
            reader
                .headers()
                .map_err(|e| Error::ParseFailed(format!("failed to read headers: {}", e)))?
                .iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::ParseFailed(format!("malformed record: {}", e)))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(ParsedTable { headers, rows })
    }
}

/// Parse CSV bytes using the default parser.
pub fn parse_table(bytes: &[u8], config: &ParseConfig) -> Result<ParsedTable, Error> {
    CsvParser.parse(bytes, config)
}
