use crate::errors::LoadError;
use crate::model::{Cell, RawGrid};

use super::GridReader;

/// Reads delimited text without assuming a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedReader {
    pub delimiter: Option<u8>,
}

impl DelimitedReader {
    const NAME: &'static str = "DELIMITED";

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    /// Semicolon exports are common for comma-decimal locales.
    pub fn sniff_delimiter(content: &str) -> u8 {
        let first = content
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();
        let semicolons = first.matches(';').count();
        let commas = first.matches(',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

impl GridReader for DelimitedReader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn read(&self, bytes: &[u8]) -> Result<RawGrid, LoadError> {
        let content = String::from_utf8_lossy(bytes);
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::sniff_delimiter(content));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::from).collect::<Vec<_>>());
        }

        tracing::debug!(
            reader = Self::NAME,
            delimiter = %(delimiter as char),
            rows = rows.len(),
            "read delimited text"
        );
        Ok(RawGrid::new(rows))
    }
}
