use std::fmt;

use thiserror::Error;

/// One required column that could not be found under the chosen header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub label: &'static str,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported input format '{extension}' (expected xlsx, xlsm, xls, ods or csv)")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("workbook could not be opened: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input contains no rows")]
    EmptySheet,

    #[error("header row {row_index} is outside the sheet ({row_count} rows)")]
    HeaderOutOfRange { row_index: usize, row_count: usize },

    #[error("missing required columns: {}", join_missing(.missing))]
    MissingColumns {
        header_row: usize,
        missing: Vec<MissingColumn>,
    },

    #[error("failed to build order table: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

impl LoadError {
    pub fn missing_labels(&self) -> Vec<&'static str> {
        match self {
            LoadError::MissingColumns { missing, .. } => {
                missing.iter().map(|column| column.label).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn join_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(|column| column.label)
        .collect::<Vec<_>>()
        .join(", ")
}
