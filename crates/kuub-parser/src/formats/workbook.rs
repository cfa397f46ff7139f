use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::errors::LoadError;
use crate::model::{Cell, RawGrid};

use super::common::parse_date_text;
use super::GridReader;

/// Reads the first worksheet of an xlsx/xlsm/xlsb/xls/ods workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookReader;

impl WorkbookReader {
    const NAME: &'static str = "WORKBOOK";

    fn convert(cell: &Data) -> Cell {
        match cell {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(value) => Cell::Text(value.clone()),
            Data::Float(value) => Cell::Number(*value),
            Data::Int(value) => Cell::Number(*value as f64),
            Data::Bool(value) => Cell::Text(value.to_string()),
            Data::DateTime(value) => match value.as_datetime() {
                Some(dt) => Cell::Date(dt.date()),
                None => Cell::Number(value.as_f64()),
            },
            Data::DateTimeIso(value) => match parse_date_text(value) {
                Some(date) => Cell::Date(date),
                None => Cell::Text(value.clone()),
            },
            Data::DurationIso(value) => Cell::Text(value.clone()),
        }
    }
}

impl GridReader for WorkbookReader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn read(&self, bytes: &[u8]) -> Result<RawGrid, LoadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoadError::EmptySheet)??;

        // the reader trims leading empty rows; restore them so row indices match the sheet
        let leading_rows = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); leading_rows];
        rows.extend(
            range
                .rows()
                .map(|row| row.iter().map(Self::convert).collect::<Vec<_>>()),
        );

        tracing::debug!(reader = Self::NAME, rows = rows.len(), "read worksheet");
        Ok(RawGrid::new(rows))
    }
}
