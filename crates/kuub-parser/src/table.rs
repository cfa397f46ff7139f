use std::collections::HashSet;

use polars::prelude::*;

use crate::errors::{LoadError, MissingColumn};
use crate::formats::schema::{role_of, ColumnRole, REQUIRED_COLUMNS};
use crate::formats::{
    date_to_epoch_days, normalize_identifier, normalize_number, parse_pickup_date,
};
use crate::model::{Cell, RawGrid};

static EMPTY_CELL: Cell = Cell::Empty;

/// Names the columns of `grid` after `header_row` and normalizes every row beneath it.
pub fn build_order_frame(grid: &RawGrid, header_row: usize) -> Result<DataFrame, LoadError> {
    if grid.is_empty() {
        return Err(LoadError::EmptySheet);
    }
    if header_row >= grid.len() {
        return Err(LoadError::HeaderOutOfRange {
            row_index: header_row,
            row_count: grid.len(),
        });
    }

    let width = grid.width();
    let labels = header_labels(&grid.rows[header_row], width);

    let missing: Vec<MissingColumn> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !labels.iter().any(|label| label == *required))
        .map(|label| MissingColumn { label: *label })
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            header_row,
            missing,
        });
    }

    let data_rows: Vec<&Vec<Cell>> = grid.rows[header_row + 1..]
        .iter()
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(width);
    for (idx, label) in labels.iter().enumerate() {
        let cells: Vec<&Cell> = data_rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
            .collect();
        columns.push(build_column(label, &cells)?);
    }

    Ok(DataFrame::new(columns)?)
}

fn header_labels(row: &[Cell], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(width);
    let mut labels = Vec::with_capacity(width);

    for idx in 0..width {
        let raw = row.get(idx).and_then(Cell::as_label);
        let base = match raw {
            Some(label) => REQUIRED_COLUMNS
                .iter()
                .find(|required| required.eq_ignore_ascii_case(&label))
                .map(|required| required.to_string())
                .unwrap_or(label),
            None => format!("Unnamed: {idx}"),
        };

        let mut label = base.clone();
        let mut suffix = 1;
        while seen.contains(&label) {
            label = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(label.clone());
        labels.push(label);
    }

    labels
}

fn build_column(label: &str, cells: &[&Cell]) -> Result<Column, LoadError> {
    let series = match role_of(label) {
        ColumnRole::Numeric => {
            let values: Vec<f64> = cells.iter().map(|cell| normalize_number(cell)).collect();
            Series::new(label.into(), values)
        }
        ColumnRole::PickupDate => {
            let days: Vec<Option<i32>> = cells
                .iter()
                .map(|cell| parse_pickup_date(cell).map(date_to_epoch_days))
                .collect();
            Series::new(label.into(), days).cast(&DataType::Date)?
        }
        ColumnRole::Identifier => {
            let values: Vec<Option<String>> =
                cells.iter().map(|cell| normalize_identifier(cell)).collect();
            Series::new(label.into(), values)
        }
        ColumnRole::Inferred => infer_series(label, cells)?,
    };
    Ok(series.into())
}

fn infer_series(label: &str, cells: &[&Cell]) -> Result<Series, LoadError> {
    let non_blank: Vec<&&Cell> = cells.iter().filter(|cell| !cell.is_blank()).collect();

    if !non_blank.is_empty() && non_blank.iter().all(|cell| matches!(cell, Cell::Number(_))) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| match cell {
                Cell::Number(value) => Some(*value),
                _ => None,
            })
            .collect();
        return Ok(Series::new(label.into(), values));
    }

    if !non_blank.is_empty() && non_blank.iter().all(|cell| matches!(cell, Cell::Date(_))) {
        let days: Vec<Option<i32>> = cells
            .iter()
            .map(|cell| match cell {
                Cell::Date(date) => Some(date_to_epoch_days(*date)),
                _ => None,
            })
            .collect();
        return Ok(Series::new(label.into(), days).cast(&DataType::Date)?);
    }

    let values: Vec<Option<String>> = cells.iter().map(|cell| cell.as_label()).collect();
    Ok(Series::new(label.into(), values))
}
