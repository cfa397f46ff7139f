use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use kuub_parser::formats::epoch_days_to_date;
use kuub_parser::schema::LOCATION_ID;
use polars::prelude::*;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use tracing::info;

use crate::aggregation::{
    LocationSummary, MEAN_EXTRA_BINS, ORDER_COUNT, SUM_EXTRA_BINS, SUM_EXTRA_M3,
};
use crate::metrics::{EXTRA_BINS, TOTAL_BINS};
use crate::pipeline::Report;

pub const LOCATION_EXPORT_FILE: &str = "overzicht_per_locatie.csv";
pub const FLAGGED_EXPORT_FILE: &str = "geflagde_orders.xlsx";
pub const FLAGGED_SHEET_NAME: &str = "Geflagde orders";

const EXPORT_DATE_FORMAT: &str = "dd-mm-yyyy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    NothingToExport,
    Written {
        flagged_path: PathBuf,
        locations_path: PathBuf,
    },
}

/// Flagged rows in their source column order, followed by the bin columns.
pub fn export_projection(
    flagged: &DataFrame,
    original_columns: &[String],
) -> PolarsResult<DataFrame> {
    let mut selection: Vec<&str> = original_columns
        .iter()
        .map(String::as_str)
        .filter(|name| *name != EXTRA_BINS && *name != TOTAL_BINS)
        .collect();
    selection.push(EXTRA_BINS);
    selection.push(TOTAL_BINS);
    flagged.select(selection)
}

/// Serializes the export projection into a single-sheet workbook.
pub fn flagged_workbook_bytes(projection: &DataFrame) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(EXPORT_DATE_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(FLAGGED_SHEET_NAME)?;

    for (col_idx, column) in projection.get_columns().iter().enumerate() {
        let col = u16::try_from(col_idx).context("too many columns for a worksheet")?;
        sheet.write_string(0, col, column.name().as_str())?;
        write_column(sheet, col, column, &date_format)
            .with_context(|| format!("failed to write column '{}'", column.name()))?;
    }

    let bytes = workbook
        .save_to_buffer()
        .context("failed to serialize flagged orders workbook")?;
    Ok(bytes)
}

fn write_column(
    sheet: &mut Worksheet,
    col: u16,
    column: &Column,
    date_format: &Format,
) -> Result<()> {
    match column.dtype() {
        DataType::Date => {
            let days = column.cast(&DataType::Int32)?;
            for (idx, value) in days.i32()?.into_iter().enumerate() {
                let Some(date) = value.and_then(epoch_days_to_date) else {
                    continue;
                };
                let cell = ExcelDateTime::from_ymd(
                    u16::try_from(date.year()).context("date year outside spreadsheet range")?,
                    date.month() as u8,
                    date.day() as u8,
                )?;
                sheet.write_datetime_with_format(sheet_row(idx)?, col, &cell, date_format)?;
            }
        }
        DataType::String => {
            for (idx, value) in column.str()?.into_iter().enumerate() {
                if let Some(text) = value {
                    sheet.write_string(sheet_row(idx)?, col, text)?;
                }
            }
        }
        _ => {
            let numbers = column.cast(&DataType::Float64)?;
            for (idx, value) in numbers.f64()?.into_iter().enumerate() {
                if let Some(number) = value.filter(|number| number.is_finite()) {
                    sheet.write_number(sheet_row(idx)?, col, number)?;
                }
            }
        }
    }
    Ok(())
}

// Row 0 holds the header.
fn sheet_row(idx: usize) -> Result<u32> {
    u32::try_from(idx + 1).context("too many rows for a worksheet")
}

pub fn location_csv_bytes(locations: &[LocationSummary]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        LOCATION_ID,
        ORDER_COUNT,
        MEAN_EXTRA_BINS,
        SUM_EXTRA_BINS,
        SUM_EXTRA_M3,
    ])?;

    for summary in locations {
        writer.write_record([
            summary.location.clone().unwrap_or_default(),
            summary.order_count.to_string(),
            summary
                .mean_extra_bins
                .map(|mean| mean.to_string())
                .unwrap_or_default(),
            summary.total_extra_bins.to_string(),
            summary.total_extra_m3.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush location overview: {}", err.error()))
}

/// Writes both export files into `out_dir`. An empty flagged set writes nothing.
pub fn write_exports(report: &Report, out_dir: &Path) -> Result<ExportOutcome> {
    if report.flagged.height() == 0 {
        info!("No flagged orders; skipping export");
        return Ok(ExportOutcome::NothingToExport);
    }

    let workbook = flagged_workbook_bytes(&report.export)
        .context("failed to build flagged orders workbook")?;
    let overview =
        location_csv_bytes(&report.locations).context("failed to build location overview")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let flagged_path = out_dir.join(FLAGGED_EXPORT_FILE);
    let locations_path = out_dir.join(LOCATION_EXPORT_FILE);
    fs::write(&flagged_path, workbook)
        .with_context(|| format!("failed to write {}", flagged_path.display()))?;
    fs::write(&locations_path, overview)
        .with_context(|| format!("failed to write {}", locations_path.display()))?;

    info!(
        flagged_rows = report.flagged.height(),
        locations = report.locations.len(),
        out_dir = %out_dir.display(),
        "Exports written"
    );

    Ok(ExportOutcome::Written {
        flagged_path,
        locations_path,
    })
}
