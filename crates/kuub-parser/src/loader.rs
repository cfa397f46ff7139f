use std::path::Path;

use tracing::{debug, info};

use crate::errors::LoadError;
use crate::formats::{DelimitedReader, GridReader, WorkbookReader};
use crate::header::{FixedHeaderLocator, HeaderLocator, SentinelHeaderLocator};
use crate::model::{LoadedOrders, RawGrid, SourceKind};
use crate::table::build_order_frame;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Force a delimiter for CSV input instead of sniffing it.
    pub delimiter: Option<u8>,
    /// Fixed-schema mode: use this row as the header instead of auto-detection.
    pub header_row: Option<usize>,
}

impl LoadOptions {
    fn locator(&self) -> Box<dyn HeaderLocator> {
        match self.header_row {
            Some(row) => Box::new(FixedHeaderLocator(row)),
            None => Box::new(SentinelHeaderLocator),
        }
    }

    fn reader(&self, source: SourceKind) -> Box<dyn GridReader> {
        match (source, self.delimiter) {
            (SourceKind::Workbook, _) => Box::new(WorkbookReader),
            (SourceKind::Csv, Some(delimiter)) => Box::new(DelimitedReader::with_delimiter(delimiter)),
            (SourceKind::Csv, None) => Box::new(DelimitedReader::default()),
        }
    }
}

pub fn load_orders_from_path(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<LoadedOrders, LoadError> {
    let path = path.as_ref();
    let source = SourceKind::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), %source, bytes = bytes.len(), "loading order file");
    load_orders(&bytes, source, options)
}

pub fn load_orders(
    bytes: &[u8],
    source: SourceKind,
    options: &LoadOptions,
) -> Result<LoadedOrders, LoadError> {
    let reader = options.reader(source);
    let locator = options.locator();
    load_with(bytes, source, reader.as_ref(), locator.as_ref())
}

pub fn load_with(
    bytes: &[u8],
    source: SourceKind,
    reader: &dyn GridReader,
    locator: &dyn HeaderLocator,
) -> Result<LoadedOrders, LoadError> {
    let grid = reader.read(bytes)?;
    debug!(reader = reader.name(), rows = grid.len(), "raw grid read");

    let (header_row, frame) = locate_header_table(&grid, locator)?;
    info!(
        locator = locator.name(),
        header_row,
        rows = frame.height(),
        columns = frame.width(),
        "order table normalized"
    );

    Ok(LoadedOrders {
        source,
        locator: locator.name(),
        header_row,
        frame,
    })
}

/// Header Locator stage: picks the header row and re-parses the grid beneath it.
pub fn locate_header_table(
    grid: &RawGrid,
    locator: &dyn HeaderLocator,
) -> Result<(usize, polars::prelude::DataFrame), LoadError> {
    let header_row = locator.locate(grid);
    let frame = build_order_frame(grid, header_row)?;
    Ok((header_row, frame))
}
