mod common;
mod delimited;
pub mod schema;
mod workbook;

use crate::errors::LoadError;
use crate::model::RawGrid;

pub use common::{
    clean_to_float, date_to_epoch_days, epoch_days_to_date, normalize_identifier,
    normalize_number, parse_date_text, parse_pickup_date, spreadsheet_serial_to_date,
};
pub use delimited::DelimitedReader;
pub use workbook::WorkbookReader;

/// Turns source bytes into a raw, headerless grid.
pub trait GridReader {
    fn name(&self) -> &'static str;
    fn read(&self, bytes: &[u8]) -> Result<RawGrid, LoadError>;
}
