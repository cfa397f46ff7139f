pub mod errors;
pub mod formats;
pub mod header;
mod loader;
pub mod model;
mod table;

pub use errors::{LoadError, MissingColumn};
pub use formats::schema;
pub use formats::{DelimitedReader, GridReader, WorkbookReader};
pub use header::{FixedHeaderLocator, HeaderLocator, SentinelHeaderLocator};
pub use loader::{load_orders, load_orders_from_path, load_with, locate_header_table, LoadOptions};
pub use model::{Cell, LoadedOrders, RawGrid, SourceKind};
pub use table::build_order_frame;
