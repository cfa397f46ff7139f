pub mod aggregation;
pub mod config;
pub mod error;
pub mod flagging;
pub mod metrics;
pub mod outputs;
pub mod pipeline;

pub use config::{DateRangeConfig, FormatConfig, ReportConfig, Thresholds};
pub use error::PipelineError;
pub use outputs::{write_exports, ExportOutcome};
pub use pipeline::{Report, ReportPipeline};
