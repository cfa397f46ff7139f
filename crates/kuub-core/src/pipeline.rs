use kuub_parser::{LoadedOrders, SourceKind};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregation::{
    self, CustomerTotal, DailyPoint, LocationSummary, SummaryMetrics,
};
use crate::config::{ReportConfig, Thresholds};
use crate::error::Result;
use crate::flagging::{self, DateRange};
use crate::metrics::{self, DERIVED_COLUMNS};
use crate::outputs;

/// Holds the normalized order frame with its derived metrics. Each `run` recomputes the
/// filter, flag and aggregate stages from scratch, so one pipeline serves any number of
/// configurations.
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    source: Option<SourceKind>,
    header_row: usize,
    original_columns: Vec<String>,
    orders: DataFrame,
}

impl ReportPipeline {
    pub fn new(loaded: LoadedOrders) -> Result<Self> {
        let mut pipeline = Self::from_frame(loaded.frame, loaded.header_row)?;
        pipeline.source = Some(loaded.source);
        Ok(pipeline)
    }

    pub fn from_frame(frame: DataFrame, header_row: usize) -> Result<Self> {
        let original_columns = frame
            .get_column_names_str()
            .into_iter()
            .filter(|name| !DERIVED_COLUMNS.contains(name))
            .map(str::to_string)
            .collect();

        let orders = metrics::apply_volume_metrics(&frame)?;
        let undefined = metrics::undefined_bins_count(&orders)?;
        if undefined > 0 {
            warn!(
                rows = undefined,
                "Orders with zero or missing bin volume; extra bins left undefined"
            );
        }
        debug!(rows = orders.height(), "Volume metrics derived");

        Ok(Self {
            source: None,
            header_row,
            original_columns,
            orders,
        })
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn orders(&self) -> &DataFrame {
        &self.orders
    }

    pub fn original_columns(&self) -> &[String] {
        &self.original_columns
    }

    pub fn run(&self, config: &ReportConfig) -> Result<Report> {
        config.validate()?;

        let date_range = flagging::resolve_date_range(&self.orders, &config.date_range)?;
        let working =
            flagging::apply_date_range(&self.orders, date_range, config.include_undated)?;
        let flagged = flagging::flag_orders(&working, &config.thresholds)?;
        info!(
            working_rows = working.height(),
            flagged_rows = flagged.height(),
            min_extra_bins = config.thresholds.min_extra_bins,
            min_extra_m3 = config.thresholds.min_extra_m3,
            "Orders flagged"
        );

        let summary = aggregation::summarize(&working, flagged.height())?;
        let daily = aggregation::daily_points(&aggregation::daily_extra_volume(&working)?)?;
        let customers = aggregation::customer_totals(&aggregation::customer_extra_volume(
            &working,
            config.top_customers,
        )?)?;
        let locations =
            aggregation::location_summaries(&aggregation::location_breakdown(&flagged)?)?;
        let export = outputs::export_projection(&flagged, &self.original_columns)?;

        Ok(Report {
            header_row: self.header_row,
            date_range,
            thresholds: config.thresholds,
            working,
            flagged,
            export,
            summary,
            daily,
            customers,
            locations,
        })
    }
}

/// Everything one configuration produces.
#[derive(Debug, Clone)]
pub struct Report {
    pub header_row: usize,
    /// Effective window after defaulting; `None` when no pickup date parsed.
    pub date_range: Option<DateRange>,
    pub thresholds: Thresholds,
    pub working: DataFrame,
    pub flagged: DataFrame,
    /// Flagged rows projected to source columns plus the bin columns.
    pub export: DataFrame,
    pub summary: SummaryMetrics,
    pub daily: Vec<DailyPoint>,
    pub customers: Vec<CustomerTotal>,
    pub locations: Vec<LocationSummary>,
}

#[derive(Serialize)]
struct ReportView<'a> {
    header_row: usize,
    date_range: Option<DateRange>,
    thresholds: &'a Thresholds,
    summary: &'a SummaryMetrics,
    daily: &'a [DailyPoint],
    customers: &'a [CustomerTotal],
    locations: &'a [LocationSummary],
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        let view = ReportView {
            header_row: self.header_row,
            date_range: self.date_range,
            thresholds: &self.thresholds,
            summary: &self.summary,
            daily: &self.daily,
            customers: &self.customers,
            locations: &self.locations,
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}
