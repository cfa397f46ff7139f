use kuub_parser::schema::{BIN_VOLUME_LITERS, EXTRA_M3, PLANNED_COUNT};
use polars::prelude::*;

pub const VOLUME_M3: &str = "Volume_m3";
pub const EXTRA_BINS: &str = "Extra_bakken";
pub const TOTAL_EXTRA_M3: &str = "Extra_kuub";
pub const TOTAL_BINS: &str = "Totaal_bakken";

pub const DERIVED_COLUMNS: [&str; 4] = [VOLUME_M3, EXTRA_BINS, TOTAL_EXTRA_M3, TOTAL_BINS];

const LITERS_PER_M3: f64 = 1000.0;

/// Derived quantities for one order.
///
/// `extra_bins` (and with it `total_bins`) is `None` when the bin volume is zero, negative
/// or missing: the extra volume cannot be expressed in bins for such a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderMetrics {
    pub volume_m3: f64,
    pub extra_bins: Option<f64>,
    pub total_extra_m3: f64,
    pub total_bins: Option<f64>,
}

impl OrderMetrics {
    pub fn derive(volume_liters: f64, planned_count: f64, extra_m3: f64) -> Self {
        let volume_m3 = volume_liters / LITERS_PER_M3;
        let extra_bins = if volume_m3 > 0.0 {
            Some(extra_m3 / volume_m3).filter(|bins| bins.is_finite())
        } else {
            None
        };

        Self {
            volume_m3,
            extra_bins,
            total_extra_m3: extra_m3 + volume_m3 * planned_count,
            total_bins: extra_bins.map(|bins| planned_count + bins),
        }
    }

    pub fn has_undefined_bins(&self) -> bool {
        self.extra_bins.is_none()
    }
}

/// Appends (or replaces) the derived metric columns on a normalized order frame.
pub fn apply_volume_metrics(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    let len = df.height();

    let volume = df.column(BIN_VOLUME_LITERS)?.f64()?;
    let planned = df.column(PLANNED_COUNT)?.f64()?;
    let extra = df.column(EXTRA_M3)?.f64()?;

    let mut volume_m3 = Vec::with_capacity(len);
    let mut extra_bins = Vec::with_capacity(len);
    let mut total_extra = Vec::with_capacity(len);
    let mut total_bins = Vec::with_capacity(len);

    for idx in 0..len {
        match (volume.get(idx), planned.get(idx), extra.get(idx)) {
            (Some(volume), Some(planned), Some(extra)) => {
                let metrics = OrderMetrics::derive(volume, planned, extra);
                volume_m3.push(Some(metrics.volume_m3));
                extra_bins.push(metrics.extra_bins);
                total_extra.push(Some(metrics.total_extra_m3));
                total_bins.push(metrics.total_bins);
            }
            (volume, _, _) => {
                volume_m3.push(volume.map(|liters| liters / LITERS_PER_M3));
                extra_bins.push(None);
                total_extra.push(None);
                total_bins.push(None);
            }
        }
    }

    let mut output = df.clone();
    output.with_column(Series::new(VOLUME_M3.into(), volume_m3))?;
    output.with_column(Series::new(EXTRA_BINS.into(), extra_bins))?;
    output.with_column(Series::new(TOTAL_EXTRA_M3.into(), total_extra))?;
    output.with_column(Series::new(TOTAL_BINS.into(), total_bins))?;

    Ok(output)
}

/// Rows whose extra-bin count is undefined.
pub fn undefined_bins_count(df: &DataFrame) -> Result<usize, PolarsError> {
    Ok(df.column(EXTRA_BINS)?.null_count())
}
