use chrono::NaiveDate;
use kuub_parser::formats::epoch_days_to_date;
use kuub_parser::schema::{EXTRA_M3, PICKUP_DATE};
use polars::prelude::*;
use serde::Serialize;

use crate::config::{DateRangeConfig, Thresholds};
use crate::metrics::EXTRA_BINS;

/// Inclusive pickup-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn pickup_dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, PolarsError> {
    let days = df.column(PICKUP_DATE)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|value| value.and_then(epoch_days_to_date))
        .collect())
}

/// Min/max of the pickup dates that parsed; `None` when no date parsed at all.
pub fn observed_date_span(df: &DataFrame) -> Result<Option<DateRange>, PolarsError> {
    let dates = pickup_dates(df)?;
    let mut parsed = dates.into_iter().flatten();
    let Some(first) = parsed.next() else {
        return Ok(None);
    };
    let (start, end) = parsed.fold((first, first), |(lo, hi), date| {
        (lo.min(date), hi.max(date))
    });
    Ok(Some(DateRange::new(start, end)))
}

/// Fills missing bounds from the data. Without any parsed date and without explicit bounds
/// there is nothing to filter on.
pub fn resolve_date_range(
    df: &DataFrame,
    requested: &DateRangeConfig,
) -> Result<Option<DateRange>, PolarsError> {
    let observed = observed_date_span(df)?;
    let start = requested.start.or(observed.map(|span| span.start));
    let end = requested.end.or(observed.map(|span| span.end));
    Ok(match (start, end) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)),
        _ => None,
    })
}

/// Restricts the working set to the date window. Undated rows are never compared against
/// the window; `include_undated` alone decides whether they stay.
pub fn apply_date_range(
    df: &DataFrame,
    range: Option<DateRange>,
    include_undated: bool,
) -> Result<DataFrame, PolarsError> {
    let mask: Vec<bool> = pickup_dates(df)?
        .into_iter()
        .map(|date| match date {
            Some(date) => range.map_or(true, |window| window.contains(date)),
            None => include_undated,
        })
        .collect();

    df.filter(&BooleanChunked::from_slice("date_window".into(), &mask))
}

/// A row is flagged when both its extra bins and its extra volume exceed their thresholds.
/// Undefined extra bins never flag.
pub fn is_flagged(extra_bins: Option<f64>, extra_m3: Option<f64>, thresholds: &Thresholds) -> bool {
    match (extra_bins, extra_m3) {
        (Some(bins), Some(volume)) => {
            bins > thresholds.min_extra_bins && volume > thresholds.min_extra_m3
        }
        _ => false,
    }
}

pub fn flag_mask(df: &DataFrame, thresholds: &Thresholds) -> Result<Vec<bool>, PolarsError> {
    let extra_bins = df.column(EXTRA_BINS)?.f64()?;
    let extra_m3 = df.column(EXTRA_M3)?.f64()?;

    Ok(extra_bins
        .into_iter()
        .zip(extra_m3)
        .map(|(bins, volume)| is_flagged(bins, volume, thresholds))
        .collect())
}

pub fn flag_orders(df: &DataFrame, thresholds: &Thresholds) -> Result<DataFrame, PolarsError> {
    let mask = flag_mask(df, thresholds)?;
    df.filter(&BooleanChunked::from_slice("flagged".into(), &mask))
}
