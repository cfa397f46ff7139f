use chrono::NaiveDate;
use kuub_parser::schema::{CUSTOMER_NAME, EXTRA_M3, LOCATION_ID, PICKUP_DATE};
use polars::prelude::*;
use serde::Serialize;

use crate::flagging::pickup_dates;
use crate::metrics::EXTRA_BINS;

pub const ORDER_COUNT: &str = "Aantal_orders";
pub const MEAN_EXTRA_BINS: &str = "Gemiddeld_extra_bakken";
pub const SUM_EXTRA_BINS: &str = "Totaal_extra_bakken";
pub const SUM_EXTRA_M3: &str = "Totaal_extra_kuub";

pub const DEFAULT_TOP_CUSTOMERS: usize = 20;

/// Extra volume per pickup date, oldest first. Undated rows are left out.
pub fn daily_extra_volume(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    df.clone()
        .lazy()
        .filter(col(PICKUP_DATE).is_not_null())
        .group_by([col(PICKUP_DATE)])
        .agg([col(EXTRA_M3).sum()])
        .sort([PICKUP_DATE], SortMultipleOptions::default())
        .collect()
}

/// Customers with the most extra volume, largest first.
pub fn customer_extra_volume(df: &DataFrame, top_n: usize) -> Result<DataFrame, PolarsError> {
    df.clone()
        .lazy()
        .group_by([col(CUSTOMER_NAME)])
        .agg([col(EXTRA_M3).sum()])
        .sort(
            [EXTRA_M3, CUSTOMER_NAME],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true),
        )
        .limit(top_n as IdxSize)
        .collect()
}

/// Per-location rollup of flagged orders, most orders first.
pub fn location_breakdown(flagged: &DataFrame) -> Result<DataFrame, PolarsError> {
    flagged
        .clone()
        .lazy()
        .group_by([col(LOCATION_ID)])
        .agg([
            col(EXTRA_M3).len().cast(DataType::Int64).alias(ORDER_COUNT),
            col(EXTRA_BINS).mean().alias(MEAN_EXTRA_BINS),
            col(EXTRA_BINS).sum().alias(SUM_EXTRA_BINS),
            col(EXTRA_M3).sum().alias(SUM_EXTRA_M3),
        ])
        .sort(
            [ORDER_COUNT, LOCATION_ID],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true),
        )
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub extra_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTotal {
    pub customer: Option<String>,
    pub extra_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location: Option<String>,
    pub order_count: i64,
    pub mean_extra_bins: Option<f64>,
    pub total_extra_bins: f64,
    pub total_extra_m3: f64,
}

pub fn daily_points(daily: &DataFrame) -> Result<Vec<DailyPoint>, PolarsError> {
    let dates = pickup_dates(daily)?;
    let totals = daily.column(EXTRA_M3)?.f64()?;
    Ok(dates
        .into_iter()
        .zip(totals)
        .filter_map(|(date, total)| {
            date.map(|date| DailyPoint {
                date,
                extra_m3: total.unwrap_or(0.0),
            })
        })
        .collect())
}

pub fn customer_totals(customers: &DataFrame) -> Result<Vec<CustomerTotal>, PolarsError> {
    let names = customers.column(CUSTOMER_NAME)?.str()?;
    let totals = customers.column(EXTRA_M3)?.f64()?;
    Ok(names
        .into_iter()
        .zip(totals)
        .map(|(name, total)| CustomerTotal {
            customer: name.map(str::to_string),
            extra_m3: total.unwrap_or(0.0),
        })
        .collect())
}

pub fn location_summaries(locations: &DataFrame) -> Result<Vec<LocationSummary>, PolarsError> {
    let ids = locations.column(LOCATION_ID)?.str()?;
    let counts = locations.column(ORDER_COUNT)?.i64()?;
    let means = locations.column(MEAN_EXTRA_BINS)?.f64()?;
    let bins = locations.column(SUM_EXTRA_BINS)?.f64()?;
    let volumes = locations.column(SUM_EXTRA_M3)?.f64()?;

    Ok((0..locations.height())
        .map(|idx| LocationSummary {
            location: ids.get(idx).map(str::to_string),
            order_count: counts.get(idx).unwrap_or(0),
            mean_extra_bins: means.get(idx),
            total_extra_bins: bins.get(idx).unwrap_or(0.0),
            total_extra_m3: volumes.get(idx).unwrap_or(0.0),
        })
        .collect())
}

/// Headline numbers over the working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_extra_m3: f64,
    pub mean_extra_m3: Option<f64>,
    pub mean_extra_bins: Option<f64>,
    pub order_count: usize,
    pub flagged_count: usize,
    pub undefined_bins_count: usize,
    pub undated_count: usize,
    pub undated_extra_m3: f64,
}

pub fn summarize(working: &DataFrame, flagged_count: usize) -> Result<SummaryMetrics, PolarsError> {
    let extra = working.column(EXTRA_M3)?.f64()?;
    let extra_bins = working.column(EXTRA_BINS)?.f64()?;
    let dates = pickup_dates(working)?;

    let (undated_count, undated_extra_m3) = dates
        .iter()
        .zip(extra)
        .filter(|(date, _)| date.is_none())
        .fold((0usize, 0.0f64), |(count, total), (_, value)| {
            (count + 1, total + value.unwrap_or(0.0))
        });

    Ok(SummaryMetrics {
        total_extra_m3: extra.sum().unwrap_or(0.0),
        mean_extra_m3: extra.mean(),
        mean_extra_bins: extra_bins.mean(),
        order_count: working.height(),
        flagged_count,
        undefined_bins_count: extra_bins.null_count(),
        undated_count,
        undated_extra_m3,
    })
}
