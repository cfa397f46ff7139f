#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use kuub_core::ReportPipeline;
use kuub_parser::formats::date_to_epoch_days;
use kuub_parser::schema::{
    BIN_VOLUME_LITERS, CUSTOMER_NAME, EXTRA_M3, LOCATION_ID, PICKUP_DATE, PLANNED_COUNT,
};
use kuub_parser::{load_orders_from_path, LoadOptions};
use polars::prelude::*;

pub struct OrderRow {
    pub location: &'static str,
    pub customer: &'static str,
    pub date: Option<NaiveDate>,
    pub volume_liters: f64,
    pub planned: f64,
    pub extra_m3: f64,
}

pub fn order(
    location: &'static str,
    customer: &'static str,
    date: Option<NaiveDate>,
    volume_liters: f64,
    planned: f64,
    extra_m3: f64,
) -> OrderRow {
    OrderRow {
        location,
        customer,
        date,
        volume_liters,
        planned,
        extra_m3,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a frame shaped like the loader's output.
pub fn orders_frame(rows: &[OrderRow]) -> DataFrame {
    let days: Vec<Option<i32>> = rows
        .iter()
        .map(|row| row.date.map(date_to_epoch_days))
        .collect();
    let dates = Series::new(PICKUP_DATE.into(), days)
        .cast(&DataType::Date)
        .unwrap();

    DataFrame::new(vec![
        Series::new(
            LOCATION_ID.into(),
            rows.iter().map(|row| row.location).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            CUSTOMER_NAME.into(),
            rows.iter().map(|row| row.customer).collect::<Vec<_>>(),
        )
        .into(),
        dates.into(),
        Series::new(
            BIN_VOLUME_LITERS.into(),
            rows.iter().map(|row| row.volume_liters).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            PLANNED_COUNT.into(),
            rows.iter().map(|row| row.planned).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            EXTRA_M3.into(),
            rows.iter().map(|row| row.extra_m3).collect::<Vec<_>>(),
        )
        .into(),
    ])
    .unwrap()
}

/// Same rows as the parser's preamble fixture, without going through the loader.
pub fn sample_orders() -> Vec<OrderRow> {
    vec![
        order("1001", "Bakkerij Jansen", Some(date(2025, 1, 6)), 1000.0, 2.0, 3.0),
        order("1001", "Bakkerij Jansen", Some(date(2025, 1, 7)), 240.0, 1.0, 0.72),
        order("1002", "Garage De Vries", Some(date(2025, 1, 7)), 660.0, 3.0, 2.64),
        order("1003", "Kantoor Noord", None, 0.0, 1.0, 1.5),
        order("1002", "Garage De Vries", Some(date(2025, 1, 8)), 660.0, 3.0, 1.32),
        order("1004", "Slagerij Smit", Some(date(2025, 1, 8)), 1100.0, 1.0, 5.5),
    ]
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../kuub-parser/tests/data")
        .join(name)
}

pub fn fixture_pipeline() -> ReportPipeline {
    let loaded = load_orders_from_path(
        fixture_path("orders_with_preamble.csv"),
        &LoadOptions::default(),
    )
    .expect("fixture should load");
    ReportPipeline::new(loaded).expect("metrics should derive")
}

pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

pub fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
