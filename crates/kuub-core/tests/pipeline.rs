mod common;

use kuub_core::config::{DateRangeConfig, ReportConfig, Thresholds};
use kuub_core::flagging::DateRange;
use kuub_core::metrics::{EXTRA_BINS, TOTAL_BINS, VOLUME_M3};
use kuub_core::PipelineError;
use kuub_parser::SourceKind;

use common::{assert_close, date, fixture_pipeline};

#[test]
fn fixture_report_matches_hand_computed_values() {
    let pipeline = fixture_pipeline();
    assert_eq!(pipeline.header_row(), 3);
    assert_eq!(pipeline.source(), Some(SourceKind::Csv));
    for column in [VOLUME_M3, EXTRA_BINS, TOTAL_BINS] {
        assert!(pipeline.orders().column(column).is_ok());
    }

    let report = pipeline.run(&ReportConfig::default()).unwrap();

    assert_eq!(
        report.date_range,
        Some(DateRange::new(date(2025, 1, 6), date(2025, 1, 8)))
    );
    assert_eq!(report.summary.order_count, 6);
    assert_eq!(report.summary.flagged_count, 3);
    assert_eq!(report.summary.undefined_bins_count, 1);
    assert_eq!(report.summary.undated_count, 1);
    assert_close(report.summary.total_extra_m3, 14.68);

    assert_eq!(report.daily.len(), 3);
    assert_eq!(report.customers[0].customer.as_deref(), Some("Slagerij Smit"));
    assert_eq!(report.customers.len(), 4);
    assert_eq!(report.locations.len(), 3);
}

#[test]
fn each_run_starts_from_the_full_order_set() {
    let pipeline = fixture_pipeline();

    let narrow = ReportConfig {
        date_range: DateRangeConfig {
            start: Some(date(2025, 1, 8)),
            end: None,
        },
        include_undated: false,
        ..ReportConfig::default()
    };
    let narrowed = pipeline.run(&narrow).unwrap();
    assert_eq!(narrowed.summary.order_count, 2);
    assert_eq!(narrowed.summary.flagged_count, 1);
    assert_eq!(narrowed.summary.undated_count, 0);

    let full = pipeline.run(&ReportConfig::default()).unwrap();
    assert_eq!(full.summary.order_count, 6);
    assert_eq!(pipeline.orders().height(), 6);
}

#[test]
fn looser_thresholds_flag_more_orders() {
    let pipeline = fixture_pipeline();
    let config = ReportConfig {
        thresholds: Thresholds::new(1.0, 0.5),
        ..ReportConfig::default()
    };

    let report = pipeline.run(&config).unwrap();
    assert_eq!(report.summary.flagged_count, 5);
}

#[test]
fn invalid_configuration_is_rejected_before_running() {
    let pipeline = fixture_pipeline();
    let config = ReportConfig {
        date_range: DateRangeConfig {
            start: Some(date(2025, 2, 1)),
            end: Some(date(2025, 1, 1)),
        },
        ..ReportConfig::default()
    };

    let err = pipeline.run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn json_report_carries_summary_and_aggregates() {
    let report = fixture_pipeline().run(&ReportConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["header_row"], 3);
    assert_eq!(json["summary"]["flagged_count"], 3);
    assert_eq!(json["date_range"]["start"], "2025-01-06");
    assert_eq!(json["locations"].as_array().unwrap().len(), 3);
    assert_eq!(json["daily"].as_array().unwrap().len(), 3);
}
