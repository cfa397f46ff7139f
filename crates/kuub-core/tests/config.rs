use chrono::NaiveDate;
use kuub_core::config::{FormatConfig, ReportConfig};
use kuub_core::PipelineError;

#[test]
fn empty_config_uses_defaults() {
    let config = ReportConfig::from_toml_str("").unwrap();
    assert_eq!(config, ReportConfig::default());
    assert_eq!(config.thresholds.min_extra_bins, 2.0);
    assert_eq!(config.thresholds.min_extra_m3, 1.0);
    assert!(config.include_undated);
    assert_eq!(config.top_customers, 20);
}

#[test]
fn parses_full_config_file() {
    let raw = r#"
        include_undated = false
        top_customers = 5

        [thresholds]
        min_extra_bins = 3.5
        min_extra_m3 = 0.75

        [date_range]
        start = "2025-01-01"
        end = "2025-03-31"

        [format]
        decimal_separator = "."
        thousands_separator = ","
        date_format = "%Y-%m-%d"
        decimals = 1
    "#;

    let config = ReportConfig::from_toml_str(raw).unwrap();
    assert!(!config.include_undated);
    assert_eq!(config.top_customers, 5);
    assert_eq!(config.thresholds.min_extra_bins, 3.5);
    assert_eq!(config.date_range.start, NaiveDate::from_ymd_opt(2025, 1, 1));
    assert_eq!(config.format.number(1234.56), "1,234.6");
    assert_eq!(config.top_locations_chart, 10);
}

#[test]
fn rejects_unknown_keys() {
    let err = ReportConfig::from_toml_str("min_extra = 2").unwrap_err();
    assert!(matches!(err, PipelineError::ConfigFile(_)));
}

#[test]
fn rejects_negative_thresholds() {
    let err = ReportConfig::from_toml_str("[thresholds]\nmin_extra_m3 = -1.0").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn rejects_inverted_date_range() {
    let raw = "[date_range]\nstart = \"2025-02-01\"\nend = \"2025-01-01\"";
    let err = ReportConfig::from_toml_str(raw).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn rejects_clashing_separators() {
    let format = FormatConfig {
        thousands_separator: Some(','),
        ..FormatConfig::default()
    };
    assert!(format.validate().is_err());
}

#[test]
fn formats_numbers_in_dutch_style_by_default() {
    let format = FormatConfig::default();

    assert_eq!(format.number(1234.5), "1.234,50");
    assert_eq!(format.number(0.72), "0,72");
    assert_eq!(format.number(-1234567.0), "-1.234.567,00");
    assert_eq!(format.number(-0.001), "0,00");
    assert_eq!(format.count(12500), "12.500");
    assert_eq!(format.optional_number(None), "-");
    assert_eq!(
        format.date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
        "31-01-2025"
    );
}

#[test]
fn rejects_time_only_date_format() {
    let err = ReportConfig::from_toml_str("[format]\ndate_format = \"%d-%m-%Y %H:%M\"").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn unrenderable_date_format_falls_back_to_day_first() {
    let format = FormatConfig {
        date_format: "%d-%m-%Y %H:%M".to_string(),
        ..FormatConfig::default()
    };
    assert_eq!(
        format.date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()),
        "06-01-2025"
    );
}

#[test]
fn rejects_excessive_decimals() {
    let err = ReportConfig::from_toml_str("[format]\ndecimals = 4000000000").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));

    let format = FormatConfig {
        decimals: 4_000_000_000,
        ..FormatConfig::default()
    };
    assert_eq!(format.number(1.5), "1,5000000000");
}
