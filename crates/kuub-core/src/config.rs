use std::fmt::Write;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// The tuning surface of a report run. Every field has a default, so an empty TOML file
/// (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub thresholds: Thresholds,
    pub date_range: DateRangeConfig,
    /// Keep rows without a parseable pickup date in the working set.
    pub include_undated: bool,
    pub top_customers: usize,
    pub top_locations_chart: usize,
    pub format: FormatConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            date_range: DateRangeConfig::default(),
            include_undated: true,
            top_customers: 20,
            top_locations_chart: 10,
            format: FormatConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ReportConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.date_range.validate()?;
        self.format.validate()?;
        if self.top_customers == 0 {
            return Err(PipelineError::Config(
                "top_customers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub min_extra_bins: f64,
    pub min_extra_m3: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_extra_bins: 2.0,
            min_extra_m3: 1.0,
        }
    }
}

impl Thresholds {
    pub fn new(min_extra_bins: f64, min_extra_m3: f64) -> Self {
        Self {
            min_extra_bins,
            min_extra_m3,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_extra_bins", self.min_extra_bins),
            ("min_extra_m3", self.min_extra_m3),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::Config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// User-chosen date bounds. A missing bound falls back to the data's own min/max.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateRangeConfig {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRangeConfig {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(PipelineError::Config(format!(
                    "date range start {start} lies after end {end}"
                )));
            }
        }
        Ok(())
    }
}

const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";
pub const MAX_DECIMALS: usize = 10;

/// Number and date presentation, passed explicitly to whatever renders a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
    pub date_format: String,
    pub decimals: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            thousands_separator: Some('.'),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            decimals: 2,
        }
    }
}

impl FormatConfig {
    pub fn validate(&self) -> Result<()> {
        if Some(self.decimal_separator) == self.thousands_separator {
            return Err(PipelineError::Config(
                "decimal and thousands separators must differ".to_string(),
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(PipelineError::Config(format!(
                "invalid date format '{}'",
                self.date_format
            )));
        }
        // well-formed patterns may still ask for time or offset fields
        let mut trial = String::new();
        if write!(trial, "{}", NaiveDate::default().format(&self.date_format)).is_err() {
            return Err(PipelineError::Config(format!(
                "date format '{}' needs more than a calendar date",
                self.date_format
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(PipelineError::Config(format!(
                "decimals must be at most {MAX_DECIMALS} (got {})",
                self.decimals
            )));
        }
        Ok(())
    }

    pub fn number(&self, value: f64) -> String {
        self.number_with(value, self.decimals)
    }

    pub fn number_with(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }
        let rendered = format!("{:.*}", decimals.min(MAX_DECIMALS), value.abs());
        let (integer, fraction) = match rendered.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (rendered.as_str(), None),
        };

        let mut grouped = String::with_capacity(rendered.len() + integer.len() / 3);
        for (idx, digit) in integer.chars().enumerate() {
            if idx > 0 && (integer.len() - idx) % 3 == 0 {
                if let Some(sep) = self.thousands_separator {
                    grouped.push(sep);
                }
            }
            grouped.push(digit);
        }
        if let Some(fraction) = fraction {
            grouped.push(self.decimal_separator);
            grouped.push_str(fraction);
        }

        let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
        if value.is_sign_negative() && !is_zero {
            format!("-{grouped}")
        } else {
            grouped
        }
    }

    pub fn optional_number(&self, value: Option<f64>) -> String {
        value.map(|v| self.number(v)).unwrap_or_else(|| "-".to_string())
    }

    pub fn count(&self, value: usize) -> String {
        self.number_with(value as f64, 0)
    }

    /// Falls back to `%d-%m-%Y` when the configured pattern cannot render a plain date.
    pub fn date(&self, value: NaiveDate) -> String {
        let mut rendered = String::new();
        match write!(rendered, "{}", value.format(&self.date_format)) {
            Ok(()) => rendered,
            Err(_) => value.format(DEFAULT_DATE_FORMAT).to_string(),
        }
    }
}
