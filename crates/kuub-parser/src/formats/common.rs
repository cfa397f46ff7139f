use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::model::Cell;

const UNIX_EPOCH: (i32, u32, u32) = (1970, 1, 1);
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Coerces a cell of a numeric column to `f64`. Garbage becomes zero.
pub fn normalize_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty => 0.0,
        Cell::Number(value) if value.is_finite() => *value,
        Cell::Number(_) => 0.0,
        Cell::Text(text) => clean_to_float(text),
        Cell::Date(_) => 0.0,
    }
}

/// Comma decimals become periods, everything but digits and periods is dropped, and an
/// empty remainder is zero. Extra periods are thousands separators.
pub fn clean_to_float(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    let candidate = match cleaned.rfind('.') {
        Some(last) if cleaned[..last].contains('.') => {
            let integer: String = cleaned[..last].chars().filter(|c| *c != '.').collect();
            format!("{integer}{}", &cleaned[last..])
        }
        _ => cleaned,
    };

    candidate.parse::<f64>().unwrap_or(0.0)
}

/// Parses a pickup date cell day-first. Unparseable input yields `None`.
pub fn parse_pickup_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => spreadsheet_serial_to_date(*serial),
        Cell::Text(text) => parse_date_text(text),
    }
}

pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    static DATE_FORMATS: &[&str] = &[
        // two-digit years first; %Y would happily read "25" as year 25
        "%d-%m-%y", "%d/%m/%y", "%d.%m.%y", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d",
        "%Y/%m/%d",
    ];
    static DATETIME_FORMATS: &[&str] = &[
        "%d-%m-%Y %H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

pub fn spreadsheet_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let (y, m, d) = SPREADSHEET_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    let (y, m, d) = UNIX_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    (date - epoch).num_days() as i32
}

pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    let (y, m, d) = UNIX_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_signed(Duration::days(i64::from(days)))
}

/// Identifier text for location/customer columns; blank is `None`.
pub fn normalize_identifier(cell: &Cell) -> Option<String> {
    cell.as_label()
}
