pub const LOCATION_ID: &str = "Locatienummer";
pub const CUSTOMER_NAME: &str = "Klantnaam";
pub const PICKUP_DATE: &str = "Ophaaldatum";
pub const BIN_VOLUME_LITERS: &str = "Volume";
pub const PLANNED_COUNT: &str = "# uitgevoerd";
pub const EXTRA_M3: &str = "Extra m3";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    LOCATION_ID,
    CUSTOMER_NAME,
    PICKUP_DATE,
    BIN_VOLUME_LITERS,
    PLANNED_COUNT,
    EXTRA_M3,
];

/// Labels that mark a row as the header row when auto-detecting.
pub const SENTINEL_LABELS: [&str; 5] = [PICKUP_DATE, LOCATION_ID, CUSTOMER_NAME, PLANNED_COUNT, EXTRA_M3];

pub const NUMERIC_COLUMNS: [&str; 3] = [BIN_VOLUME_LITERS, PLANNED_COUNT, EXTRA_M3];

pub const IDENTIFIER_COLUMNS: [&str; 2] = [LOCATION_ID, CUSTOMER_NAME];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Numeric,
    PickupDate,
    Identifier,
    Inferred,
}

pub fn role_of(label: &str) -> ColumnRole {
    if NUMERIC_COLUMNS.contains(&label) {
        ColumnRole::Numeric
    } else if label == PICKUP_DATE {
        ColumnRole::PickupDate
    } else if IDENTIFIER_COLUMNS.contains(&label) {
        ColumnRole::Identifier
    } else {
        ColumnRole::Inferred
    }
}

pub fn is_sentinel(label: &str) -> bool {
    let trimmed = label.trim();
    SENTINEL_LABELS
        .iter()
        .any(|sentinel| sentinel.eq_ignore_ascii_case(trimmed))
}
