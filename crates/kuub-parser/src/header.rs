use crate::formats::schema::is_sentinel;
use crate::model::{Cell, RawGrid};

/// Chooses which row of a raw grid holds the column labels.
pub trait HeaderLocator {
    fn name(&self) -> &'static str;
    fn locate(&self, grid: &RawGrid) -> usize;
}

/// Picks the first row carrying any known column label, falling back to row 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelHeaderLocator;

impl HeaderLocator for SentinelHeaderLocator {
    fn name(&self) -> &'static str {
        "SENTINEL"
    }

    fn locate(&self, grid: &RawGrid) -> usize {
        grid.rows
            .iter()
            .position(|row| row.iter().any(row_cell_is_sentinel))
            .unwrap_or(0)
    }
}

fn row_cell_is_sentinel(cell: &Cell) -> bool {
    matches!(cell, Cell::Text(text) if is_sentinel(text))
}

/// Fixed-schema mode: the header always sits at the configured row.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeaderLocator(pub usize);

impl HeaderLocator for FixedHeaderLocator {
    fn name(&self) -> &'static str {
        "FIXED"
    }

    fn locate(&self, _grid: &RawGrid) -> usize {
        self.0
    }
}
