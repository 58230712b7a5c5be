//! Cascading search for the supporting depth pair under a transition
//!
//! A pinch or fade at `(row, column)` opening toward `side` is anchored on
//! the surface beneath it: the top elevations at `column` and its neighbour
//! on that side. When either is absent in the row directly below, the search
//! descends one row at a time, always reading the same column pair, until a
//! fully defined pair turns up or the base row has been checked.

use super::GeometryError;
use crate::types::Side;

/// Read access to formation-top elevations during assembly.
///
/// Rows index the style grid, the base row included.
pub trait DepthSource {
    /// Top elevation of `row` at `column`; `None` when absent
    fn top(&self, row: usize, column: usize) -> Option<f64>;

    /// Total rows including the base row
    fn row_count(&self) -> usize;
}

impl DepthSource for crate::types::DepthGrid {
    fn top(&self, row: usize, column: usize) -> Option<f64> {
        self.get(row, column)
    }

    fn row_count(&self) -> usize {
        crate::types::DepthGrid::row_count(self)
    }
}

/// Defined depth pair found below a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPair {
    /// Row the pair was read from
    pub row: usize,
    pub column: usize,
    pub neighbor: usize,
    pub column_depth: f64,
    pub neighbor_depth: f64,
}

/// Find the nearest defined `(column, neighbour)` depth pair below `row`.
///
/// The search is bounded by the grid: rows `row + 1 ..= base` are tried in
/// order and exhausting them is a data gap.
pub fn find_anchor<S: DepthSource + ?Sized>(
    source: &S,
    row: usize,
    column: usize,
    side: Side,
    columns: usize,
) -> Result<AnchorPair, GeometryError> {
    let neighbor = side.neighbor(column, columns).ok_or_else(|| {
        GeometryError::configuration(
            Some(row),
            Some(column),
            format!("no borehole to the {side} of the section edge"),
        )
    })?;

    for level in (row + 1)..source.row_count() {
        if let (Some(column_depth), Some(neighbor_depth)) =
            (source.top(level, column), source.top(level, neighbor))
        {
            return Ok(AnchorPair {
                row: level,
                column,
                neighbor,
                column_depth,
                neighbor_depth,
            });
        }
    }

    Err(GeometryError::data_gap(
        row,
        Some(column),
        format!("no defined depth pair below toward the {side} (columns {column} and {neighbor})"),
    ))
}
