//! Cross-section geometry construction
//!
//! Leaves first:
//! - `direction`: which side a pinch/fade cell opens toward
//! - `anchor`: cascading search for the supporting depth pair below a row
//! - `interpolate`: two-point line evaluation and pinch apexes
//! - `teeth`: zig-zag point runs for interlocking fades
//! - `transitions`: per-occurrence midpoint corrections and tooth specs
//! - `assembler`: bottom-up formation polygon assembly
//! - `contacts`: solid/dashed contact lines along formation tops
//!
//! Rows are assembled strictly bottom to top because row `r` reads the
//! finished polygon of row `r + 1`. Failures are isolated per formation row.

pub mod anchor;
pub mod assembler;
pub mod contacts;
pub mod direction;
pub mod interpolate;
pub mod teeth;
pub mod transitions;

pub use anchor::{find_anchor, AnchorPair, DepthSource};
pub use assembler::{Assembly, PolygonAssembler};
pub use contacts::build_contact_lines;
pub use direction::{resolve_direction, Direction};
pub use interpolate::{elevation_at, pinch_apex};
pub use teeth::{linspace, teeth_point, tooth_pattern, FadeProfile};
pub use transitions::{TransitionOccurrence, TransitionTable};

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Geometry failure, scoped to the formation row (and borehole column) that
/// caused it so callers can surface the failing formation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryError {
    /// Malformed style grid, unresolved direction, degenerate spacing
    #[error("configuration error{}: {message}", location(*.row, *.column))]
    Configuration {
        row: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    /// A cascading depth search ran off the bottom of the grid
    #[error("data gap{}: {message}", location(Some(*.row), *.column))]
    DataGap {
        row: usize,
        column: Option<usize>,
        message: String,
    },

    /// The assembled polygon is not monotonic, not finite or does not close
    #[error("geometry invariant violated{}: {message}", location(Some(*.row), None))]
    GeometryInvariant { row: usize, message: String },
}

fn location(row: Option<usize>, column: Option<usize>) -> String {
    match (row, column) {
        (Some(r), Some(c)) => format!(" at row {r}, column {c}"),
        (Some(r), None) => format!(" at row {r}"),
        (None, Some(c)) => format!(" at column {c}"),
        (None, None) => String::new(),
    }
}

impl GeometryError {
    pub fn configuration(
        row: Option<usize>,
        column: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            row,
            column,
            message: message.into(),
        }
    }

    pub fn data_gap(row: usize, column: Option<usize>, message: impl Into<String>) -> Self {
        Self::DataGap {
            row,
            column,
            message: message.into(),
        }
    }

    pub fn invariant(row: usize, message: impl Into<String>) -> Self {
        Self::GeometryInvariant {
            row,
            message: message.into(),
        }
    }

    /// Formation row the error is attributed to, if known
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Configuration { row, .. } => *row,
            Self::DataGap { row, .. } | Self::GeometryInvariant { row, .. } => Some(*row),
        }
    }

    /// Attach a row to a configuration error raised without one
    #[must_use]
    pub fn at_row(self, row: usize) -> Self {
        match self {
            Self::Configuration {
                row: None,
                column,
                message,
            } => Self::Configuration {
                row: Some(row),
                column,
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_location() {
        let e = GeometryError::configuration(Some(2), Some(4), "no void neighbour");
        assert_eq!(
            e.to_string(),
            "configuration error at row 2, column 4: no void neighbour"
        );
        let e = GeometryError::invariant(1, "distance decreases");
        assert_eq!(e.to_string(), "geometry invariant violated at row 1: distance decreases");
        let e = GeometryError::configuration(None, None, "bad");
        assert_eq!(e.to_string(), "configuration error: bad");
    }

    #[test]
    fn test_at_row_only_fills_missing_row() {
        let e = GeometryError::configuration(None, Some(1), "x").at_row(3);
        assert_eq!(e.row(), Some(3));
        let e = GeometryError::configuration(Some(1), None, "x").at_row(3);
        assert_eq!(e.row(), Some(1));
        let e = GeometryError::data_gap(5, None, "x").at_row(3);
        assert_eq!(e.row(), Some(5));
    }
}
