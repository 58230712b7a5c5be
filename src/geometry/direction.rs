//! Direction resolution for pinch/fade cells

use serde::{Deserialize, Serialize};

use super::GeometryError;
use crate::types::{Side, StyleCode};

/// Side(s) toward which a pinch/fade cell opens: the side(s) with a void
/// (`null`) neighbour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Both,
}

impl Direction {
    /// Sides in left-to-right order
    pub const fn sides(self) -> &'static [Side] {
        match self {
            Direction::Left => &[Side::Left],
            Direction::Right => &[Side::Right],
            Direction::Both => &[Side::Left, Side::Right],
        }
    }

    pub const fn opens(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Direction::Both, _) | (Direction::Left, Side::Left) | (Direction::Right, Side::Right)
        )
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Both => write!(f, "both"),
        }
    }
}

/// Classify the open side of the pinch/fade cell at `column`.
///
/// Only immediate neighbours are inspected; a missing neighbour at the
/// section edge never counts as void. A cell with no void neighbour has no
/// open side and is rejected.
pub fn resolve_direction(row: &[StyleCode], column: usize) -> Result<Direction, GeometryError> {
    if column >= row.len() {
        return Err(GeometryError::configuration(
            None,
            Some(column),
            format!("column outside a row of {} boreholes", row.len()),
        ));
    }
    let void = |c: Option<usize>| c.and_then(|c| row.get(c)) == Some(&StyleCode::Null);
    let left = void(column.checked_sub(1));
    let right = void(Some(column + 1));

    match (left, right) {
        (true, true) => Ok(Direction::Both),
        (true, false) => Ok(Direction::Left),
        (false, true) => Ok(Direction::Right),
        (false, false) => Err(GeometryError::configuration(
            None,
            Some(column),
            format!("{} cell has no null neighbour to open toward", row[column]),
        )),
    }
}
