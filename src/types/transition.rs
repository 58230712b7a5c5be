//! Pinch/fade transition parameters: midpoint corrections and tooth specs

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryError;

/// Which side of its borehole a transition opens toward
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Neighbouring column on this side, `None` past the section edge
    pub fn neighbor(self, column: usize, columns: usize) -> Option<usize> {
        match self {
            Side::Left => column.checked_sub(1),
            Side::Right => (column + 1 < columns).then_some(column + 1),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Pinch,
    Fade,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::Pinch => write!(f, "Pinch"),
            TransitionKind::Fade => write!(f, "Fade"),
        }
    }
}

// ============================================================================
// Correction Entry
// ============================================================================

/// Where between two boreholes a transition point sits.
///
/// `midpoint` is user-adjustable within `[left_bound, right_bound]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub left_bound: f64,
    pub midpoint: f64,
    pub right_bound: f64,
}

impl CorrectionEntry {
    /// Midpoint defaults to the mean of the bounding borehole distances
    pub fn centered(left_bound: f64, right_bound: f64) -> Self {
        Self {
            left_bound,
            midpoint: (left_bound + right_bound) / 2.0,
            right_bound,
        }
    }

    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.left_bound && distance <= self.right_bound
    }

    /// Move the midpoint; rejects values outside the bounds
    pub fn set_midpoint(&mut self, midpoint: f64) -> Result<(), GeometryError> {
        if !midpoint.is_finite() || !self.contains(midpoint) {
            return Err(GeometryError::configuration(
                None,
                None,
                format!(
                    "midpoint {midpoint} outside [{}, {}]",
                    self.left_bound, self.right_bound
                ),
            ));
        }
        self.midpoint = midpoint;
        Ok(())
    }
}

// ============================================================================
// Tooth Spec
// ============================================================================

/// Interlock granularity of a fade: `sample_count` elevations spread over
/// `tile_count` repeated (midpoint, offset) pairs plus a closing midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToothSpec {
    pub sample_count: usize,
    pub tile_count: usize,
}

impl ToothSpec {
    pub fn new(sample_count: usize, tile_count: usize) -> Result<Self, GeometryError> {
        if sample_count != 2 * tile_count + 1 {
            return Err(GeometryError::configuration(
                None,
                None,
                format!(
                    "tooth spec ({sample_count}, {tile_count}) must have sample_count = 2 * tile_count + 1"
                ),
            ));
        }
        Ok(Self {
            sample_count,
            tile_count,
        })
    }

    /// `n` teeth → (2n - 1, n - 1)
    pub fn from_tooth_count(teeth: usize) -> Result<Self, GeometryError> {
        if teeth == 0 {
            return Err(GeometryError::configuration(
                None,
                None,
                "tooth count must be at least 1",
            ));
        }
        Self::new(2 * teeth - 1, teeth - 1)
    }

    pub fn tooth_count(&self) -> usize {
        self.tile_count + 1
    }
}

impl Default for ToothSpec {
    fn default() -> Self {
        let teeth = crate::config::defaults::TOOTH_COUNT;
        Self {
            sample_count: 2 * teeth - 1,
            tile_count: teeth - 1,
        }
    }
}
