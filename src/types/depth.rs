//! Formation-top elevations and borehole locations

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryError;

// ============================================================================
// Depth Grid
// ============================================================================

/// Elevation of each formation top at each borehole.
///
/// Same shape as the style grid (base row included). `NaN` marks a
/// formation that is absent at that borehole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthGrid {
    rows: Vec<Vec<f64>>,
}

impl DepthGrid {
    /// Build from elevations that are already datum-referenced
    pub fn from_elevations(rows: Vec<Vec<f64>>) -> Result<Self, GeometryError> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().position(|r| r.len() != columns) {
            return Err(GeometryError::configuration(
                Some(row),
                None,
                format!("depth row has {} values, expected {columns}", rows[row].len()),
            ));
        }
        Ok(Self { rows })
    }

    /// Convert measured tops (depth below the borehole collar) into
    /// elevations using each borehole's surface elevation.
    pub fn from_measured_tops(
        tops: &[Vec<f64>],
        surface_elevations: &[f64],
    ) -> Result<Self, GeometryError> {
        let rows = tops
            .iter()
            .enumerate()
            .map(|(row, values)| {
                if values.len() != surface_elevations.len() {
                    return Err(GeometryError::configuration(
                        Some(row),
                        None,
                        format!(
                            "measured tops have {} values for {} boreholes",
                            values.len(),
                            surface_elevations.len()
                        ),
                    ));
                }
                Ok(values
                    .iter()
                    .zip(surface_elevations)
                    .map(|(top, surface)| surface - top)
                    .collect())
            })
            .collect::<Result<Vec<Vec<f64>>, _>>()?;
        Self::from_elevations(rows)
    }

    /// Elevation at (row, column), `None` when absent or out of range
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .filter(|v| v.is_finite())
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.rows[row]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Overwrite one cell (table edit). `NaN` marks the formation absent.
    pub fn set(&mut self, row: usize, column: usize, elevation: f64) -> Result<(), GeometryError> {
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or_else(|| {
                GeometryError::configuration(Some(row), Some(column), "depth edit out of range")
            })?;
        *cell = elevation;
        Ok(())
    }
}

// ============================================================================
// Locations
// ============================================================================

/// Horizontal distance of each borehole along the section line.
///
/// Strictly increasing, first value 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Locations(Vec<f64>);

impl Locations {
    pub fn new(distances: Vec<f64>) -> Result<Self, GeometryError> {
        if distances.len() < 2 {
            return Err(GeometryError::configuration(
                None,
                None,
                "a section needs at least two boreholes",
            ));
        }
        if distances[0] != 0.0 {
            return Err(GeometryError::configuration(
                None,
                Some(0),
                format!("first borehole must sit at distance 0, got {}", distances[0]),
            ));
        }
        for (column, pair) in distances.windows(2).enumerate() {
            if !pair[1].is_finite() || pair[1] <= pair[0] {
                return Err(GeometryError::configuration(
                    None,
                    Some(column + 1),
                    format!(
                        "borehole distances must strictly increase ({} then {})",
                        pair[0], pair[1]
                    ),
                ));
            }
        }
        Ok(Self(distances))
    }

    /// Cumulative distances from per-borehole spacings; the first spacing
    /// is ignored and the first borehole sits at 0.
    pub fn from_spacings(spacings: &[f64]) -> Result<Self, GeometryError> {
        let mut distances = Vec::with_capacity(spacings.len());
        let mut running = 0.0;
        for (i, spacing) in spacings.iter().enumerate() {
            if i > 0 {
                running += spacing;
            }
            distances.push(running);
        }
        Self::new(distances)
    }

    pub fn get(&self, column: usize) -> f64 {
        self.0[column]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distance of the last borehole
    pub fn total_length(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Spacing of each borehole from the previous one (first is 0)
    pub fn spacings(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.0.windows(2).map(|w| w[1] - w[0]))
            .collect()
    }
}

impl TryFrom<Vec<f64>> for Locations {
    type Error = GeometryError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Locations> for Vec<f64> {
    fn from(value: Locations) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_tops_become_elevations() {
        let grid = DepthGrid::from_measured_tops(
            &[vec![0.0, 10.0], vec![50.0, f64::NAN]],
            &[1000.0, 1010.0],
        )
        .unwrap();
        assert_eq!(grid.get(0, 0), Some(1000.0));
        assert_eq!(grid.get(0, 1), Some(1000.0));
        assert_eq!(grid.get(1, 0), Some(950.0));
        assert_eq!(grid.get(1, 1), None);
    }

    #[test]
    fn test_spacings_accumulate() {
        let loc = Locations::from_spacings(&[35.0, 100.0, 50.0]).unwrap();
        assert_eq!(loc.as_slice(), &[0.0, 100.0, 150.0]);
        assert_eq!(loc.total_length(), 150.0);
        assert_eq!(loc.spacings(), vec![0.0, 100.0, 50.0]);
    }

    #[test]
    fn test_locations_must_increase() {
        assert!(Locations::new(vec![0.0, 10.0, 10.0]).is_err());
        assert!(Locations::new(vec![5.0, 10.0]).is_err());
        assert!(Locations::new(vec![0.0]).is_err());
    }

    #[test]
    fn test_depth_edit_out_of_range() {
        let mut grid = DepthGrid::from_elevations(vec![vec![1.0, 2.0]]).unwrap();
        assert!(grid.set(0, 1, 5.0).is_ok());
        assert_eq!(grid.get(0, 1), Some(5.0));
        assert!(grid.set(2, 0, 5.0).is_err());
    }
}
