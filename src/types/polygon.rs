//! Formation polygons and their tabular export view

use serde::{Deserialize, Serialize};

/// Origin of a boundary point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// Measured (or connected) top at a borehole column
    Borehole(usize),
    /// Zero-thickness pinch apex
    Apex,
    /// Vertex of a fade's interlocking tooth pattern
    Tooth,
    /// Blocky cover over a neighbour's interlocking teeth
    Block,
    /// Point added where the row below connects across a data gap
    Connect,
}

/// One column of a formation polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub top: f64,
    pub bottom: f64,
    pub distance: f64,
    pub kind: PointKind,
}

impl BoundaryPoint {
    pub const fn new(top: f64, bottom: f64, distance: f64, kind: PointKind) -> Self {
        Self {
            top,
            bottom,
            distance,
            kind,
        }
    }

    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }
}

// ============================================================================
// Formation Polygon
// ============================================================================

/// Closed outline of one formation: trace `top` left to right, then
/// `bottom` right to left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationPolygon {
    pub row: usize,
    pub points: Vec<BoundaryPoint>,
}

impl FormationPolygon {
    pub fn new(row: usize, points: Vec<BoundaryPoint>) -> Self {
        Self { row, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.distance).collect()
    }

    pub fn tops(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.top).collect()
    }

    pub fn bottoms(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.bottom).collect()
    }

    /// The point measured at a borehole column, if the formation is present there
    pub fn borehole(&self, column: usize) -> Option<&BoundaryPoint> {
        self.points
            .iter()
            .find(|p| p.kind == PointKind::Borehole(column))
    }

    /// Points strictly between two distances, in polygon order
    pub fn between(&self, left: f64, right: f64) -> impl Iterator<Item = &BoundaryPoint> {
        self.points
            .iter()
            .filter(move |p| p.distance > left && p.distance < right)
    }

    /// Closed ring as `(distance, elevation)` pairs: tops forward, bottoms back
    pub fn outline(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.distance, p.top))
            .chain(self.points.iter().rev().map(|p| (p.distance, p.bottom)))
            .collect()
    }

    /// Split into independently closed pieces wherever an absent borehole
    /// lies between two consecutive points.
    pub fn chunks(&self, absent: &[f64]) -> Vec<FormationPolygon> {
        let mut pieces = Vec::new();
        let mut current: Vec<BoundaryPoint> = Vec::new();
        for point in &self.points {
            if let Some(last) = current.last() {
                let (lo, hi) = if last.distance <= point.distance {
                    (last.distance, point.distance)
                } else {
                    (point.distance, last.distance)
                };
                if absent.iter().any(|&a| a > lo && a < hi) {
                    pieces.push(FormationPolygon::new(self.row, std::mem::take(&mut current)));
                }
            }
            current.push(*point);
        }
        if !current.is_empty() {
            pieces.push(FormationPolygon::new(self.row, current));
        }
        pieces
    }

    /// Copy with distances divided by a vertical exaggeration factor
    pub fn exaggerated(&self, vertical_exaggeration: f64) -> FormationPolygon {
        FormationPolygon {
            row: self.row,
            points: self
                .points
                .iter()
                .map(|p| BoundaryPoint {
                    distance: p.distance / vertical_exaggeration,
                    ..*p
                })
                .collect(),
        }
    }

    pub fn to_table(&self) -> PolygonTable {
        PolygonTable {
            row: self.row,
            top: self.tops(),
            bottom: self.bottoms(),
            distance: self.distances(),
            kinds: self.points.iter().map(|p| p.kind).collect(),
        }
    }

    /// Rebuild from a (possibly edited) table; rows must be equally long
    pub fn from_table(table: &PolygonTable) -> Option<Self> {
        let n = table.distance.len();
        if table.top.len() != n || table.bottom.len() != n || table.kinds.len() != n {
            return None;
        }
        let points = (0..n)
            .map(|i| BoundaryPoint::new(table.top[i], table.bottom[i], table.distance[i], table.kinds[i]))
            .collect();
        Some(Self::new(table.row, points))
    }
}

/// Format-agnostic array view of a polygon for tabular display, editing and
/// spreadsheet/vector export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonTable {
    pub row: usize,
    pub top: Vec<f64>,
    pub bottom: Vec<f64>,
    pub distance: Vec<f64>,
    pub kinds: Vec<PointKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FormationPolygon {
        FormationPolygon::new(
            0,
            vec![
                BoundaryPoint::new(10.0, 5.0, 0.0, PointKind::Borehole(0)),
                BoundaryPoint::new(8.0, 8.0, 50.0, PointKind::Apex),
                BoundaryPoint::new(9.0, 4.0, 200.0, PointKind::Borehole(2)),
                BoundaryPoint::new(7.0, 3.0, 300.0, PointKind::Borehole(3)),
            ],
        )
    }

    #[test]
    fn test_outline_closes_back_along_bottom() {
        let ring = sample().outline();
        assert_eq!(ring.len(), 8);
        assert_eq!(ring[0], (0.0, 10.0));
        assert_eq!(ring[3], (300.0, 7.0));
        assert_eq!(ring[4], (300.0, 3.0));
        assert_eq!(ring[7], (0.0, 5.0));
    }

    #[test]
    fn test_chunks_split_at_absent_borehole() {
        let pieces = sample().chunks(&[100.0]);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 2);
        assert_eq!(pieces[1].len(), 2);
        assert_eq!(sample().chunks(&[]).len(), 1);
    }

    #[test]
    fn test_borehole_lookup() {
        let p = sample();
        assert_eq!(p.borehole(2).map(|b| b.top), Some(9.0));
        assert!(p.borehole(1).is_none());
        assert_eq!(p.between(0.0, 200.0).count(), 1);
    }

    #[test]
    fn test_exaggeration_scales_distance_only() {
        let scaled = sample().exaggerated(10.0);
        assert_eq!(scaled.distances(), vec![0.0, 5.0, 20.0, 30.0]);
        assert_eq!(scaled.tops(), sample().tops());
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let mut table = sample().to_table();
        table.top.pop();
        assert!(FormationPolygon::from_table(&table).is_none());
    }
}
