//! Transition table: every pinch/fade occurrence with its editable parameters
//!
//! Occurrences are listed per formation row in column order; a cell that
//! opens both ways yields its Left occurrence before its Right one. Each
//! carries a midpoint correction bounded by the two boreholes it spans and,
//! for fades, a tooth spec.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{resolve_direction, GeometryError};
use crate::types::{CorrectionEntry, Locations, Side, StyleCode, StyleGrid, ToothSpec, TransitionKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOccurrence {
    pub row: usize,
    pub column: usize,
    pub side: Side,
    pub kind: TransitionKind,
    pub correction: CorrectionEntry,
    /// Fades only
    pub teeth: Option<ToothSpec>,
    /// Display label, e.g. `W-3 Left`
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    rows: Vec<Vec<TransitionOccurrence>>,
}

impl TransitionTable {
    /// Enumerate occurrences from the style grid.
    ///
    /// `borehole_labels` names each column for display; cells whose
    /// direction cannot be resolved are skipped here and reported by the
    /// assembler for their row.
    pub fn from_styles(
        styles: &StyleGrid,
        locations: &Locations,
        borehole_labels: &[String],
        default_teeth: ToothSpec,
    ) -> Self {
        let columns = styles.column_count();
        let rows = (0..styles.formation_count())
            .map(|row| {
                let mut occurrences = Vec::new();
                for (column, &style) in styles.row(row).iter().enumerate() {
                    let kind = match style {
                        StyleCode::Pinch => TransitionKind::Pinch,
                        StyleCode::Fade => TransitionKind::Fade,
                        StyleCode::Normal | StyleCode::Connect | StyleCode::Null => continue,
                    };
                    let direction = match resolve_direction(styles.row(row), column) {
                        Ok(d) => d,
                        Err(e) => {
                            warn!(row, column, error = %e, "Skipping unresolvable transition");
                            continue;
                        }
                    };
                    for &side in direction.sides() {
                        let Some(neighbor) = side.neighbor(column, columns) else {
                            continue;
                        };
                        let (left, right) = match side {
                            Side::Left => (neighbor, column),
                            Side::Right => (column, neighbor),
                        };
                        let label = borehole_labels
                            .get(column)
                            .cloned()
                            .unwrap_or_else(|| (column + 1).to_string());
                        occurrences.push(TransitionOccurrence {
                            row,
                            column,
                            side,
                            kind,
                            correction: CorrectionEntry::centered(
                                locations.get(left),
                                locations.get(right),
                            ),
                            teeth: (kind == TransitionKind::Fade).then_some(default_teeth),
                            label: format!("W-{label} {side}"),
                        });
                    }
                }
                occurrences
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Occurrences of one formation row, in column order
    pub fn row(&self, row: usize) -> &[TransitionOccurrence] {
        self.rows.get(row).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransitionOccurrence> {
        self.rows.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    pub fn get(&self, row: usize, column: usize, side: Side) -> Option<&TransitionOccurrence> {
        self.row(row)
            .iter()
            .find(|o| o.column == column && o.side == side)
    }

    fn occurrence_mut(
        &mut self,
        row: usize,
        occurrence: usize,
    ) -> Result<&mut TransitionOccurrence, GeometryError> {
        self.rows
            .get_mut(row)
            .and_then(|r| r.get_mut(occurrence))
            .ok_or_else(|| {
                GeometryError::configuration(
                    Some(row),
                    None,
                    format!("no transition occurrence {occurrence}"),
                )
            })
    }

    /// Slider edit: move an occurrence's midpoint within its bounds
    pub fn set_midpoint(
        &mut self,
        row: usize,
        occurrence: usize,
        midpoint: f64,
    ) -> Result<(), GeometryError> {
        let occ = self.occurrence_mut(row, occurrence)?;
        let column = occ.column;
        occ.correction
            .set_midpoint(midpoint)
            .map_err(|e| match e {
                GeometryError::Configuration { message, .. } => {
                    GeometryError::configuration(Some(row), Some(column), message)
                }
                other => other,
            })
    }

    /// Keep earlier edits across a rebuild: an occurrence at the same
    /// (row, column, side) with the same kind and bounds takes over the
    /// previous midpoint and tooth spec.
    pub fn carry_over(&mut self, previous: &TransitionTable) {
        for occ in self.rows.iter_mut().flatten() {
            let Some(old) = previous.get(occ.row, occ.column, occ.side) else {
                continue;
            };
            let same_bounds = old.correction.left_bound == occ.correction.left_bound
                && old.correction.right_bound == occ.correction.right_bound;
            if old.kind == occ.kind && same_bounds {
                occ.correction = old.correction;
                occ.teeth = old.teeth;
            }
        }
    }

    /// Tooth-count edit for a fade occurrence (`n` teeth, at least 1)
    pub fn set_tooth_count(
        &mut self,
        row: usize,
        occurrence: usize,
        teeth: usize,
    ) -> Result<(), GeometryError> {
        let occ = self.occurrence_mut(row, occurrence)?;
        if occ.kind != TransitionKind::Fade {
            return Err(GeometryError::configuration(
                Some(row),
                Some(occ.column),
                format!("{} is a pinch and has no teeth", occ.label),
            ));
        }
        occ.teeth = Some(ToothSpec::from_tooth_count(teeth).map_err(|e| e.at_row(row))?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(row: &str) -> Vec<StyleCode> {
        row.chars().filter_map(StyleCode::from_code).collect()
    }

    fn table() -> TransitionTable {
        let styles = StyleGrid::new(vec![
            parse("nfnpn"),
            parse("xxxxp"),
            parse("xxxxx"),
        ])
        .unwrap();
        let locations = Locations::new(vec![0.0, 100.0, 200.0, 300.0, 400.0]).unwrap();
        let labels: Vec<String> = (1..=5).map(|i| i.to_string()).collect();
        TransitionTable::from_styles(&styles, &locations, &labels, ToothSpec::default())
    }

    #[test]
    fn test_both_yields_left_then_right() {
        let t = table();
        let row = t.row(0);
        assert_eq!(row.len(), 4);
        assert_eq!(row[0].label, "W-2 Left");
        assert_eq!(row[1].label, "W-2 Right");
        assert_eq!(row[0].correction, CorrectionEntry::centered(0.0, 100.0));
        assert_eq!(row[1].correction.midpoint, 150.0);
        assert_eq!(row[0].teeth, Some(ToothSpec::default()));
        assert_eq!(row[2].kind, TransitionKind::Pinch);
        assert_eq!(row[2].teeth, None);
    }

    #[test]
    fn test_unresolvable_cell_skipped() {
        // row 1 column 4 pinches with no null neighbour
        assert!(table().row(1).is_empty());
    }

    #[test]
    fn test_edits() {
        let mut t = table();
        t.set_midpoint(0, 1, 120.0).unwrap();
        assert_eq!(t.get(0, 1, Side::Right).unwrap().correction.midpoint, 120.0);
        assert!(matches!(
            t.set_midpoint(0, 1, 90.0),
            Err(GeometryError::Configuration { row: Some(0), column: Some(1), .. })
        ));
        t.set_tooth_count(0, 0, 2).unwrap();
        assert_eq!(t.row(0)[0].teeth, Some(ToothSpec::new(3, 1).unwrap()));
        assert!(t.set_tooth_count(0, 2, 2).is_err());
        assert!(t.set_tooth_count(0, 0, 0).is_err());
        assert!(t.set_midpoint(4, 0, 1.0).is_err());
    }

    #[test]
    fn test_carry_over_keeps_matching_edits() {
        let mut old = table();
        old.set_midpoint(0, 3, 350.0).unwrap();
        old.set_tooth_count(0, 0, 2).unwrap();
        let mut fresh = table();
        fresh.carry_over(&old);
        assert_eq!(fresh.get(0, 3, Side::Right).unwrap().correction.midpoint, 350.0);
        assert_eq!(fresh.row(0)[0].teeth, Some(ToothSpec::new(3, 1).unwrap()));
        assert_eq!(fresh.row(0)[1].teeth, Some(ToothSpec::default()));
    }
}
