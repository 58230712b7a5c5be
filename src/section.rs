//! Cross-section: one dataset's inputs plus the full geometry rebuild
//!
//! A `CrossSection` owns the style/depth/sample grids, borehole locations and
//! the transition table. Every edit mutates those inputs only; `compute`
//! rebuilds all polygons and contact lines from scratch.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SectionConfig;
use crate::geometry::{
    build_contact_lines, GeometryError, PolygonAssembler, TransitionOccurrence, TransitionTable,
};
use crate::palette::Palette;
use crate::types::{
    ContactLines, DepthGrid, FormationPolygon, Locations, SampleGrid, SampleType, StyleCode,
    StyleGrid, ToothSpec,
};

// ============================================================================
// Inputs
// ============================================================================

/// Raw inputs for one cross-section, as produced by a loader.
///
/// `formation_names` has one entry per grid row; the last is the base row.
#[derive(Debug, Clone)]
pub struct SectionInputs {
    pub formation_names: Vec<String>,
    pub borehole_names: Vec<String>,
    pub surface_elevations: Vec<f64>,
    pub styles: StyleGrid,
    pub depths: DepthGrid,
    pub locations: Locations,
    pub samples: SampleGrid,
    /// Sample type each borehole reports unless a row overrides it
    pub borehole_samples: Vec<SampleType>,
}

#[derive(Debug, Clone)]
pub struct CrossSection {
    formation_names: Vec<String>,
    borehole_names: Vec<String>,
    surface_elevations: Vec<f64>,
    styles: StyleGrid,
    depths: DepthGrid,
    locations: Locations,
    samples: SampleGrid,
    borehole_samples: Vec<SampleType>,
    transitions: TransitionTable,
    default_teeth: ToothSpec,
}

impl CrossSection {
    /// Check that every input agrees on the grid shape and build the
    /// transition table with `default_teeth` for every fade.
    pub fn new(inputs: SectionInputs, default_teeth: ToothSpec) -> Result<Self, GeometryError> {
        let rows = inputs.styles.row_count();
        let columns = inputs.styles.column_count();
        let mismatch = |what: &str, got: usize, want: usize| {
            GeometryError::configuration(None, None, format!("{got} {what} for {want} expected"))
        };
        if inputs.formation_names.len() != rows {
            return Err(mismatch("formation names", inputs.formation_names.len(), rows));
        }
        if inputs.borehole_names.len() != columns {
            return Err(mismatch("borehole names", inputs.borehole_names.len(), columns));
        }
        if inputs.surface_elevations.len() != columns {
            return Err(mismatch("surface elevations", inputs.surface_elevations.len(), columns));
        }
        if inputs.borehole_samples.len() != columns {
            return Err(mismatch("borehole sample types", inputs.borehole_samples.len(), columns));
        }
        if inputs.samples.row_count() != rows {
            return Err(mismatch("sample rows", inputs.samples.row_count(), rows));
        }
        if inputs.depths.row_count() != rows || inputs.depths.column_count() != columns {
            return Err(GeometryError::configuration(
                None,
                None,
                format!(
                    "depth grid is {}x{} but style grid is {rows}x{columns}",
                    inputs.depths.row_count(),
                    inputs.depths.column_count()
                ),
            ));
        }
        if inputs.locations.len() != columns {
            return Err(mismatch("borehole locations", inputs.locations.len(), columns));
        }

        let transitions = TransitionTable::from_styles(
            &inputs.styles,
            &inputs.locations,
            &inputs.borehole_names,
            default_teeth,
        );
        Ok(Self {
            formation_names: inputs.formation_names,
            borehole_names: inputs.borehole_names,
            surface_elevations: inputs.surface_elevations,
            styles: inputs.styles,
            depths: inputs.depths,
            locations: inputs.locations,
            samples: inputs.samples,
            borehole_samples: inputs.borehole_samples,
            transitions,
            default_teeth,
        })
    }

    pub fn formation_names(&self) -> &[String] {
        &self.formation_names
    }

    pub fn borehole_names(&self) -> &[String] {
        &self.borehole_names
    }

    pub fn surface_elevations(&self) -> &[f64] {
        &self.surface_elevations
    }

    pub fn styles(&self) -> &StyleGrid {
        &self.styles
    }

    pub fn depths(&self) -> &DepthGrid {
        &self.depths
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    pub fn samples(&self) -> &SampleGrid {
        &self.samples
    }

    pub fn borehole_samples(&self) -> &[SampleType] {
        &self.borehole_samples
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn default_teeth(&self) -> ToothSpec {
        self.default_teeth
    }

    /// Row index of a formation by name
    pub fn formation_row(&self, name: &str) -> Option<usize> {
        self.formation_names.iter().position(|n| n == name)
    }

    // ------------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------------

    /// Change one style cell and rebuild the transition table, keeping the
    /// edits of occurrences that still exist with the same bounds.
    pub fn set_style(&mut self, row: usize, column: usize, style: StyleCode) -> Result<(), GeometryError> {
        self.styles.set(row, column, style)?;
        let mut transitions = TransitionTable::from_styles(
            &self.styles,
            &self.locations,
            &self.borehole_names,
            self.default_teeth,
        );
        transitions.carry_over(&self.transitions);
        self.transitions = transitions;
        Ok(())
    }

    /// Change one formation-top elevation (`NaN` removes it)
    pub fn set_elevation(&mut self, row: usize, column: usize, elevation: f64) -> Result<(), GeometryError> {
        self.depths.set(row, column, elevation)
    }

    pub fn set_samples(&mut self, row: usize, values: Vec<SampleType>) -> Result<(), GeometryError> {
        self.samples.set_row(row, values)
    }

    pub fn set_midpoint(&mut self, row: usize, occurrence: usize, midpoint: f64) -> Result<(), GeometryError> {
        self.transitions.set_midpoint(row, occurrence, midpoint)
    }

    pub fn set_tooth_count(&mut self, row: usize, occurrence: usize, teeth: usize) -> Result<(), GeometryError> {
        self.transitions.set_tooth_count(row, occurrence, teeth)
    }

    // ------------------------------------------------------------------------
    // Rebuild
    // ------------------------------------------------------------------------

    /// Rebuild every polygon, contact line and tick mark.
    ///
    /// Per-formation failures are kept next to the formation name; only a
    /// shape mismatch between the grids fails the whole section.
    pub fn compute(&self, config: &SectionConfig) -> Result<SectionGeometry, GeometryError> {
        let teeth_offset = config.teeth_offset(self.locations.total_length());
        let assembler = PolygonAssembler::new(
            &self.styles,
            &self.depths,
            &self.locations,
            &self.transitions,
            teeth_offset,
        )?;
        let mut rows = assembler.assemble().into_rows();

        if let Some(floor) = config.geometry.total_depth_floor {
            if let Some(Ok(base)) = rows.last_mut() {
                clamp_to_floor(base, floor);
            }
        }

        let polygons: Vec<Option<FormationPolygon>> =
            rows.iter().map(|r| r.as_ref().ok().cloned()).collect();
        let contacts = build_contact_lines(&polygons, &self.styles, &self.samples, &self.locations);

        let names = &self.formation_names[..self.styles.formation_count()];
        let colors = Palette::new(&config.palette).assign(names);

        let formations: Vec<FormationGeometry> = rows
            .into_iter()
            .zip(names.iter().zip(colors))
            .enumerate()
            .map(|(row, (result, (name, color)))| {
                let absent = self
                    .styles
                    .row(row)
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| **s == StyleCode::Null)
                    .map(|(c, _)| self.locations.get(c))
                    .collect();
                let (polygon, error) = match result {
                    Ok(p) => (Some(p), None),
                    Err(e) => (None, Some(e)),
                };
                FormationGeometry {
                    name: name.clone(),
                    color,
                    polygon,
                    error,
                    absent,
                }
            })
            .collect();

        let ticks = self.ticks(polygons.last().and_then(Option::as_ref));

        let failed = formations.iter().filter(|f| f.error.is_some()).count();
        info!(
            formations = formations.len(),
            failed,
            solid = contacts.solid.len(),
            dashed = contacts.dashed.len(),
            "Cross-section computed"
        );

        Ok(SectionGeometry {
            formations,
            contacts,
            ticks,
        })
    }

    /// Borehole tick marks from the surface down to the base formation's
    /// bottom (or the base row's elevation where the base formation is absent)
    fn ticks(&self, base: Option<&FormationPolygon>) -> Vec<BoreholeTick> {
        let base_row = self.styles.base_row();
        (0..self.styles.column_count())
            .map(|column| BoreholeTick {
                name: self.borehole_names[column].clone(),
                distance: self.locations.get(column),
                surface_elevation: self.surface_elevations[column],
                bottom: base
                    .and_then(|p| p.borehole(column))
                    .map(|p| p.bottom)
                    .or_else(|| self.depths.get(base_row, column)),
            })
            .collect()
    }
}

/// Raise base-formation bottoms that lie below the floor; tops below the
/// floor pull the bottom up with them so no point inverts.
fn clamp_to_floor(polygon: &mut FormationPolygon, floor: f64) {
    let mut clamped = 0;
    for p in &mut polygon.points {
        if p.bottom < floor {
            p.bottom = floor.min(p.top);
            clamped += 1;
        }
    }
    debug!(row = polygon.row, floor, clamped, "Base formation limited to total depth");
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormationGeometry {
    pub name: String,
    pub color: String,
    pub polygon: Option<FormationPolygon>,
    pub error: Option<GeometryError>,
    /// Distances of boreholes where the formation is absent
    pub absent: Vec<f64>,
}

impl FormationGeometry {
    /// Independently closed pieces, split at absent boreholes
    pub fn chunks(&self) -> Vec<FormationPolygon> {
        self.polygon
            .as_ref()
            .map(|p| p.chunks(&self.absent))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoreholeTick {
    pub name: String,
    pub distance: f64,
    pub surface_elevation: f64,
    pub bottom: Option<f64>,
}

/// Everything a renderer needs for one section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGeometry {
    pub formations: Vec<FormationGeometry>,
    pub contacts: ContactLines,
    pub ticks: Vec<BoreholeTick>,
}

impl SectionGeometry {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &GeometryError)> {
        self.formations
            .iter()
            .filter_map(|f| f.error.as_ref().map(|e| (f.name.as_str(), e)))
    }

    pub fn is_complete(&self) -> bool {
        self.formations.iter().all(|f| f.error.is_none())
    }

    /// Copy with every horizontal distance divided by `vertical_exaggeration`
    pub fn exaggerated(&self, vertical_exaggeration: f64) -> SectionGeometry {
        SectionGeometry {
            formations: self
                .formations
                .iter()
                .map(|f| FormationGeometry {
                    polygon: f.polygon.as_ref().map(|p| p.exaggerated(vertical_exaggeration)),
                    absent: f.absent.iter().map(|d| d / vertical_exaggeration).collect(),
                    ..f.clone()
                })
                .collect(),
            contacts: self.contacts.exaggerated(vertical_exaggeration),
            ticks: self
                .ticks
                .iter()
                .map(|t| BoreholeTick {
                    distance: t.distance / vertical_exaggeration,
                    ..t.clone()
                })
                .collect(),
        }
    }
}

/// Transition listing for display, e.g. `W-3 Left [100, 200] mid 150`
pub fn describe_occurrence(occurrence: &TransitionOccurrence) -> String {
    let c = occurrence.correction;
    let teeth = occurrence
        .teeth
        .map(|t| format!(" teeth {}", t.tooth_count()))
        .unwrap_or_default();
    format!(
        "{} {} [{}, {}] mid {}{teeth}",
        occurrence.label, occurrence.kind, c.left_bound, c.right_bound, c.midpoint
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    fn parse(row: &str) -> Vec<StyleCode> {
        row.chars().filter_map(StyleCode::from_code).collect()
    }

    fn section(styles: &[&str], depths: Vec<Vec<f64>>) -> CrossSection {
        let styles = StyleGrid::new(styles.iter().map(|s| parse(s)).collect()).unwrap();
        let rows = styles.row_count();
        let columns = styles.column_count();
        CrossSection::new(
            SectionInputs {
                formation_names: (0..rows).map(|r| format!("F{r}")).collect(),
                borehole_names: (1..=columns).map(|c| format!("B-{c}")).collect(),
                surface_elevations: vec![10.0; columns],
                depths: DepthGrid::from_elevations(depths).unwrap(),
                locations: Locations::new((0..columns).map(|c| c as f64 * 100.0).collect()).unwrap(),
                samples: SampleGrid::uniform(rows, vec![SampleType::Core; columns]),
                borehole_samples: vec![SampleType::Core; columns],
                styles,
            },
            ToothSpec::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sample_edit_changes_contact_styles() {
        let mut s = section(
            &["xxx", "xxx", "xxx"],
            vec![vec![0.0; 3], vec![-10.0; 3], vec![-30.0; 3]],
        );
        let config = SectionConfig::default();
        assert!(s.compute(&config).unwrap().contacts.dashed.is_empty());

        s.set_samples(0, vec![SampleType::Core, SampleType::Cuttings, SampleType::Cuttings])
            .unwrap();
        let g = s.compute(&config).unwrap();
        assert_eq!(g.contacts.dashed.len(), 2);
        assert!(g.contacts.dashed.iter().all(|l| l.row == 0));
        assert!(s.set_samples(0, vec![SampleType::Core]).is_err());
    }

    #[test]
    fn test_total_depth_floor_clamps_base_bottoms() {
        let s = section(
            &["xxx", "xxx", "xxx"],
            vec![vec![0.0; 3], vec![-10.0; 3], vec![-50.0, -20.0, -50.0]],
        );
        let mut config = SectionConfig::default();
        config.geometry.total_depth_floor = Some(-30.0);
        let g = s.compute(&config).unwrap();
        let base = g.formations[1].polygon.as_ref().unwrap();
        assert_eq!(base.bottoms(), vec![-30.0, -20.0, -30.0]);

        // Lifting the floor restores the measured base
        config.geometry.total_depth_floor = None;
        let g = s.compute(&config).unwrap();
        assert_eq!(g.formations[1].polygon.as_ref().unwrap().bottoms(), vec![-50.0, -20.0, -50.0]);
    }

    #[test]
    fn test_ticks_run_to_base_bottom() {
        let s = section(&["xxx", "xxx"], vec![vec![0.0; 3], vec![-10.0, -12.0, -14.0]]);
        let g = s.compute(&SectionConfig::default()).unwrap();
        let bottoms: Vec<Option<f64>> = g.ticks.iter().map(|t| t.bottom).collect();
        assert_eq!(bottoms, vec![Some(-10.0), Some(-12.0), Some(-14.0)]);
        assert_eq!(g.ticks[2].name, "B-3");
        assert_eq!(g.ticks[2].surface_elevation, 10.0);
    }

    #[test]
    fn test_chunks_split_at_absent_boreholes() {
        let s = section(
            &["xpnpx", "xxxxx"],
            vec![vec![0.0, 0.0, NAN, 0.0, 0.0], vec![-10.0; 5]],
        );
        let g = s.compute(&SectionConfig::default()).unwrap();
        assert!(g.is_complete());
        let chunks = g.formations[0].chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].distances(), vec![0.0, 100.0, 150.0]);
        assert_eq!(chunks[1].distances(), vec![250.0, 300.0, 400.0]);
    }

    #[test]
    fn test_failures_carry_formation_name() {
        let s = section(&["xpx", "xxx"], vec![vec![0.0; 3], vec![-10.0; 3]]);
        let g = s.compute(&SectionConfig::default()).unwrap();
        let failures: Vec<_> = g.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "F0");
        assert!(matches!(failures[0].1, GeometryError::Configuration { .. }));
    }

    #[test]
    fn test_style_edit_keeps_surviving_adjustments() {
        let mut s = section(
            &["xpnpx", "xxxxx", "xxxxx"],
            vec![vec![0.0, 0.0, NAN, 0.0, 0.0], vec![-10.0; 5], vec![-20.0; 5]],
        );
        s.set_midpoint(0, 0, 120.0).unwrap();
        s.set_style(0, 3, StyleCode::Fade).unwrap();
        let row = s.transitions().row(0);
        assert_eq!(row[0].correction.midpoint, 120.0);
        assert_eq!(row[1].kind, crate::types::TransitionKind::Fade);
        assert!(s.set_style(2, 0, StyleCode::Pinch).is_err());
    }

    #[test]
    fn test_exaggeration_divides_distances() {
        let s = section(&["xx", "xx"], vec![vec![0.0; 2], vec![-10.0; 2]]);
        let g = s.compute(&SectionConfig::default()).unwrap().exaggerated(10.0);
        assert_eq!(g.formations[0].polygon.as_ref().unwrap().distances(), vec![0.0, 10.0]);
        assert_eq!(g.ticks[1].distance, 10.0);
    }
}
