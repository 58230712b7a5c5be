//! TOML dataset files: boreholes, formation tops and style codes
//!
//! ```toml
//! [[borehole]]
//! name = "B-1"
//! spacing = 0.0            # distance from the previous borehole
//! surface_elevation = 120.0
//! sample_type = "CORE"     # or "CUTTINGS"
//!
//! [[formation]]
//! name = "Qal"
//! tops = [0.0, 0.0, nan]   # measured below surface, nan = absent
//! styles = "xxn"           # x p f c n, one letter per borehole
//!
//! [[adjustment]]           # optional replayed edits
//! formation = "Qal"
//! occurrence = 0
//! midpoint = 150.0
//! teeth = 3
//! ```
//!
//! The last `[[formation]]` is the base (total depth) row.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SectionConfig;
use crate::geometry::GeometryError;
use crate::section::{CrossSection, SectionInputs};
use crate::types::{DepthGrid, Locations, SampleGrid, SampleType, StyleCode, StyleGrid, ToothSpec};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("dataset serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("formation '{formation}': {message}")]
    Shape { formation: String, message: String },

    #[error("formation '{formation}': unknown style code '{code}' (expected one of x p f c n)")]
    UnknownStyle { formation: String, code: char },

    #[error("adjustment refers to unknown formation '{0}'")]
    UnknownFormation(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

// ============================================================================
// File Schema
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoreholeEntry {
    pub name: String,
    /// Distance from the previous borehole; ignored for the first
    #[serde(default)]
    pub spacing: f64,
    pub surface_elevation: f64,
    #[serde(default)]
    pub sample_type: SampleType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationEntry {
    pub name: String,
    /// Measured depth below surface per borehole; `nan` where absent
    pub tops: Vec<f64>,
    pub styles: String,
    /// Per-borehole override of the borehole sample types for this row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_types: Option<Vec<SampleType>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    pub formation: String,
    /// Index into the formation's transition occurrences
    pub occurrence: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midpoint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teeth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(rename = "borehole")]
    pub boreholes: Vec<BoreholeEntry>,
    #[serde(rename = "formation")]
    pub formations: Vec<FormationEntry>,
    #[serde(rename = "adjustment", default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<AdjustmentEntry>,
}

impl DatasetFile {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            boreholes = file.boreholes.len(),
            formations = file.formations.len(),
            "Dataset loaded"
        );
        Ok(file)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, DatasetError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String, DatasetError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        std::fs::write(path, self.to_toml()?).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Dataset saved");
        Ok(())
    }

    /// Build the cross-section: cumulative locations, elevations from
    /// measured tops, parsed style codes, then replay adjustments.
    pub fn into_section(&self, config: &SectionConfig) -> Result<CrossSection, DatasetError> {
        let columns = self.boreholes.len();

        let mut styles = Vec::with_capacity(self.formations.len());
        let mut tops = Vec::with_capacity(self.formations.len());
        let mut samples = Vec::with_capacity(self.formations.len());
        let default_samples: Vec<SampleType> =
            self.boreholes.iter().map(|b| b.sample_type).collect();

        for formation in &self.formations {
            let shape = |message: String| DatasetError::Shape {
                formation: formation.name.clone(),
                message,
            };
            if formation.tops.len() != columns {
                return Err(shape(format!(
                    "{} tops for {columns} boreholes",
                    formation.tops.len()
                )));
            }
            let row = parse_styles(&formation.name, &formation.styles)?;
            if row.len() != columns {
                return Err(shape(format!(
                    "{} style codes for {columns} boreholes",
                    row.len()
                )));
            }
            let row_samples = match &formation.sample_types {
                Some(s) if s.len() != columns => {
                    return Err(shape(format!(
                        "{} sample types for {columns} boreholes",
                        s.len()
                    )));
                }
                Some(s) => s.clone(),
                None => default_samples.clone(),
            };
            styles.push(row);
            tops.push(formation.tops.clone());
            samples.push(row_samples);
        }

        let spacings: Vec<f64> = self.boreholes.iter().map(|b| b.spacing).collect();
        let surface_elevations: Vec<f64> =
            self.boreholes.iter().map(|b| b.surface_elevation).collect();

        let inputs = SectionInputs {
            formation_names: self.formations.iter().map(|f| f.name.clone()).collect(),
            borehole_names: self.boreholes.iter().map(|b| b.name.clone()).collect(),
            styles: StyleGrid::new(styles)?,
            depths: DepthGrid::from_measured_tops(&tops, &surface_elevations)?,
            locations: Locations::from_spacings(&spacings)?,
            samples: SampleGrid::per_row(samples, columns)?,
            borehole_samples: default_samples,
            surface_elevations,
        };
        let teeth = ToothSpec::from_tooth_count(config.geometry.default_tooth_count)?;
        let mut section = CrossSection::new(inputs, teeth)?;

        for adjustment in &self.adjustments {
            let row = section
                .formation_row(&adjustment.formation)
                .ok_or_else(|| DatasetError::UnknownFormation(adjustment.formation.clone()))?;
            if let Some(midpoint) = adjustment.midpoint {
                section.set_midpoint(row, adjustment.occurrence, midpoint)?;
            }
            if let Some(teeth) = adjustment.teeth {
                section.set_tooth_count(row, adjustment.occurrence, teeth)?;
            }
            debug!(formation = %adjustment.formation, occurrence = adjustment.occurrence, "Adjustment applied");
        }

        Ok(section)
    }

    /// Write a section back into the file schema, recording every
    /// occurrence that differs from its defaults as an adjustment.
    pub fn from_section(section: &CrossSection) -> Self {
        let styles = section.styles();
        let depths = section.depths();
        let surface = section.surface_elevations();
        let samples = section.samples();
        let borehole_samples = section.borehole_samples();
        let columns = styles.column_count();

        let boreholes = section
            .borehole_names()
            .iter()
            .zip(section.locations().spacings())
            .enumerate()
            .map(|(column, (name, spacing))| BoreholeEntry {
                name: name.clone(),
                spacing,
                surface_elevation: surface[column],
                sample_type: borehole_samples[column],
            })
            .collect::<Vec<_>>();

        let formations = section
            .formation_names()
            .iter()
            .enumerate()
            .map(|(row, name)| {
                let row_samples: Vec<SampleType> = (0..columns).map(|c| samples.get(row, c)).collect();
                let uniform = row_samples
                    .iter()
                    .zip(&boreholes)
                    .all(|(s, b)| *s == b.sample_type);
                FormationEntry {
                    name: name.clone(),
                    tops: (0..columns)
                        .map(|c| depths.get(row, c).map_or(f64::NAN, |e| surface[c] - e))
                        .collect(),
                    styles: styles.row(row).iter().map(|s| s.code()).collect(),
                    sample_types: (!uniform).then_some(row_samples),
                }
            })
            .collect();

        let default_teeth = section.default_teeth();
        let adjustments = (0..styles.formation_count())
            .flat_map(|row| {
                section
                    .transitions()
                    .row(row)
                    .iter()
                    .enumerate()
                    .filter_map(move |(occurrence, occ)| {
                        let c = occ.correction;
                        let centered = (c.left_bound + c.right_bound) / 2.0;
                        let midpoint = (c.midpoint != centered).then_some(c.midpoint);
                        let teeth = occ
                            .teeth
                            .filter(|t| *t != default_teeth)
                            .map(|t| t.tooth_count());
                        (midpoint.is_some() || teeth.is_some()).then(|| AdjustmentEntry {
                            formation: section.formation_names()[row].clone(),
                            occurrence,
                            midpoint,
                            teeth,
                        })
                    })
            })
            .collect();

        Self {
            boreholes,
            formations,
            adjustments,
        }
    }
}

fn parse_styles(formation: &str, codes: &str) -> Result<Vec<StyleCode>, DatasetError> {
    codes
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|code| {
            StyleCode::from_code(code).ok_or_else(|| DatasetError::UnknownStyle {
                formation: formation.to_string(),
                code,
            })
        })
        .collect()
}

/// Load a dataset file and build its cross-section in one step
pub fn load_section(path: &Path, config: &SectionConfig) -> Result<CrossSection, DatasetError> {
    DatasetFile::load(path)?.into_section(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[borehole]]
name = "B-1"
spacing = 0.0
surface_elevation = 100.0
sample_type = "CORE"

[[borehole]]
name = "B-2"
spacing = 100.0
surface_elevation = 110.0
sample_type = "CUTTINGS"

[[borehole]]
name = "B-3"
spacing = 100.0
surface_elevation = 120.0

[[formation]]
name = "Qal"
tops = [0.0, 0.0, 0.0]
styles = "xpn"

[[formation]]
name = "Tc"
tops = [10.0, 10.0, 10.0]
styles = "x x x"
sample_types = ["CORE", "CORE", "CORE"]

[[formation]]
name = "TD"
tops = [50.0, 60.0, 70.0]
styles = "xxx"

[[adjustment]]
formation = "Qal"
occurrence = 0
midpoint = 160.0
"#;

    #[test]
    fn test_parse_sample_dataset() {
        let file = DatasetFile::from_toml_str(SAMPLE).unwrap();
        assert_eq!(file.boreholes.len(), 3);
        assert_eq!(file.boreholes[2].sample_type, SampleType::Cuttings);
        let section = file.into_section(&SectionConfig::default()).unwrap();
        assert_eq!(section.locations().as_slice(), &[0.0, 100.0, 200.0]);
        assert_eq!(section.depths().get(1, 2), Some(110.0));
        assert_eq!(section.samples().get(0, 0), SampleType::Core);
        assert_eq!(section.samples().get(1, 1), SampleType::Core);
        assert_eq!(section.transitions().row(0)[0].correction.midpoint, 160.0);
    }

    #[test]
    fn test_nan_top_is_absent() {
        let text = SAMPLE.replace("tops = [0.0, 0.0, 0.0]", "tops = [0.0, 0.0, nan]");
        let section = DatasetFile::from_toml_str(&text)
            .unwrap()
            .into_section(&SectionConfig::default())
            .unwrap();
        assert_eq!(section.depths().get(0, 2), None);
    }

    #[test]
    fn test_unknown_style_code() {
        let text = SAMPLE.replace("styles = \"xpn\"", "styles = \"xqn\"");
        let err = DatasetFile::from_toml_str(&text)
            .unwrap()
            .into_section(&SectionConfig::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::UnknownStyle { code: 'q', .. }));
    }

    #[test]
    fn test_short_row_is_shape_error() {
        let text = SAMPLE.replace("tops = [10.0, 10.0, 10.0]", "tops = [10.0, 10.0]");
        let err = DatasetFile::from_toml_str(&text)
            .unwrap()
            .into_section(&SectionConfig::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Shape { ref formation, .. } if formation == "Tc"));
    }

    #[test]
    fn test_adjustment_outside_bounds_is_geometry_error() {
        let text = SAMPLE.replace("midpoint = 160.0", "midpoint = 20.0");
        let err = DatasetFile::from_toml_str(&text)
            .unwrap()
            .into_section(&SectionConfig::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Geometry(GeometryError::Configuration { .. })));
    }

    #[test]
    fn test_unknown_adjustment_formation() {
        let text = SAMPLE.replace("formation = \"Qal\"", "formation = \"Nope\"");
        let err = DatasetFile::from_toml_str(&text)
            .unwrap()
            .into_section(&SectionConfig::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::UnknownFormation(ref n) if n == "Nope"));
    }

    #[test]
    fn test_first_row_override_keeps_borehole_defaults() {
        let text = SAMPLE.replace(
            "styles = \"xpn\"",
            "styles = \"xpn\"\nsample_types = [\"CUTTINGS\", \"CORE\", \"CORE\"]",
        );
        let file = DatasetFile::from_toml_str(&text).unwrap();
        let section = file.into_section(&SectionConfig::default()).unwrap();
        let back = DatasetFile::from_section(&section);

        let defaults: Vec<SampleType> = back.boreholes.iter().map(|b| b.sample_type).collect();
        assert_eq!(
            defaults,
            vec![SampleType::Core, SampleType::Cuttings, SampleType::Cuttings]
        );
        assert_eq!(
            back.formations[0].sample_types,
            Some(vec![SampleType::Cuttings, SampleType::Core, SampleType::Core])
        );
        assert!(back.formations[2].sample_types.is_none());
    }

    #[test]
    fn test_section_writes_back_to_same_schema() {
        let file = DatasetFile::from_toml_str(SAMPLE).unwrap();
        let section = file.into_section(&SectionConfig::default()).unwrap();
        let back = DatasetFile::from_section(&section);
        assert_eq!(back.formations[0].styles, "xpn");
        assert_eq!(back.formations[1].styles, "xxx");
        assert_eq!(back.formations[2].tops, vec![50.0, 60.0, 70.0]);
        assert_eq!(back.boreholes[1].spacing, 100.0);
        assert!(back.formations[0].sample_types.is_none());
        assert!(back.formations[1].sample_types.is_some());
        assert_eq!(back.adjustments.len(), 1);
        assert_eq!(back.adjustments[0].midpoint, Some(160.0));

        let rebuilt = DatasetFile::from_toml_str(&back.to_toml().unwrap())
            .unwrap()
            .into_section(&SectionConfig::default())
            .unwrap();
        assert_eq!(rebuilt.depths(), section.depths());
        assert_eq!(rebuilt.transitions(), section.transitions());
    }
}
