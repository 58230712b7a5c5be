//! JSON render report: everything a plotting or vector-export tool needs,
//! in array form.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::geometry::TransitionOccurrence;
use crate::section::{BoreholeTick, CrossSection, SectionGeometry};
use crate::types::{ContactLines, PolygonTable};

#[derive(Debug, Clone, Serialize)]
pub struct FormationReport {
    pub name: String,
    pub color: String,
    pub polygon: Option<PolygonTable>,
    /// Pieces split at absent boreholes
    pub chunks: Vec<PolygonTable>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub vertical_exaggeration: f64,
    pub borehole_distances: Vec<f64>,
    pub formations: Vec<FormationReport>,
    pub contacts: ContactLines,
    pub ticks: Vec<BoreholeTick>,
    pub transitions: Vec<TransitionOccurrence>,
}

impl RenderReport {
    /// `geometry` should already be exaggerated when `vertical_exaggeration`
    /// is not 1.
    pub fn new(
        source: &str,
        section: &CrossSection,
        geometry: &SectionGeometry,
        vertical_exaggeration: f64,
    ) -> Self {
        let formations = geometry
            .formations
            .iter()
            .map(|f| FormationReport {
                name: f.name.clone(),
                color: f.color.clone(),
                polygon: f.polygon.as_ref().map(|p| p.to_table()),
                chunks: f.chunks().iter().map(|c| c.to_table()).collect(),
                error: f.error.as_ref().map(ToString::to_string),
            })
            .collect();
        Self {
            source: source.to_string(),
            generated_at: Utc::now(),
            vertical_exaggeration,
            borehole_distances: section
                .locations()
                .as_slice()
                .iter()
                .map(|d| d / vertical_exaggeration)
                .collect(),
            formations,
            contacts: geometry.contacts.clone(),
            ticks: geometry.ticks.clone(),
            transitions: section.transitions().iter().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize render report")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), formations = self.formations.len(), "Render report written");
        Ok(())
    }
}
