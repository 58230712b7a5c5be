//! Contact lines marking sample-type transitions along formation tops

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Core sample
    Solid,
    /// Cuttings sample
    Dashed,
}

impl LineStyle {
    pub const fn opposite(self) -> Self {
        match self {
            LineStyle::Solid => LineStyle::Dashed,
            LineStyle::Dashed => LineStyle::Solid,
        }
    }
}

impl std::fmt::Display for LineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineStyle::Solid => write!(f, "solid"),
            LineStyle::Dashed => write!(f, "dashed"),
        }
    }
}

/// One polyline along a formation top: an elevation row and a distance row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLine {
    /// Formation row whose top this line follows
    pub row: usize,
    pub style: LineStyle,
    pub elevations: Vec<f64>,
    pub distances: Vec<f64>,
}

impl ContactLine {
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        Some((*self.elevations.first()?, *self.distances.first()?))
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.elevations.last()?, *self.distances.last()?))
    }

    pub fn exaggerated(&self, vertical_exaggeration: f64) -> ContactLine {
        ContactLine {
            distances: self
                .distances
                .iter()
                .map(|d| d / vertical_exaggeration)
                .collect(),
            ..self.clone()
        }
    }
}

/// All contact lines of a section, split by style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactLines {
    pub solid: Vec<ContactLine>,
    pub dashed: Vec<ContactLine>,
}

impl ContactLines {
    /// File a line under its style; lines shorter than two points are dropped
    pub fn push(&mut self, line: ContactLine) {
        if line.len() < 2 {
            return;
        }
        match line.style {
            LineStyle::Solid => self.solid.push(line),
            LineStyle::Dashed => self.dashed.push(line),
        }
    }

    pub fn len(&self) -> usize {
        self.solid.len() + self.dashed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.dashed.is_empty()
    }

    /// Lines following one formation's top
    pub fn for_row(&self, row: usize) -> impl Iterator<Item = &ContactLine> {
        self.solid
            .iter()
            .chain(self.dashed.iter())
            .filter(move |l| l.row == row)
    }

    pub fn exaggerated(&self, vertical_exaggeration: f64) -> ContactLines {
        ContactLines {
            solid: self.solid.iter().map(|l| l.exaggerated(vertical_exaggeration)).collect(),
            dashed: self.dashed.iter().map(|l| l.exaggerated(vertical_exaggeration)).collect(),
        }
    }
}
