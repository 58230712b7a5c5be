//! Style classification grid and per-borehole sample types

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryError;

// ============================================================================
// Style Codes
// ============================================================================

/// How a formation boundary behaves at one borehole.
///
/// Serialized as the single-letter codes used in borehole spreadsheets:
/// `x` normal, `p` pinch, `f` fade, `c` connect, `n` null.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum StyleCode {
    /// Formation present with a measured top
    #[default]
    #[serde(rename = "x", alias = "X", alias = "normal")]
    Normal,
    /// Formation thins to zero thickness toward a void neighbour
    #[serde(rename = "p", alias = "P", alias = "pinch")]
    Pinch,
    /// Formation interfingers (tooth pattern) toward a void neighbour
    #[serde(rename = "f", alias = "F", alias = "fade")]
    Fade,
    /// User-asserted linear boundary across a data gap
    #[serde(rename = "c", alias = "C", alias = "connect")]
    Connect,
    /// Formation absent at this borehole
    #[serde(rename = "n", alias = "N", alias = "null")]
    Null,
}

impl StyleCode {
    /// Parse a single-letter style code (case-insensitive).
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'x' => Some(Self::Normal),
            'p' => Some(Self::Pinch),
            'f' => Some(Self::Fade),
            'c' => Some(Self::Connect),
            'n' => Some(Self::Null),
            _ => None,
        }
    }

    /// Single-letter code
    pub const fn code(self) -> char {
        match self {
            Self::Normal => 'x',
            Self::Pinch => 'p',
            Self::Fade => 'f',
            Self::Connect => 'c',
            Self::Null => 'n',
        }
    }

    /// Pinch or fade: a cell that opens toward a void neighbour
    pub const fn is_transition(self) -> bool {
        matches!(self, Self::Pinch | Self::Fade)
    }
}

impl std::fmt::Display for StyleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleCode::Normal => write!(f, "Normal"),
            StyleCode::Pinch => write!(f, "Pinch"),
            StyleCode::Fade => write!(f, "Fade"),
            StyleCode::Connect => write!(f, "Connect"),
            StyleCode::Null => write!(f, "Null"),
        }
    }
}

// ============================================================================
// Style Grid
// ============================================================================

/// Formation × borehole style grid.
///
/// Rows are formations ordered top to bottom; the last row is the base
/// (total-depth) datum and never pinches or fades. Columns are boreholes
/// ordered by increasing distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleGrid {
    rows: Vec<Vec<StyleCode>>,
}

impl StyleGrid {
    /// Build a grid, checking that it is rectangular, has at least one
    /// formation above the base row and two boreholes, and that the base
    /// row is free of pinch/fade cells.
    pub fn new(rows: Vec<Vec<StyleCode>>) -> Result<Self, GeometryError> {
        if rows.len() < 2 {
            return Err(GeometryError::configuration(
                None,
                None,
                format!("style grid needs a formation and a base row, got {} row(s)", rows.len()),
            ));
        }
        let columns = rows[0].len();
        if columns < 2 {
            return Err(GeometryError::configuration(
                None,
                None,
                format!("style grid needs at least two boreholes, got {columns}"),
            ));
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns {
                return Err(GeometryError::configuration(
                    Some(row),
                    None,
                    format!("row has {} cells, expected {columns}", cells.len()),
                ));
            }
        }
        let base = rows.len() - 1;
        if let Some(column) = rows[base].iter().position(|s| s.is_transition()) {
            return Err(GeometryError::configuration(
                Some(base),
                Some(column),
                "base row cannot pinch or fade",
            ));
        }
        Ok(Self { rows })
    }

    /// Total rows including the base row
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of formation rows (everything above the base row)
    pub fn formation_count(&self) -> usize {
        self.rows.len() - 1
    }

    /// Index of the base (total-depth) row
    pub fn base_row(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn column_count(&self) -> usize {
        self.rows[0].len()
    }

    pub fn row(&self, row: usize) -> &[StyleCode] {
        &self.rows[row]
    }

    /// Style at (row, column); `None` when out of range
    pub fn get(&self, row: usize, column: usize) -> Option<StyleCode> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn rows(&self) -> &[Vec<StyleCode>] {
        &self.rows
    }

    /// Whether a row contains any pinch or fade cell
    pub fn has_transitions(&self, row: usize) -> bool {
        self.rows[row].iter().any(|s| s.is_transition())
    }

    /// Single-cell edit; the base row still cannot pinch or fade
    pub fn set(&mut self, row: usize, column: usize, style: StyleCode) -> Result<(), GeometryError> {
        if row == self.base_row() && style.is_transition() {
            return Err(GeometryError::configuration(
                Some(row),
                Some(column),
                "base row cannot pinch or fade",
            ));
        }
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or_else(|| GeometryError::configuration(Some(row), Some(column), "cell outside grid"))?;
        *cell = style;
        Ok(())
    }
}

// ============================================================================
// Sample Types
// ============================================================================

/// How a borehole was sampled; decides the contact line style
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SampleType {
    #[serde(rename = "CORE", alias = "core", alias = "Core")]
    Core,
    #[default]
    #[serde(rename = "CUTTINGS", alias = "cuttings", alias = "Cuttings")]
    Cuttings,
}

impl SampleType {
    /// Core samples draw solid contacts, cuttings draw dashed contacts
    pub const fn line_style(self) -> crate::types::LineStyle {
        match self {
            Self::Core => crate::types::LineStyle::Solid,
            Self::Cuttings => crate::types::LineStyle::Dashed,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleType::Core => write!(f, "CORE"),
            SampleType::Cuttings => write!(f, "CUTTINGS"),
        }
    }
}

/// Sample type per formation row and borehole.
///
/// Usually one value per borehole shared by all rows; a row may override it
/// when the sampling method changes at a particular contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleGrid {
    rows: Vec<Vec<SampleType>>,
}

impl SampleGrid {
    /// Same sample sequence for every row
    pub fn uniform(row_count: usize, per_borehole: Vec<SampleType>) -> Self {
        Self {
            rows: vec![per_borehole; row_count],
        }
    }

    /// Explicit per-row sample sequences; every row must be `columns` wide
    pub fn per_row(rows: Vec<Vec<SampleType>>, columns: usize) -> Result<Self, GeometryError> {
        if let Some(row) = rows.iter().position(|r| r.len() != columns) {
            return Err(GeometryError::configuration(
                Some(row),
                None,
                format!("sample row has {} entries, expected {columns}", rows[row].len()),
            ));
        }
        Ok(Self { rows })
    }

    pub fn get(&self, row: usize, column: usize) -> SampleType {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Replace one row's sequence (table edit)
    pub fn set_row(&mut self, row: usize, values: Vec<SampleType>) -> Result<(), GeometryError> {
        let columns = self.rows.first().map_or(values.len(), Vec::len);
        if values.len() != columns || row >= self.rows.len() {
            return Err(GeometryError::configuration(
                Some(row),
                None,
                "sample row edit does not match grid shape",
            ));
        }
        self.rows[row] = values;
        Ok(())
    }
}
