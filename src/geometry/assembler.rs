//! Bottom-up formation polygon assembly
//!
//! Each formation row starts from its initial polygon (top elevation plus the
//! first defined elevation beneath it, per borehole). Rows are processed from
//! the deepest formation upward so a row can read the finished polygon of the
//! row below. Synthetic points (pinch apexes, fade tooth runs, interlock
//! blocks, connect inserts) are collected as groups keyed by distance, sorted
//! once and frozen into the final point list.

use tracing::{debug, warn};

use super::{
    elevation_at, find_anchor, pinch_apex, resolve_direction, teeth_point, tooth_pattern,
    DepthSource, FadeProfile, GeometryError, TransitionOccurrence, TransitionTable,
};
use crate::types::{
    BoundaryPoint, DepthGrid, FormationPolygon, Locations, PointKind, Side, StyleCode, StyleGrid,
    TransitionKind,
};

// ============================================================================
// Initial Polygon
// ============================================================================

/// Raw top/bottom pair at one borehole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialCell {
    pub top: f64,
    pub bottom: f64,
}

impl InitialCell {
    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }
}

/// Per-borehole top/bottom pairs of one formation before any style handling.
/// `None` where the formation has no top.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialPolygon {
    pub row: usize,
    pub cells: Vec<Option<InitialCell>>,
}

impl InitialPolygon {
    pub fn cell(&self, column: usize) -> Option<InitialCell> {
        self.cells.get(column).copied().flatten()
    }
}

// ============================================================================
// Assembly Result
// ============================================================================

/// Outcome of one full assembly: a polygon or an isolated error per
/// formation row.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    rows: Vec<Result<FormationPolygon, GeometryError>>,
}

impl Assembly {
    pub fn rows(&self) -> &[Result<FormationPolygon, GeometryError>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Result<FormationPolygon, GeometryError>> {
        self.rows
    }

    pub fn polygon(&self, row: usize) -> Option<&FormationPolygon> {
        self.rows.get(row).and_then(|r| r.as_ref().ok())
    }

    /// Successfully built polygons, top formation first
    pub fn polygons(&self) -> impl Iterator<Item = &FormationPolygon> {
        self.rows.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &GeometryError> {
        self.rows.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(Result::is_ok)
    }

    /// Per-row polygons with failed rows as `None`
    pub fn to_options(&self) -> Vec<Option<FormationPolygon>> {
        self.rows.iter().map(|r| r.as_ref().ok().cloned()).collect()
    }
}

// ============================================================================
// Point Groups
// ============================================================================

/// Candidate points sharing one sort key. Transition groups opening left sort
/// before a borehole at the same distance, those opening right after it.
#[derive(Debug, Clone)]
struct PointGroup {
    anchor: f64,
    bias: i8,
    points: Vec<BoundaryPoint>,
    /// Allowed distance range for tooth points
    bounds: Option<(f64, f64)>,
}

impl PointGroup {
    fn single(point: BoundaryPoint, bias: i8) -> Self {
        Self {
            anchor: point.distance,
            bias,
            points: vec![point],
            bounds: None,
        }
    }
}

const fn side_bias(side: Side) -> i8 {
    match side {
        Side::Left => -1,
        Side::Right => 1,
    }
}

/// Sort groups by (distance, bias), flatten and check the result.
fn freeze(row: usize, mut groups: Vec<PointGroup>) -> Result<FormationPolygon, GeometryError> {
    groups.sort_by(|a, b| a.anchor.total_cmp(&b.anchor).then(a.bias.cmp(&b.bias)));

    for group in &groups {
        if let Some((lo, hi)) = group.bounds {
            if let Some(p) = group.points.iter().find(|p| p.distance < lo || p.distance > hi) {
                return Err(GeometryError::invariant(
                    row,
                    format!("tooth at distance {} outside [{lo}, {hi}]", p.distance),
                ));
            }
        }
    }

    let points: Vec<BoundaryPoint> = groups.into_iter().flat_map(|g| g.points).collect();
    check_invariants(row, &points)?;
    Ok(FormationPolygon::new(row, points))
}

/// Finite values, non-decreasing distance across non-tooth points, and
/// at least two points in any non-empty polygon.
pub fn check_invariants(row: usize, points: &[BoundaryPoint]) -> Result<(), GeometryError> {
    if let Some(p) = points
        .iter()
        .find(|p| !(p.top.is_finite() && p.bottom.is_finite() && p.distance.is_finite()))
    {
        return Err(GeometryError::invariant(
            row,
            format!("non-finite point {:?} at distance {}", p.kind, p.distance),
        ));
    }
    if points.len() == 1 {
        return Err(GeometryError::invariant(
            row,
            "a single point cannot close a polygon",
        ));
    }
    let mut last: Option<f64> = None;
    for p in points.iter().filter(|p| p.kind != PointKind::Tooth) {
        if let Some(prev) = last {
            if p.distance < prev {
                return Err(GeometryError::invariant(
                    row,
                    format!("distance decreases from {prev} to {}", p.distance),
                ));
            }
        }
        last = Some(p.distance);
    }
    Ok(())
}

// ============================================================================
// Assembler
// ============================================================================

/// Builds every formation polygon of one section.
///
/// Construction is sequential and side-effect free; calling `assemble`
/// twice on the same inputs gives identical polygons.
pub struct PolygonAssembler<'a> {
    styles: &'a StyleGrid,
    depths: &'a DepthGrid,
    locations: &'a Locations,
    transitions: &'a TransitionTable,
    teeth_offset: f64,
}

/// Depth lookups during assembly: finished polygons where available,
/// the depth grid for failed rows, connected base values for the base row.
struct AssemblyDepths<'s, 'a> {
    assembler: &'s PolygonAssembler<'a>,
    built: &'s [Option<FormationPolygon>],
}

impl DepthSource for AssemblyDepths<'_, '_> {
    fn top(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.assembler.styles.base_row() {
            return self.assembler.base_elevation(column);
        }
        match self.built.get(row).and_then(Option::as_ref) {
            Some(polygon) => polygon.borehole(column).map(|p| p.top),
            None => self.assembler.depths.get(row, column),
        }
    }

    fn row_count(&self) -> usize {
        self.assembler.styles.row_count()
    }
}

impl<'a> PolygonAssembler<'a> {
    /// Check that the grids agree in shape before any row is built
    pub fn new(
        styles: &'a StyleGrid,
        depths: &'a DepthGrid,
        locations: &'a Locations,
        transitions: &'a TransitionTable,
        teeth_offset: f64,
    ) -> Result<Self, GeometryError> {
        if depths.row_count() != styles.row_count() || depths.column_count() != styles.column_count()
        {
            return Err(GeometryError::configuration(
                None,
                None,
                format!(
                    "depth grid is {}x{} but style grid is {}x{}",
                    depths.row_count(),
                    depths.column_count(),
                    styles.row_count(),
                    styles.column_count()
                ),
            ));
        }
        if locations.len() != styles.column_count() {
            return Err(GeometryError::configuration(
                None,
                None,
                format!(
                    "{} borehole locations for {} style columns",
                    locations.len(),
                    styles.column_count()
                ),
            ));
        }
        if !(teeth_offset.is_finite() && teeth_offset >= 0.0) {
            return Err(GeometryError::configuration(
                None,
                None,
                format!("teeth offset must be a non-negative distance, got {teeth_offset}"),
            ));
        }
        Ok(Self {
            styles,
            depths,
            locations,
            transitions,
            teeth_offset,
        })
    }

    fn x(&self, column: usize) -> f64 {
        self.locations.get(column)
    }

    fn columns(&self) -> usize {
        self.styles.column_count()
    }

    /// Base-row elevation; a connect cell in the base row is interpolated
    /// between the nearest defined base values on either side.
    pub fn base_elevation(&self, column: usize) -> Option<f64> {
        let base = self.styles.base_row();
        if let Some(v) = self.depths.get(base, column) {
            return Some(v);
        }
        if self.styles.get(base, column) != Some(StyleCode::Connect) {
            return None;
        }
        let left = (0..column).rev().find_map(|c| self.depths.get(base, c).map(|v| (c, v)))?;
        let right = (column + 1..self.columns())
            .find_map(|c| self.depths.get(base, c).map(|v| (c, v)))?;
        elevation_at(left.1, self.x(left.0), right.1, self.x(right.0), self.x(column)).ok()
    }

    /// Top = the row's elevation; bottom = the first defined elevation below
    /// it in the same column, searched down to the base row.
    pub fn initial_polygon(&self, row: usize) -> Result<InitialPolygon, GeometryError> {
        let base = self.styles.base_row();
        let cells = (0..self.columns())
            .map(|column| {
                let Some(top) = self.depths.get(row, column) else {
                    return Ok(None);
                };
                let bottom = (row + 1..base)
                    .find_map(|below| self.depths.get(below, column))
                    .or_else(|| self.base_elevation(column))
                    .ok_or_else(|| {
                        GeometryError::data_gap(
                            row,
                            Some(column),
                            "no defined elevation below this formation top",
                        )
                    })?;
                Ok(Some(InitialCell { top, bottom }))
            })
            .collect::<Result<Vec<_>, GeometryError>>()?;
        Ok(InitialPolygon { row, cells })
    }

    /// Assemble every formation, deepest first
    pub fn assemble(&self) -> Assembly {
        let formations = self.styles.formation_count();
        let initial: Vec<Result<InitialPolygon, GeometryError>> =
            (0..formations).map(|row| self.initial_polygon(row)).collect();

        let mut built: Vec<Option<FormationPolygon>> = vec![None; formations];
        let mut rows = Vec::with_capacity(formations);

        for row in (0..formations).rev() {
            let result = self.assemble_row(row, &initial, &built);
            match &result {
                Ok(polygon) => {
                    debug!(row, points = polygon.len(), "Formation assembled");
                    built[row] = Some(polygon.clone());
                }
                Err(e) => {
                    warn!(row, error = %e, "Formation assembly failed, rows above fall back to grid depths");
                }
            }
            rows.push(result);
        }
        rows.reverse();
        Assembly { rows }
    }

    fn initial_cell(
        &self,
        initial: &[Result<InitialPolygon, GeometryError>],
        row: usize,
        column: usize,
        for_row: usize,
    ) -> Result<InitialCell, GeometryError> {
        initial
            .get(row)
            .and_then(|r| r.as_ref().ok())
            .and_then(|p| p.cell(column))
            .ok_or_else(|| {
                GeometryError::data_gap(
                    for_row,
                    Some(column),
                    format!("row {row} has no top/bottom pair at this borehole"),
                )
            })
    }

    fn assemble_row(
        &self,
        row: usize,
        initial: &[Result<InitialPolygon, GeometryError>],
        built: &[Option<FormationPolygon>],
    ) -> Result<FormationPolygon, GeometryError> {
        let own = initial
            .get(row)
            .ok_or_else(|| GeometryError::configuration(Some(row), None, "row outside grid"))?
            .as_ref()
            .map_err(Clone::clone)?;
        let source = AssemblyDepths {
            assembler: self,
            built,
        };
        let styles = self.styles.row(row);
        let has_transitions = self.styles.has_transitions(row);

        let mut cells = own.cells.clone();
        let mut groups = Vec::new();

        self.fill_connect_runs(row, &mut cells, own, initial, &source)?;
        if !has_transitions && row + 1 < self.styles.formation_count() {
            self.inherit_lower_bottoms(row, &mut cells, initial, built, &mut groups);
        }

        for (column, &style) in styles.iter().enumerate() {
            let cell = match style {
                StyleCode::Null => continue,
                StyleCode::Pinch | StyleCode::Fade => cells[column].ok_or_else(|| {
                    GeometryError::data_gap(
                        row,
                        Some(column),
                        format!("{style} cell has no formation top"),
                    )
                })?,
                StyleCode::Normal | StyleCode::Connect => match cells[column] {
                    Some(cell) => cell,
                    None => continue,
                },
            };
            groups.push(PointGroup::single(
                BoundaryPoint::new(cell.top, cell.bottom, self.x(column), PointKind::Borehole(column)),
                0,
            ));
        }

        if has_transitions {
            for (column, &style) in styles.iter().enumerate() {
                if !style.is_transition() {
                    continue;
                }
                let direction = resolve_direction(styles, column).map_err(|e| e.at_row(row))?;
                for &side in direction.sides() {
                    let occurrence = self.transitions.get(row, column, side).ok_or_else(|| {
                        GeometryError::configuration(
                            Some(row),
                            Some(column),
                            format!("no correction entry for the {side} {style}"),
                        )
                    })?;
                    let group = match occurrence.kind {
                        TransitionKind::Pinch => self.pinch_group(row, occurrence, &source)?,
                        TransitionKind::Fade => {
                            self.fade_group(row, occurrence, own, initial, &source)?
                        }
                    };
                    groups.push(group);
                }
            }
        }

        freeze(row, groups)
    }

    // ------------------------------------------------------------------------
    // Pinch
    // ------------------------------------------------------------------------

    fn pinch_group(
        &self,
        row: usize,
        occurrence: &TransitionOccurrence,
        source: &AssemblyDepths<'_, '_>,
    ) -> Result<PointGroup, GeometryError> {
        let anchor = find_anchor(source, row, occurrence.column, occurrence.side, self.columns())?;
        let apex = pinch_apex(
            anchor.column_depth,
            self.x(anchor.column),
            anchor.neighbor_depth,
            self.x(anchor.neighbor),
            occurrence.correction.midpoint,
        )
        .map_err(|e| e.at_row(row))?;
        Ok(PointGroup::single(apex, side_bias(occurrence.side)))
    }

    // ------------------------------------------------------------------------
    // Fade
    // ------------------------------------------------------------------------

    fn fade_group(
        &self,
        row: usize,
        occurrence: &TransitionOccurrence,
        own: &InitialPolygon,
        initial: &[Result<InitialPolygon, GeometryError>],
        source: &AssemblyDepths<'_, '_>,
    ) -> Result<PointGroup, GeometryError> {
        let column = occurrence.column;
        let side = occurrence.side;
        let neighbor = side.neighbor(column, self.columns()).ok_or_else(|| {
            GeometryError::configuration(Some(row), Some(column), "fade opens past the section edge")
        })?;
        let (xc, xn) = (self.x(column), self.x(neighbor));
        let correction = occurrence.correction;
        let bounds = (correction.left_bound, correction.right_bound);
        let midpoint = correction.midpoint;
        let tip = teeth_point(side, midpoint, self.teeth_offset, bounds);
        let cell = own.cell(column).ok_or_else(|| {
            GeometryError::data_gap(row, Some(column), "fade cell has no formation top")
        })?;
        let line = |d1: f64, d2: f64, x: f64| elevation_at(d1, xc, d2, xn, x).map_err(|e| e.at_row(row));

        let interlocks = |other: usize| {
            self.styles.get(other, neighbor) == Some(StyleCode::Fade)
                && self.styles.get(other, column) == Some(StyleCode::Null)
        };

        let profile = if row > 0 && interlocks(row - 1) {
            // The row above fades back toward this one: this row draws the teeth
            let above = self.initial_cell(initial, row - 1, neighbor, row)?;
            FadeProfile {
                midpoint,
                teeth_point: tip,
                top_mid: line(cell.top, above.top, midpoint)?,
                bottom_mid: line(cell.bottom, above.bottom, midpoint)?,
                bottom_teeth: line(cell.bottom, above.bottom, tip)?,
            }
        } else if interlocks(row + 1) {
            // The row below draws the teeth; cover them with a block
            let below = self.initial_cell(initial, row + 1, neighbor, row)?;
            return Ok(PointGroup::single(
                BoundaryPoint::new(below.top, below.bottom, xn, PointKind::Block),
                side_bias(side),
            ));
        } else {
            let anchor = find_anchor(source, row, column, side, self.columns())?;
            let bottom_mid = line(anchor.column_depth, anchor.neighbor_depth, midpoint)?;
            FadeProfile {
                midpoint,
                teeth_point: tip,
                top_mid: bottom_mid + cell.thickness(),
                bottom_mid,
                bottom_teeth: line(anchor.column_depth, anchor.neighbor_depth, tip)?,
            }
        };

        Ok(PointGroup {
            anchor: midpoint,
            bias: side_bias(side),
            points: tooth_pattern(side, &profile, occurrence.teeth.unwrap_or_default()),
            bounds: Some(bounds),
        })
    }

    // ------------------------------------------------------------------------
    // Connect
    // ------------------------------------------------------------------------

    /// Fill each maximal run of connect cells: tops on the line between the
    /// bounding boreholes, bottoms from the formation beneath.
    fn fill_connect_runs(
        &self,
        row: usize,
        cells: &mut [Option<InitialCell>],
        own: &InitialPolygon,
        initial: &[Result<InitialPolygon, GeometryError>],
        source: &AssemblyDepths<'_, '_>,
    ) -> Result<(), GeometryError> {
        for (start, end) in connect_runs(self.styles.row(row)) {
            let bounding = |c: Option<usize>| {
                c.filter(|&c| c < self.columns())
                    .and_then(|c| own.cell(c).map(|cell| (c, cell)))
            };
            let (Some((left, left_cell)), Some((right, right_cell))) =
                (bounding(start.checked_sub(1)), bounding(Some(end + 1)))
            else {
                return Err(GeometryError::configuration(
                    Some(row),
                    Some(start),
                    format!("connect run over columns {start}..={end} needs a defined borehole on each side"),
                ));
            };
            for column in start..=end {
                let top = elevation_at(
                    left_cell.top,
                    self.x(left),
                    right_cell.top,
                    self.x(right),
                    self.x(column),
                )
                .map_err(|e| e.at_row(row))?;
                let bottom = self.connect_bottom(row, column, (left, right), initial, source)?;
                cells[column] = Some(InitialCell { top, bottom });
            }
        }
        Ok(())
    }

    fn connect_bottom(
        &self,
        row: usize,
        column: usize,
        (left, right): (usize, usize),
        initial: &[Result<InitialPolygon, GeometryError>],
        source: &AssemblyDepths<'_, '_>,
    ) -> Result<f64, GeometryError> {
        let gap = || GeometryError::data_gap(row, Some(column), "no surface below the connected top");
        let base = self.styles.base_row();

        if row + 1 == base {
            let l = self.base_elevation(left).ok_or_else(gap)?;
            let r = self.base_elevation(right).ok_or_else(gap)?;
            return Ok((l + r) / 2.0);
        }

        for below in row + 1..base {
            match self.styles.get(below, column) {
                Some(StyleCode::Normal | StyleCode::Connect) => {
                    return source.top(below, column).ok_or_else(gap);
                }
                Some(StyleCode::Pinch | StyleCode::Fade) => {
                    return Ok(self.initial_cell(initial, below, column, row)?.bottom);
                }
                Some(StyleCode::Null) | None => {}
            }
        }
        self.base_elevation(column).ok_or_else(gap)
    }

    // ------------------------------------------------------------------------
    // Rows without transitions
    // ------------------------------------------------------------------------

    /// Make the formation terminate flush against transitions and connected
    /// tops in the rows beneath it.
    fn inherit_lower_bottoms(
        &self,
        row: usize,
        cells: &mut [Option<InitialCell>],
        initial: &[Result<InitialPolygon, GeometryError>],
        built: &[Option<FormationPolygon>],
        groups: &mut Vec<PointGroup>,
    ) {
        let formations = self.styles.formation_count();
        let lower_bottom = |below: usize, column: usize| {
            initial
                .get(below)
                .and_then(|r| r.as_ref().ok())
                .and_then(|p| p.cell(column))
                .map(|c| c.bottom)
        };

        for column in 0..self.columns() {
            let Some(cell) = cells[column].as_mut() else {
                continue;
            };
            let next = self.styles.get(row + 1, column);
            if next.is_some_and(StyleCode::is_transition) {
                if let Some(bottom) = lower_bottom(row + 1, column) {
                    cell.bottom = bottom;
                }
            } else if next == Some(StyleCode::Null)
                && row + 2 < formations
                && self.styles.get(row + 2, column).is_some_and(StyleCode::is_transition)
            {
                if let Some(bottom) = lower_bottom(row + 2, column) {
                    cell.bottom = bottom;
                }
            }
        }

        let Some(lower) = built.get(row + 1).and_then(Option::as_ref) else {
            return;
        };
        let present: Vec<usize> = (0..self.columns())
            .filter(|&c| cells[c].is_some() && self.styles.get(row, c) != Some(StyleCode::Null))
            .collect();
        for column in 0..self.columns() {
            if self.styles.get(row + 1, column) != Some(StyleCode::Connect) {
                continue;
            }
            let Some(connected_top) = lower.borehole(column).map(|p| p.top) else {
                continue;
            };
            match cells[column].as_mut() {
                Some(cell) if self.styles.get(row, column) != Some(StyleCode::Null) => {
                    cell.bottom = connected_top;
                }
                _ => {
                    // Absent here but spanning the column: squeeze to zero
                    // thickness on the connected surface
                    let spans = present.iter().any(|&c| c < column) && present.iter().any(|&c| c > column);
                    if spans {
                        groups.push(PointGroup::single(
                            BoundaryPoint::new(
                                connected_top,
                                connected_top,
                                self.x(column),
                                PointKind::Connect,
                            ),
                            0,
                        ));
                    }
                }
            }
        }
    }
}

/// Maximal runs of consecutive connect cells as inclusive column ranges
pub fn connect_runs(row: &[StyleCode]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (column, &style) in row.iter().enumerate() {
        match (style == StyleCode::Connect, start) {
            (true, None) => start = Some(column),
            (false, Some(s)) => {
                runs.push((s, column - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, row.len() - 1));
    }
    runs
}
