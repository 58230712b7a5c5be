//! Contact lines: sample-type boundaries along each formation's top
//!
//! Every formation top is walked one borehole interval at a time. An interval
//! drawn between boreholes of the same sample type becomes a single line; one
//! spanning a change of sample type is split in two with opposite styles.
//! The split sits on the transition point of the formation above when that
//! formation pinches or fades into the interval, otherwise at the interval
//! midpoint.

use tracing::debug;

use super::{elevation_at, resolve_direction, Direction};
use crate::types::{
    BoundaryPoint, ContactLine, ContactLines, FormationPolygon, LineStyle, Locations, PointKind,
    SampleGrid, Side, StyleGrid,
};

/// Build solid and dashed contact lines for every assembled formation.
///
/// `polygons` holds one entry per formation row; failed rows are `None` and
/// contribute no lines.
pub fn build_contact_lines(
    polygons: &[Option<FormationPolygon>],
    styles: &StyleGrid,
    samples: &SampleGrid,
    locations: &Locations,
) -> ContactLines {
    let mut lines = ContactLines::default();
    for (row, polygon) in polygons.iter().enumerate() {
        let Some(polygon) = polygon else { continue };
        for interval in 0..locations.len().saturating_sub(1) {
            for line in interval_lines(row, interval, polygon, polygons, styles, samples, locations)
            {
                lines.push(line);
            }
        }
    }
    debug!(solid = lines.solid.len(), dashed = lines.dashed.len(), "Contact lines built");
    lines
}

fn polyline(row: usize, style: LineStyle, points: &[(f64, f64)]) -> ContactLine {
    ContactLine {
        row,
        style,
        elevations: points.iter().map(|p| p.0).collect(),
        distances: points.iter().map(|p| p.1).collect(),
    }
}

fn top_of(p: &BoundaryPoint) -> (f64, f64) {
    (p.top, p.distance)
}

/// Last or first non-block point of `polygon` strictly inside `(left, right)`
fn inner_point(polygon: &FormationPolygon, left: f64, right: f64, side: Side) -> Option<(f64, f64)> {
    let mut inner = polygon
        .between(left, right)
        .filter(|p| p.kind != PointKind::Block);
    let point = match side {
        Side::Right => inner.last(),
        Side::Left => inner.next(),
    };
    point.map(top_of)
}

fn interval_lines(
    row: usize,
    interval: usize,
    polygon: &FormationPolygon,
    polygons: &[Option<FormationPolygon>],
    styles: &StyleGrid,
    samples: &SampleGrid,
    locations: &Locations,
) -> Vec<ContactLine> {
    let (xi, xj) = (locations.get(interval), locations.get(interval + 1));

    let mut points: Vec<(f64, f64)> = polygon
        .points
        .iter()
        .filter(|p| p.distance >= xi && p.distance <= xj && p.kind != PointKind::Block)
        .map(top_of)
        .collect();

    // A block covers the teeth of the row below: follow those teeth instead
    let block_at = |x: f64| {
        polygon
            .points
            .iter()
            .any(|p| p.kind == PointKind::Block && p.distance == x)
    };
    let below = polygons.get(row + 1).and_then(Option::as_ref);
    if let Some(below) = below {
        if block_at(xj) {
            if let Some(tip) = inner_point(below, xi, xj, Side::Right) {
                points.push(tip);
            }
        }
        if block_at(xi) {
            if let Some(tip) = inner_point(below, xi, xj, Side::Left) {
                points.insert(0, tip);
            }
        }
    }

    if points.len() < 2 {
        return Vec::new();
    }

    let left_style = samples.get(row, interval).line_style();
    let right_style = samples.get(row, interval + 1).line_style();
    let left_top = polygon.borehole(interval).map(|p| p.top);
    let right_top = polygon.borehole(interval + 1).map(|p| p.top);

    let (left_top, right_top) = match (left_top, right_top) {
        (Some(l), Some(r)) if left_style != right_style => (l, r),
        (Some(_), Some(_)) | (Some(_), None) | (None, None) => {
            return vec![polyline(row, left_style, &points)];
        }
        (None, Some(_)) => return vec![polyline(row, right_style, &points)],
    };

    let split = split_point(row, interval, polygons, styles, locations)
        .or_else(|| {
            let mid = (xi + xj) / 2.0;
            elevation_at(left_top, xi, right_top, xj, mid)
                .ok()
                .map(|e| (e, mid))
        });
    let Some(split) = split else {
        return vec![polyline(row, left_style, &points)];
    };

    let mut first: Vec<(f64, f64)> = points.iter().copied().filter(|p| p.1 < split.1).collect();
    first.push(split);
    let mut second = vec![split];
    second.extend(points.iter().copied().filter(|p| p.1 > split.1));

    vec![
        polyline(row, left_style, &first),
        polyline(row, right_style, &second),
    ]
}

/// Transition point of the formation above that falls in this interval
fn split_point(
    row: usize,
    interval: usize,
    polygons: &[Option<FormationPolygon>],
    styles: &StyleGrid,
    locations: &Locations,
) -> Option<(f64, f64)> {
    let above_row = row.checked_sub(1)?;
    let above = polygons.get(above_row).and_then(Option::as_ref)?;
    let (xi, xj) = (locations.get(interval), locations.get(interval + 1));
    let cells = styles.row(above_row);

    let opens = |column: usize, side: Side| {
        cells.get(column).is_some_and(|s| s.is_transition())
            && resolve_direction(cells, column).is_ok_and(|d: Direction| d.opens(side))
    };

    if opens(interval, Side::Right) {
        inner_point(above, xi, xj, Side::Right)
    } else if opens(interval + 1, Side::Left) {
        inner_point(above, xi, xj, Side::Left)
    } else {
        None
    }
}
