//! Interlocking fade tooth patterns

use crate::types::{BoundaryPoint, PointKind, Side, ToothSpec};

/// Elevations and stations a fade's tooth run is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeProfile {
    pub midpoint: f64,
    pub teeth_point: f64,
    pub top_mid: f64,
    pub bottom_mid: f64,
    /// Bottom-line elevation under the teeth point
    pub bottom_teeth: f64,
}

/// `count` evenly spaced values from `start` to `end`, both ends exact
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count - 1).map(|i| start + step * i as f64).collect();
            values.push(end);
            values
        }
    }
}

/// Tip station of the teeth: back from the midpoint toward the formation,
/// kept inside the occurrence bounds.
pub fn teeth_point(side: Side, midpoint: f64, offset: f64, bounds: (f64, f64)) -> f64 {
    let raw = match side {
        Side::Left => midpoint + offset,
        Side::Right => midpoint - offset,
    };
    raw.clamp(bounds.0, bounds.1)
}

/// Zig-zag run for a fade opening toward `side`.
///
/// Distances alternate `midpoint, teeth_point` `tile_count` times and close
/// on the midpoint. Top elevations run between the two midpoint elevations:
/// bottom to top when the void lies left, top to bottom when it lies right,
/// so the outline stays continuous with the borehole it grows from.
pub fn tooth_pattern(side: Side, profile: &FadeProfile, spec: ToothSpec) -> Vec<BoundaryPoint> {
    let FadeProfile {
        midpoint,
        teeth_point,
        top_mid,
        bottom_mid,
        bottom_teeth,
    } = *profile;

    let tops = match side {
        Side::Left => linspace(bottom_mid, top_mid, spec.sample_count),
        Side::Right => linspace(top_mid, bottom_mid, spec.sample_count),
    };

    tops.into_iter()
        .enumerate()
        .map(|(i, top)| {
            let (distance, bottom) = if i % 2 == 0 {
                (midpoint, bottom_mid)
            } else {
                (teeth_point, bottom_teeth)
            };
            BoundaryPoint::new(top, bottom, distance, PointKind::Tooth)
        })
        .collect()
}
