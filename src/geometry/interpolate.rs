//! Two-point linear interpolation of transition points

use super::GeometryError;
use crate::types::{BoundaryPoint, PointKind};

/// Elevation at `x` on the line through `(x1, d1)` and `(x2, d2)`.
///
/// `slope = (d1 - d2) / (x1 - x2)`; coincident stations are a configuration
/// error (zero-width borehole spacing).
pub fn elevation_at(d1: f64, x1: f64, d2: f64, x2: f64, x: f64) -> Result<f64, GeometryError> {
    if x1 == x2 {
        return Err(GeometryError::configuration(
            None,
            None,
            format!("cannot interpolate between two stations at distance {x1}"),
        ));
    }
    let slope = (d1 - d2) / (x1 - x2);
    Ok(slope * x + (d1 - slope * x1))
}

/// Zero-thickness pinch apex at `midpoint`: top and bottom collapse onto the
/// anchor line.
pub fn pinch_apex(
    d1: f64,
    x1: f64,
    d2: f64,
    x2: f64,
    midpoint: f64,
) -> Result<BoundaryPoint, GeometryError> {
    let e = elevation_at(d1, x1, d2, x2, midpoint)?;
    Ok(BoundaryPoint::new(e, e, midpoint, PointKind::Apex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_through_two_points() {
        assert_eq!(elevation_at(10.0, 0.0, 20.0, 100.0, 50.0).unwrap(), 15.0);
        assert_eq!(elevation_at(10.0, 0.0, 20.0, 100.0, 0.0).unwrap(), 10.0);
        // Order of stations does not matter
        assert_eq!(elevation_at(20.0, 100.0, 10.0, 0.0, 25.0).unwrap(), 12.5);
    }

    #[test]
    fn test_coincident_stations_rejected() {
        assert!(matches!(
            elevation_at(1.0, 5.0, 2.0, 5.0, 5.0),
            Err(GeometryError::Configuration { .. })
        ));
    }

    #[test]
    fn test_apex_has_zero_thickness() {
        let p = pinch_apex(-40.0, 100.0, -60.0, 200.0, 150.0).unwrap();
        assert_eq!(p.top, p.bottom);
        assert_eq!(p.top, -50.0);
        assert_eq!(p.distance, 150.0);
        assert_eq!(p.kind, PointKind::Apex);
    }
}
