//! Polygon Assembly Scenarios
//!
//! End-to-end assembly over small hand-built grids: the identity case,
//! pinches, fades (free and interlocking), absent boreholes, and the
//! structural properties every assembled polygon must keep.

use xsect::{
    Assembly, DepthGrid, FormationPolygon, GeometryError, Locations, PointKind, PolygonAssembler,
    StyleCode, StyleGrid, ToothSpec, TransitionTable,
};

const NAN: f64 = f64::NAN;
const OFFSET: f64 = 2.0;

struct Grid {
    styles: StyleGrid,
    depths: DepthGrid,
    locations: Locations,
    transitions: TransitionTable,
}

impl Grid {
    fn new(styles: &[&str], depths: Vec<Vec<f64>>, locations: Vec<f64>) -> Self {
        let styles = StyleGrid::new(
            styles
                .iter()
                .map(|s| s.chars().filter_map(StyleCode::from_code).collect())
                .collect(),
        )
        .unwrap();
        let depths = DepthGrid::from_elevations(depths).unwrap();
        let locations = Locations::new(locations).unwrap();
        let labels: Vec<String> = (1..=locations.len()).map(|i| i.to_string()).collect();
        let transitions =
            TransitionTable::from_styles(&styles, &locations, &labels, ToothSpec::default());
        Self {
            styles,
            depths,
            locations,
            transitions,
        }
    }

    fn assemble(&self) -> Assembly {
        PolygonAssembler::new(
            &self.styles,
            &self.depths,
            &self.locations,
            &self.transitions,
            OFFSET,
        )
        .unwrap()
        .assemble()
    }
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

fn teeth(polygon: &FormationPolygon) -> Vec<&xsect::BoundaryPoint> {
    polygon
        .points
        .iter()
        .filter(|p| p.kind == PointKind::Tooth)
        .collect()
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn plain_grid_reproduces_borehole_locations() {
    let g = Grid::new(
        &["xxx", "xxx", "xxx"],
        vec![
            vec![10.0, 12.0, 14.0],
            vec![0.0, 1.0, 2.0],
            vec![-20.0, -21.0, -22.0],
        ],
        vec![0.0, 100.0, 250.0],
    );
    let asm = g.assemble();
    assert!(asm.is_complete());
    for polygon in asm.polygons() {
        assert_eq!(polygon.distances(), g.locations.as_slice());
    }
    let top = asm.polygon(0).unwrap();
    assert_eq!(top.tops(), vec![10.0, 12.0, 14.0]);
    assert_eq!(top.bottoms(), vec![0.0, 1.0, 2.0]);
    assert_eq!(asm.polygon(1).unwrap().bottoms(), vec![-20.0, -21.0, -22.0]);
}

// ============================================================================
// Pinch
// ============================================================================

#[test]
fn pinch_toward_void_gets_zero_thickness_apex() {
    let g = Grid::new(
        &["xpn", "xxx"],
        vec![vec![0.0, 0.0, NAN], vec![-10.0, -20.0, -30.0]],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    let polygon = asm.polygon(0).unwrap();
    assert_eq!(polygon.len(), 3);
    let apex = polygon.points[2];
    assert_eq!(apex.kind, PointKind::Apex);
    assert_eq!(apex.distance, 150.0);
    assert_eq!(apex.top, apex.bottom);
    assert_close(apex.top, -25.0);
}

#[test]
fn pinch_follows_edited_midpoint() {
    let mut g = Grid::new(
        &["xpn", "xxx"],
        vec![vec![0.0, 0.0, NAN], vec![-10.0, -20.0, -30.0]],
        vec![0.0, 100.0, 200.0],
    );
    g.transitions.set_midpoint(0, 0, 180.0).unwrap();
    let asm = g.assemble();
    let apex = asm.polygon(0).unwrap().points[2];
    assert_eq!(apex.distance, 180.0);
    assert_close(apex.top, -28.0);
}

#[test]
fn pinch_without_void_neighbour_is_configuration_error() {
    let g = Grid::new(
        &["xpx", "xxx"],
        vec![vec![0.0, 0.0, 0.0], vec![-10.0, -10.0, -10.0]],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    assert!(matches!(
        asm.rows()[0],
        Err(GeometryError::Configuration {
            row: Some(0),
            column: Some(1),
            ..
        })
    ));
}

#[test]
fn pinch_anchor_descends_past_absent_rows() {
    // Row 1 only covers half of the pinch pair; the anchor comes from the base
    let g = Grid::new(
        &["xpn", "xxn", "xxx"],
        vec![
            vec![0.0, 0.0, NAN],
            vec![-5.0, -6.0, NAN],
            vec![-10.0, -20.0, -40.0],
        ],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    assert!(asm.is_complete());
    let polygon = asm.polygon(0).unwrap();
    let apex = polygon
        .points
        .iter()
        .find(|p| p.kind == PointKind::Apex)
        .unwrap();
    assert_close(apex.top, -30.0);
}

#[test]
fn missing_anchor_is_data_gap() {
    let g = Grid::new(
        &["xpn", "xxx"],
        vec![vec![0.0, 0.0, NAN], vec![-10.0, -20.0, NAN]],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    assert!(matches!(
        asm.rows()[0],
        Err(GeometryError::DataGap { row: 0, .. })
    ));
}

// ============================================================================
// Fade
// ============================================================================

#[test]
fn fade_opening_both_ways_builds_two_tooth_runs() {
    let g = Grid::new(
        &["nfn", "xxx"],
        vec![vec![NAN, 0.0, NAN], vec![-10.0, -20.0, -30.0]],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    let polygon = asm.polygon(0).unwrap();
    let spec = ToothSpec::default();
    assert_eq!(polygon.len(), 2 * spec.sample_count + 1);

    let (left, rest) = polygon.points.split_at(spec.sample_count);
    let (borehole, right) = rest.split_at(1);
    assert_eq!(borehole[0].kind, PointKind::Borehole(1));

    // Left run: void end first, alternating 50 / 52
    for (i, p) in left.iter().enumerate() {
        assert_eq!(p.kind, PointKind::Tooth);
        let expected = if i % 2 == 0 { 50.0 } else { 50.0 + OFFSET };
        assert_eq!(p.distance, expected);
    }
    assert_eq!(left[0].top, left[0].bottom);
    assert_close(left[0].top, -15.0);
    assert_close(left[spec.sample_count - 1].top, 5.0);

    // Right run: alternating 150 / 148, void end last
    for (i, p) in right.iter().enumerate() {
        let expected = if i % 2 == 0 { 150.0 } else { 150.0 - OFFSET };
        assert_eq!(p.distance, expected);
    }
    let last = right[spec.sample_count - 1];
    assert_eq!(last.top, last.bottom);
    assert_close(last.top, -25.0);
    assert_close(right[0].top, -5.0);
}

#[test]
fn fade_tooth_count_edit_changes_run_length() {
    let mut g = Grid::new(
        &["nfn", "xxx"],
        vec![vec![NAN, 0.0, NAN], vec![-10.0, -10.0, -10.0]],
        vec![0.0, 100.0, 200.0],
    );
    g.transitions.set_tooth_count(0, 1, 2).unwrap();
    let asm = g.assemble();
    let polygon = asm.polygon(0).unwrap();
    // Left keeps 7 samples, right drops to 3
    assert_eq!(teeth(polygon).len(), 7 + 3);
}

#[test]
fn interlocking_fades_share_one_tooth_run() {
    // Row 0 fades left over column 0 where row 1 fades right underneath it
    let g = Grid::new(
        &["nf", "fn", "xx"],
        vec![vec![NAN, 0.0], vec![-10.0, NAN], vec![-30.0, -30.0]],
        vec![0.0, 100.0],
    );
    let asm = g.assemble();
    assert!(asm.is_complete());

    let upper = asm.polygon(0).unwrap();
    assert!(teeth(upper).is_empty());
    assert_eq!(upper.points[0].kind, PointKind::Block);
    assert_eq!(upper.points[0].distance, 0.0);
    assert_eq!(upper.points[0].top, -10.0);
    assert_eq!(upper.points[0].bottom, -30.0);

    let lower = asm.polygon(1).unwrap();
    let run = teeth(lower);
    assert_eq!(run.len(), ToothSpec::default().sample_count);
    assert_close(run[0].top, -5.0);
    assert_eq!(run[run.len() - 1].top, run[run.len() - 1].bottom);
    assert!(run.iter().all(|p| p.distance == 50.0 || p.distance == 48.0));
}

#[test]
fn teeth_are_clamped_inside_the_interval() {
    let mut g = Grid::new(
        &["nfn", "xxx"],
        vec![vec![NAN, 0.0, NAN], vec![-10.0, -10.0, -10.0]],
        vec![0.0, 100.0, 200.0],
    );
    g.transitions.set_midpoint(0, 0, 99.5).unwrap();
    let asm = g.assemble();
    let polygon = asm.polygon(0).unwrap();
    assert!(teeth(polygon)
        .iter()
        .all(|p| (0.0..=200.0).contains(&p.distance)));
    assert!(polygon.points.iter().any(|p| p.distance == 100.0 && p.kind == PointKind::Tooth));
}

// ============================================================================
// Absent boreholes and connects
// ============================================================================

#[test]
fn null_column_is_excluded() {
    let g = Grid::new(
        &["nxx", "xxx", "xxx"],
        vec![
            vec![NAN, 0.0, 0.0],
            vec![-10.0, -10.0, -10.0],
            vec![-20.0, -20.0, -20.0],
        ],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    let polygon = asm.polygon(0).unwrap();
    assert!(polygon.borehole(0).is_none());
    assert_eq!(polygon.distances(), vec![100.0, 200.0]);
}

#[test]
fn connect_bridges_a_missing_top() {
    let g = Grid::new(
        &["xxx", "xcx", "xxx"],
        vec![
            vec![10.0, 10.0, 10.0],
            vec![0.0, NAN, -4.0],
            vec![-20.0, -20.0, -20.0],
        ],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    let connected = asm.polygon(1).unwrap().borehole(1).copied().unwrap();
    assert_close(connected.top, -2.0);
    assert_eq!(connected.bottom, -20.0);
    // The formation above now rests on the connected surface
    assert_close(asm.polygon(0).unwrap().borehole(1).unwrap().bottom, -2.0);
}

#[test]
fn absent_row_over_connect_squeezes_to_connected_surface() {
    let g = Grid::new(
        &["xnx", "xcx", "xxx"],
        vec![
            vec![10.0, NAN, 10.0],
            vec![0.0, NAN, -4.0],
            vec![-20.0, -20.0, -20.0],
        ],
        vec![0.0, 100.0, 200.0],
    );
    let asm = g.assemble();
    assert!(asm.is_complete());

    let upper = asm.polygon(0).unwrap();
    let points: Vec<_> = upper
        .points
        .iter()
        .map(|p| (p.top, p.bottom, p.distance, p.kind))
        .collect();
    assert_eq!(
        points,
        vec![
            (10.0, 0.0, 0.0, PointKind::Borehole(0)),
            (-2.0, -2.0, 100.0, PointKind::Connect),
            (10.0, -4.0, 200.0, PointKind::Borehole(2)),
        ]
    );
}

// ============================================================================
// Properties
// ============================================================================

fn mixed_grid() -> Grid {
    Grid::new(
        &["xxxxx", "xpnfn", "xxxxx"],
        vec![
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![-10.0, -10.0, NAN, -10.0, NAN],
            vec![-30.0, -31.0, -32.0, -33.0, -34.0],
        ],
        vec![0.0, 100.0, 200.0, 300.0, 400.0],
    )
}

#[test]
fn recomputation_is_bit_identical() {
    let g = mixed_grid();
    assert_eq!(g.assemble(), g.assemble());
}

#[test]
fn distances_never_decrease_outside_tooth_runs() {
    let g = mixed_grid();
    let asm = g.assemble();
    assert!(asm.is_complete(), "{:?}", asm.failures().collect::<Vec<_>>());
    for polygon in asm.polygons() {
        let stations: Vec<f64> = polygon
            .points
            .iter()
            .filter(|p| p.kind != PointKind::Tooth)
            .map(|p| p.distance)
            .collect();
        assert!(
            stations.windows(2).all(|w| w[0] <= w[1]),
            "row {} stations {stations:?}",
            polygon.row
        );
    }
}

#[test]
fn rows_above_transitions_rest_on_them() {
    let g = mixed_grid();
    let asm = g.assemble();
    let top = asm.polygon(0).unwrap();
    // Bottoms under the pinch and fade columns come from the row below
    assert_eq!(top.borehole(1).unwrap().bottom, -31.0);
    assert_eq!(top.borehole(3).unwrap().bottom, -33.0);
}

#[test]
fn table_view_round_trips() {
    let g = mixed_grid();
    let asm = g.assemble();
    for polygon in asm.polygons() {
        let table = polygon.to_table();
        assert_eq!(FormationPolygon::from_table(&table).as_ref(), Some(polygon));
    }
}
