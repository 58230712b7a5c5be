//! Shared data structures for cross-section construction
//!
//! Inputs (loaded once per dataset, mutated only by explicit edits):
//! - StyleGrid / SampleGrid: per-formation, per-borehole classification
//! - DepthGrid / Locations: formation-top elevations and borehole positions
//! - CorrectionEntry / ToothSpec: pinch/fade placement parameters
//!
//! Outputs (fully derived, rebuilt on every change):
//! - FormationPolygon / PolygonTable: one closed outline per formation
//! - ContactLine / ContactLines: sample-type contacts along formation tops

mod contact;
mod depth;
mod polygon;
mod style;
mod transition;

pub use contact::*;
pub use depth::*;
pub use polygon::*;
pub use style::*;
pub use transition::*;
