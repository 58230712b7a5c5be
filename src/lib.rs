//! xsect: Geologic Cross-Section Geometry
//!
//! Builds formation polygons and contact lines for a 2-D geologic cross
//! section from formation tops measured in a line of boreholes.
//!
//! ## Architecture
//!
//! - **Types**: style/depth/sample grids, polygons and contact lines
//! - **Geometry**: pinch/fade transitions, bottom-up polygon assembly,
//!   contact lines along formation tops
//! - **Section**: one dataset's inputs, edits and full rebuilds
//! - **Dataset / Report**: TOML input files and JSON render reports

pub mod config;
pub mod dataset;
pub mod geometry;
pub mod palette;
pub mod report;
pub mod section;
pub mod types;

// Re-export section configuration
pub use config::SectionConfig;

// Re-export commonly used types
pub use types::{
    BoundaryPoint, ContactLine, ContactLines, CorrectionEntry, DepthGrid, FormationPolygon,
    LineStyle, Locations, PointKind, PolygonTable, SampleGrid, SampleType, Side, StyleCode,
    StyleGrid, ToothSpec, TransitionKind,
};

// Re-export geometry
pub use geometry::{
    build_contact_lines, Assembly, Direction, GeometryError, PolygonAssembler, TransitionOccurrence,
    TransitionTable,
};

// Re-export section, dataset and report
pub use dataset::{load_section, DatasetError, DatasetFile};
pub use palette::Palette;
pub use report::RenderReport;
pub use section::{BoreholeTick, CrossSection, FormationGeometry, SectionGeometry, SectionInputs};
