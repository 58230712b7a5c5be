//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding the path of a section config TOML file.
pub const CONFIG_ENV_VAR: &str = "XSECT_CONFIG";

/// Config file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "xsect.toml";

// ============================================================================
// Geometry
// ============================================================================

/// Teeth offset as a fraction of the total section length.
///
/// `offset = total_length * TEETH_OFFSET_FRACTION`
pub const TEETH_OFFSET_FRACTION: f64 = 0.01;

/// Teeth per fade occurrence; 4 teeth = tooth spec (7, 3).
pub const TOOTH_COUNT: usize = 4;

// ============================================================================
// Export
// ============================================================================

/// Horizontal distances are divided by this factor on export.
pub const VERTICAL_EXAGGERATION: f64 = 1.0;

// ============================================================================
// Palette
// ============================================================================

/// Colours handed out in order to formations without a named colour.
pub const FALLBACK_COLORS: [&str; 16] = [
    "#c0392b", "#e74c3c", "#9b59b6", "#8e44ad", "#2980b9", "#3498db", "#1abc9c", "#16a085",
    "#27ae60", "#2ecc71", "#f1c40f", "#f39c12", "#e67e22", "#d35400", "#34495e", "#2c3e50",
];

/// Conventional unit colours keyed by lower-case formation name.
pub const NAMED_COLORS: [(&str, &str); 12] = [
    ("qh", "#E0A74D"),
    ("qbd", "#FFDB96"),
    ("qu", "#EBEB98"),
    ("tqu", "#DCC27D"),
    ("tc", "#CCCCCC"),
    ("th", "#75E5AB"),
    ("thp", "#92C272"),
    ("that", "#DEA0CB"),
    ("ts", "#B7B1F1"),
    ("to", "#6CD1E8"),
    ("tap", "#3460C1"),
    ("tha", "#FAC0CC"),
];
