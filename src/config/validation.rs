//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks on geometry, export and palette settings.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::{PaletteConfig, SectionConfig};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Tables whose keys are user data rather than field names
const FREE_FORM_TABLES: &[&str] = &["palette.named"];

/// Returns the complete set of valid dotted key paths for SectionConfig.
///
/// Kept in step with the struct hierarchy in section_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [geometry]
        "geometry",
        "geometry.teeth_offset_fraction",
        "geometry.default_tooth_count",
        "geometry.total_depth_floor",
        // [export]
        "export",
        "export.vertical_exaggeration",
        // [palette]
        "palette",
        "palette.fallback",
        "palette.named",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
///
/// Children of free-form tables (`palette.named`) are not collected.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if FREE_FORM_TABLES.contains(&prefix) {
        return keys;
    }
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails on unknown keys; parse errors are reported by serde later.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// `#RRGGBB` with hex digits of either case
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Errors for palette colours that are not `#RRGGBB`
pub fn validate_palette(palette: &PaletteConfig) -> Vec<String> {
    let mut errors = Vec::new();
    for (i, color) in palette.fallback.iter().enumerate() {
        if !is_hex_color(color) {
            errors.push(format!("palette.fallback[{i}] = '{color}' is not a #RRGGBB colour"));
        }
    }
    for (name, color) in &palette.named {
        if !is_hex_color(color) {
            errors.push(format!("palette.named.{name} = '{color}' is not a #RRGGBB colour"));
        }
    }
    errors
}

/// Settings that are legal but unlikely to draw a readable section.
pub fn validate_suspicious_ranges(config: &SectionConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let fraction = config.geometry.teeth_offset_fraction;
    if fraction > 0.1 && fraction < 0.5 {
        warnings.push(ValidationWarning {
            field: "geometry.teeth_offset_fraction".to_string(),
            message: format!(
                "teeth_offset_fraction = {fraction} is large; teeth will be clamped to their borehole intervals"
            ),
            suggestion: None,
        });
    }

    let teeth = config.geometry.default_tooth_count;
    if teeth > 50 {
        warnings.push(ValidationWarning {
            field: "geometry.default_tooth_count".to_string(),
            message: format!("default_tooth_count = {teeth} is outside typical range (1-50)"),
            suggestion: None,
        });
    }

    if config.palette.fallback.is_empty() {
        warnings.push(ValidationWarning {
            field: "palette.fallback".to_string(),
            message: "palette.fallback is empty; unnamed formations will be drawn grey".to_string(),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("export", "export"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("exagerration", "exaggeration"), 2);
        assert_eq!(levenshtein("geometri", "geometry"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [geometry]
            teeth_offset_fraction = 0.02
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"geometry".to_string()));
        assert!(keys.contains(&"geometry.teeth_offset_fraction".to_string()));
    }

    #[test]
    fn test_named_palette_entries_are_free_form() {
        let toml_str = r##"
[palette.named]
qal = "#112233"
"Upper Sand" = "#445566"
"##;
        assert!(validate_unknown_keys(toml_str).is_empty());
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[geometry]
teeth_ofset_fraction = 0.02
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("geometry.teeth_offset_fraction")
        );
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#E0A74D"));
        assert!(is_hex_color("#c0392b"));
        assert!(!is_hex_color("E0A74D"));
        assert!(!is_hex_color("#E0A74"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn test_bad_palette_colour_is_error() {
        let mut palette = PaletteConfig::default();
        palette.named.insert("qal".to_string(), "brown".to_string());
        let errors = validate_palette(&palette);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("palette.named.qal"));
    }

    #[test]
    fn test_defaults_have_no_suspicious_values() {
        assert!(validate_suspicious_ranges(&SectionConfig::default()).is_empty());
    }

    #[test]
    fn test_large_offset_fraction_warns() {
        let mut config = SectionConfig::default();
        config.geometry.teeth_offset_fraction = 0.3;
        let warnings = validate_suspicious_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "geometry.teeth_offset_fraction"));
    }
}
