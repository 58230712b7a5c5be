//! Section Configuration - geometry, export and palette settings as TOML
//!
//! Every field has a serde default matching the built-in constants in
//! `defaults`, so an empty or missing file behaves exactly like no file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for cross-section construction.
///
/// Load with `SectionConfig::load()` which searches:
/// 1. `$XSECT_CONFIG` env var
/// 2. `./xsect.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Transition geometry
    #[serde(default)]
    pub geometry: GeometryConfig,

    /// Export views
    #[serde(default)]
    pub export: ExportConfig,

    /// Formation colours
    #[serde(default)]
    pub palette: PaletteConfig,
}

impl SectionConfig {
    /// Load configuration using the standard search order:
    /// 1. `$XSECT_CONFIG` environment variable
    /// 2. `./xsect.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded section config from XSECT_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from XSECT_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "XSECT_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./xsect.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded section config from ./xsect.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./xsect.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No xsect.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: check for unknown keys first (warnings only)
        for w in &super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        for w in &super::validation::validate_suspicious_ranges(&config) {
            warn!(field = %w.field, "{}", w);
        }
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Section config saved");
        Ok(())
    }

    /// Validate all settings.
    ///
    /// Rules:
    /// - Teeth offset fraction in (0, 0.5)
    /// - Default tooth count >= 1
    /// - Vertical exaggeration finite and > 0
    /// - Total depth floor finite when set
    /// - Palette colours are `#RRGGBB`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let g = &self.geometry;
        if !(g.teeth_offset_fraction > 0.0 && g.teeth_offset_fraction < 0.5) {
            errors.push(format!(
                "geometry.teeth_offset_fraction ({}) must be in (0, 0.5)",
                g.teeth_offset_fraction
            ));
        }
        if g.default_tooth_count == 0 {
            errors.push("geometry.default_tooth_count must be >= 1".to_string());
        }
        if let Some(floor) = g.total_depth_floor {
            if !floor.is_finite() {
                errors.push(format!("geometry.total_depth_floor must be finite, got {floor}"));
            }
        }

        let ve = self.export.vertical_exaggeration;
        if !(ve.is_finite() && ve > 0.0) {
            errors.push(format!("export.vertical_exaggeration ({ve}) must be > 0"));
        }

        errors.extend(super::validation::validate_palette(&self.palette));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Teeth offset distance for a section of the given total length
    pub fn teeth_offset(&self, total_length: f64) -> f64 {
        total_length * self.geometry.teeth_offset_fraction
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Teeth offset as a fraction of total section length
    #[serde(default = "default_teeth_offset_fraction")]
    pub teeth_offset_fraction: f64,

    /// Teeth per fade until edited
    #[serde(default = "default_tooth_count")]
    pub default_tooth_count: usize,

    /// Elevation below which the base formation is clipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_depth_floor: Option<f64>,
}

fn default_teeth_offset_fraction() -> f64 { defaults::TEETH_OFFSET_FRACTION }
fn default_tooth_count() -> usize { defaults::TOOTH_COUNT }

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            teeth_offset_fraction: default_teeth_offset_fraction(),
            default_tooth_count: default_tooth_count(),
            total_depth_floor: None,
        }
    }
}

// ============================================================================
// Export
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_vertical_exaggeration")]
    pub vertical_exaggeration: f64,
}

fn default_vertical_exaggeration() -> f64 { defaults::VERTICAL_EXAGGERATION }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            vertical_exaggeration: default_vertical_exaggeration(),
        }
    }
}

// ============================================================================
// Palette
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Handed out in order to formations without a named colour
    #[serde(default = "default_fallback_colors")]
    pub fallback: Vec<String>,

    /// Formation name (case-insensitive) to colour
    #[serde(default = "default_named_colors")]
    pub named: BTreeMap<String, String>,
}

fn default_fallback_colors() -> Vec<String> {
    defaults::FALLBACK_COLORS.iter().map(|c| (*c).to_string()).collect()
}

fn default_named_colors() -> BTreeMap<String, String> {
    defaults::NAMED_COLORS
        .iter()
        .map(|(name, color)| ((*name).to_string(), (*color).to_string()))
        .collect()
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback_colors(),
            named: default_named_colors(),
        }
    }
}
