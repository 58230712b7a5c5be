//! Section Configuration Module
//!
//! Geometry, export and palette settings loaded from TOML, replacing the
//! built-in constants with per-project values.
//!
//! ## Loading Order
//!
//! 1. `XSECT_CONFIG` environment variable (path to TOML file)
//! 2. `xsect.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(SectionConfig::load());
//!
//! // Anywhere in the codebase:
//! let ve = config::get().export.vertical_exaggeration;
//! ```

mod section_config;
pub mod defaults;
pub mod validation;

pub use section_config::*;

use std::sync::OnceLock;

/// Global section configuration, initialized once at startup.
static SECTION_CONFIG: OnceLock<SectionConfig> = OnceLock::new();

/// Initialize the global section configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: SectionConfig) {
    if SECTION_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global section configuration.
///
/// Falls back to built-in defaults if `init()` has not been called; a later
/// `init()` is then ignored.
pub fn get() -> &'static SectionConfig {
    SECTION_CONFIG.get_or_init(SectionConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    SECTION_CONFIG.get().is_some()
}
