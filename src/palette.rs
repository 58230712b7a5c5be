//! Formation colours
//!
//! Named colours win (case-insensitive); every other formation takes the next
//! fallback colour in order, wrapping when the list runs out. Bad entries are
//! cosmetic and degrade to the built-in palette.

use std::collections::HashMap;

use tracing::warn;

use crate::config::validation::is_hex_color;
use crate::config::{defaults, PaletteConfig};

/// Used only when the fallback list is empty
const GREY: &str = "#808080";

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    named: HashMap<String, String>,
    fallback: Vec<String>,
}

impl Palette {
    pub fn new(config: &PaletteConfig) -> Self {
        let mut named: HashMap<String, String> = defaults::NAMED_COLORS
            .iter()
            .map(|(n, c)| ((*n).to_string(), (*c).to_string()))
            .collect();
        for (name, color) in &config.named {
            if is_hex_color(color) {
                named.insert(name.to_lowercase(), color.clone());
            } else {
                warn!(formation = %name, color = %color, "Invalid named colour, keeping default");
            }
        }

        let fallback: Vec<String> = config
            .fallback
            .iter()
            .enumerate()
            .map(|(i, color)| {
                if is_hex_color(color) {
                    color.clone()
                } else {
                    let default = defaults::FALLBACK_COLORS[i % defaults::FALLBACK_COLORS.len()];
                    warn!(index = i, color = %color, default, "Invalid fallback colour, using default");
                    default.to_string()
                }
            })
            .collect();

        Self { named, fallback }
    }

    /// One colour per formation name, in order
    pub fn assign<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut next = 0;
        names
            .iter()
            .map(|name| {
                if let Some(color) = self.named.get(&name.as_ref().to_lowercase()) {
                    return color.clone();
                }
                let color = match self.fallback.len() {
                    0 => GREY.to_string(),
                    n => self.fallback[next % n].clone(),
                };
                next += 1;
                color
            })
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(&PaletteConfig::default())
    }
}
