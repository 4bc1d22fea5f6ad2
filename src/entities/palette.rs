//! Shared color palette for part tinting
//!
//! Parts reference palette slots by class name (`.flesh`, `.hair2`, ...).
//! The palette is embedded as a style block in composed documents and
//! sent with server-side render requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::VisageError;

/// Slot names in picker order, with default colors
pub const DEFAULT_SLOTS: &[(&str, &str)] = &[
    ("flesh", "#f2c280"),
    ("flesh2", "#e3a65c"),
    ("flesh3", "#ce8e45"),
    ("hair", "#5a3b2e"),
    ("hair2", "#46281c"),
    ("eye", "#3f7bb5"),
    ("p1", "#d34b4b"),
    ("p2", "#4bd385"),
    ("p3", "#4b6bd3"),
    ("p4", "#d3c84b"),
];

/// Ordered color slots, keyed by class name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    slots: Vec<(String, String)>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Palette {
    /// Slot keys in picker order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a slot to a `#rrggbb` color
    pub fn set(&mut self, key: &str, color: &str) -> Result<(), VisageError> {
        let normalized = normalize_hex(color)?;
        let slot = self
            .slots
            .iter_mut()
            .find(|(k, _)| k == key)
            .ok_or_else(|| VisageError::UnknownPaletteKey(key.to_string()))?;
        slot.1 = normalized;
        Ok(())
    }

    /// Key -> color map for the server render request
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.slots.iter().cloned().collect()
    }

    /// CSS rules for a composed document's style block
    pub fn style_rules(&self) -> String {
        let mut rules = String::new();
        for (key, color) in &self.slots {
            rules.push_str(&format!(".{} {{ fill: {}; }}\n", key, color));
        }
        rules
    }
}

/// Validate and lowercase a `#rrggbb` string
pub fn normalize_hex(color: &str) -> Result<String, VisageError> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| VisageError::InvalidColor(color.to_string()))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(VisageError::InvalidColor(color.to_string()));
    }
    Ok(format!("#{}", hex.to_ascii_lowercase()))
}

/// Format rgb components as `#rrggbb`
pub fn format_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slots_are_ordered() {
        let palette = Palette::default();
        let keys: Vec<_> = palette.keys().collect();
        assert_eq!(keys[0], "flesh");
        assert_eq!(keys.len(), DEFAULT_SLOTS.len());
    }

    #[test]
    fn set_validates_and_normalizes() {
        let mut palette = Palette::default();
        palette.set("eye", "#AABBCC").unwrap();
        assert_eq!(palette.get("eye"), Some("#aabbcc"));

        assert!(matches!(
            palette.set("eye", "red"),
            Err(VisageError::InvalidColor(_))
        ));
        assert!(matches!(
            palette.set("nope", "#aabbcc"),
            Err(VisageError::UnknownPaletteKey(_))
        ));
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(format_hex([255, 255, 255]), "#ffffff");
        assert_eq!(format_hex([18, 52, 86]), "#123456");
        assert_eq!(normalize_hex("#123456").unwrap(), "#123456");
    }

    #[test]
    fn style_rules_cover_every_slot() {
        let palette = Palette::default();
        let css = palette.style_rules();
        for (key, color) in DEFAULT_SLOTS {
            assert!(css.contains(&format!(".{} {{ fill: {}; }}", key, color)));
        }
    }
}
