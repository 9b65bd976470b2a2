//! Built-in color presets

use crate::utils::Color;
use serde::Serialize;

/// A named quick-pick color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPreset {
    pub name: &'static str,
    pub emoji: &'static str,
    pub hex: &'static str,
    color: Color,
}

impl ColorPreset {
    const fn new(name: &'static str, emoji: &'static str, hex: &'static str, color: Color) -> Self {
        Self {
            name,
            emoji,
            hex,
            color,
        }
    }

    /// Display label, e.g. `🔥 Red`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
}

/// Presets in display order
pub const COLOR_PRESETS: [ColorPreset; 10] = [
    ColorPreset::new("Red", "🔥", "#FF3333", Color::new(0xFF, 0x33, 0x33)),
    ColorPreset::new("Blue", "🌊", "#0066CC", Color::new(0x00, 0x66, 0xCC)),
    ColorPreset::new("Green", "🌿", "#50C878", Color::new(0x50, 0xC8, 0x78)),
    ColorPreset::new("Pink", "🌸", "#FF6EC7", Color::new(0xFF, 0x6E, 0xC7)),
    ColorPreset::new("Orange", "🌅", "#FD5E53", Color::new(0xFD, 0x5E, 0x53)),
    ColorPreset::new("Purple", "💜", "#967BB6", Color::new(0x96, 0x7B, 0xB6)),
    ColorPreset::new("Black", "⚫", "#2C3E50", Color::new(0x2C, 0x3E, 0x50)),
    ColorPreset::new("White", "⚪", "#F8F8FF", Color::new(0xF8, 0xF8, 0xFF)),
    ColorPreset::new("Gold", "⭐", "#FFD700", Color::new(0xFF, 0xD7, 0x00)),
    ColorPreset::new("Silver", "💎", "#C0C0C0", Color::new(0xC0, 0xC0, 0xC0)),
];

/// Look a preset up by name or label, ignoring case
#[must_use]
pub fn find_preset(query: &str) -> Option<&'static ColorPreset> {
    let query = query.trim();
    COLOR_PRESETS.iter().find(|preset| {
        preset.name.eq_ignore_ascii_case(query) || preset.label().eq_ignore_ascii_case(query)
    })
}
