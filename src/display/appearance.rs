//! Presentation values derived from the settings record.

#![allow(missing_docs)]

use serde::Serialize;

use crate::settings::record::{DEFAULT_TAB_TITLE, FontFamily, SettingsRecord, TextAlign};

/// Stack used when a custom font is selected but left empty.
const FALLBACK_FONT: &str = "'Inter', sans-serif";

/// Everything the page needs to style itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appearance {
    pub background: String,
    pub foreground: String,
    pub accent: String,
    pub font_stack: String,
    pub scale: f64,
    pub secondary_scale: f64,
    pub folders_per_row: u32,
    pub separator_margin_px: u32,
    pub secondary_separator_margin_px: u32,
    /// Flexbox justification for the clock block.
    pub justify: &'static str,
    pub settings_trigger_opacity: f64,
    pub clock_opacity: f64,
    pub show_seconds: bool,
    pub show_icons: bool,
    /// Whether the custom font input is visible.
    pub custom_font_input: bool,
    pub tab_title: String,
}

impl Appearance {
    #[must_use]
    pub fn from_record(record: &SettingsRecord) -> Self {
        let font_stack = match record.font_family.css_stack() {
            Some(stack) => stack.to_string(),
            None if record.font_custom_value.trim().is_empty() => FALLBACK_FONT.to_string(),
            None => record.font_custom_value.trim().to_string(),
        };
        let tab_title = if record.tab_title.trim().is_empty() {
            DEFAULT_TAB_TITLE.to_string()
        } else {
            record.tab_title.clone()
        };
        Self {
            background: record.background_color.clone(),
            foreground: record.foreground_color.clone(),
            accent: record.accent_color.clone(),
            font_stack,
            scale: record.ui_scale,
            secondary_scale: record.secondary_scale,
            folders_per_row: record.folders_per_row.max(1),
            separator_margin_px: record.separator_margin,
            secondary_separator_margin_px: record.secondary_separator_margin,
            justify: justify(record.text_align),
            settings_trigger_opacity: record.settings_trigger_opacity.clamp(0.0, 1.0),
            clock_opacity: record.clock_opacity.clamp(0.0, 1.0),
            show_seconds: record.show_seconds,
            show_icons: record.show_icons,
            custom_font_input: record.font_family == FontFamily::Custom,
            tab_title,
        }
    }

    /// CSS custom properties in declaration order.
    #[must_use]
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--bg", self.background.clone()),
            ("--fg", self.foreground.clone()),
            ("--accent", self.accent.clone()),
            ("--font-main", self.font_stack.clone()),
            ("--scale", self.scale.to_string()),
            ("--sec-scale", self.secondary_scale.to_string()),
            ("--folders-per-row", self.folders_per_row.to_string()),
            ("--sep-margin", format!("{}px", self.separator_margin_px)),
            ("--sec-sep-margin", format!("{}px", self.secondary_separator_margin_px)),
            ("--text-align", self.justify.to_string()),
            ("--settings-trigger-opacity", self.settings_trigger_opacity.to_string()),
            ("--clock-opacity", self.clock_opacity.to_string()),
        ]
    }
}

/// Flexbox justification for an alignment.
#[must_use]
pub const fn justify(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Start => "flex-start",
        TextAlign::Center => "center",
        TextAlign::End => "flex-end",
    }
}

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse `#rgb` or `#rrggbb` (case-insensitive, `#` optional).
#[must_use]
pub fn parse_hex(color: &str) -> Option<Rgb> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| c.to_digit(16).and_then(|d| u8::try_from(d * 17).ok()));
            Some(Rgb {
                r: it.next()??,
                g: it.next()??,
                b: it.next()??,
            })
        }
        6 => Some(Rgb {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::theme::Theme;

    #[test]
    fn default_record_variables() {
        let vars = Appearance::from_record(&SettingsRecord::default()).css_variables();
        let get = |name: &str| vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v.clone());
        assert_eq!(vars.len(), 12);
        assert_eq!(get("--bg").as_deref(), Some("#1f1f23"));
        assert_eq!(get("--font-main").as_deref(), Some("'Inter', sans-serif"));
        assert_eq!(get("--sep-margin").as_deref(), Some("10px"));
        assert_eq!(get("--sec-sep-margin").as_deref(), Some("5px"));
        assert_eq!(get("--text-align").as_deref(), Some("flex-end"));
        assert_eq!(get("--clock-opacity").as_deref(), Some("0.85"));
    }

    #[test]
    fn custom_font_falls_back_when_empty() {
        let mut record = SettingsRecord {
            font_family: FontFamily::Custom,
            ..SettingsRecord::default()
        };
        let appearance = Appearance::from_record(&record);
        assert_eq!(appearance.font_stack, FALLBACK_FONT);
        assert!(appearance.custom_font_input);

        record.font_custom_value = "  'Fira Sans', sans-serif ".to_string();
        assert_eq!(Appearance::from_record(&record).font_stack, "'Fira Sans', sans-serif");
    }

    #[test]
    fn empty_tab_title_uses_default() {
        let record = SettingsRecord {
            tab_title: "   ".to_string(),
            ..SettingsRecord::default()
        };
        assert_eq!(Appearance::from_record(&record).tab_title, "Mero Tab");
    }

    #[test]
    fn alignment_maps_to_flex() {
        assert_eq!(justify(TextAlign::Start), "flex-start");
        assert_eq!(justify(TextAlign::Center), "center");
        assert_eq!(justify(TextAlign::End), "flex-end");
    }

    #[test]
    fn preset_colors_flow_through() {
        let mut record = SettingsRecord::default();
        record.apply_preset(Theme::Gruvbox);
        let appearance = Appearance::from_record(&record);
        assert_eq!(appearance.accent, "#fabd2f");
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("#1f1f23"), Some(Rgb { r: 31, g: 31, b: 35 }));
        assert_eq!(parse_hex("FCF8F8"), Some(Rgb { r: 252, g: 248, b: 248 }));
        assert_eq!(parse_hex("#fff"), Some(Rgb { r: 255, g: 255, b: 255 }));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("rgb(1,2,3)"), None);
        assert_eq!(parse_hex("#ééé"), None);
    }
}
