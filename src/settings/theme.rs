//! Fixed palette table and the preset/custom color reconciliation.
//!
//! Presets are applied only when a theme is explicitly selected. Editing a
//! color directly flips the record to `custom`, and nothing re-applies a
//! preset afterwards, so the edit survives every later settings pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::{SettingKey, SettingsRecord};
use crate::core::errors::{MeroError, Result};

/// Named theme, or `Custom` for user-picked colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Everforest,
    Gruvbox,
    Dracula,
    Peach,
    Sea,
    Black,
    Custom,
}

/// Background/foreground/accent bundle of a named theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreset {
    /// Page background.
    pub background: &'static str,
    /// Text color.
    pub foreground: &'static str,
    /// Highlight color.
    pub accent: &'static str,
}

impl ThemePreset {
    const fn new(background: &'static str, foreground: &'static str, accent: &'static str) -> Self {
        Self {
            background,
            foreground,
            accent,
        }
    }

    /// Palette of the default theme.
    pub const DARK: Self = Self::new("#1f1f23", "#ffffff", "#ffffff");
    const LIGHT: Self = Self::new("#ffffff", "#000000", "#000000");
    const EVERFOREST: Self = Self::new("#2d353b", "#d3c6aa", "#a7c080");
    const GRUVBOX: Self = Self::new("#282828", "#ebdbb2", "#fabd2f");
    const DRACULA: Self = Self::new("#282a36", "#f8f8f2", "#bd93f9");
    const PEACH: Self = Self::new("#FCF8F8", "#433434", "#F5AFAF");
    const SEA: Self = Self::new("#09637E", "#EBF4F6", "#7AB2B2");
    const BLACK: Self = Self::new("#000000", "#ffffff", "#ffffff");
}

impl Theme {
    /// Every selectable theme, presets first.
    pub const ALL: [Self; 9] = [
        Self::Dark,
        Self::Light,
        Self::Everforest,
        Self::Gruvbox,
        Self::Dracula,
        Self::Peach,
        Self::Sea,
        Self::Black,
        Self::Custom,
    ];

    /// Palette for a named theme; `None` for `Custom`.
    #[must_use]
    pub const fn preset(self) -> Option<ThemePreset> {
        match self {
            Self::Dark => Some(ThemePreset::DARK),
            Self::Light => Some(ThemePreset::LIGHT),
            Self::Everforest => Some(ThemePreset::EVERFOREST),
            Self::Gruvbox => Some(ThemePreset::GRUVBOX),
            Self::Dracula => Some(ThemePreset::DRACULA),
            Self::Peach => Some(ThemePreset::PEACH),
            Self::Sea => Some(ThemePreset::SEA),
            Self::Black => Some(ThemePreset::BLACK),
            Self::Custom => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Everforest => "everforest",
            Self::Gruvbox => "gruvbox",
            Self::Dracula => "dracula",
            Self::Peach => "peach",
            Self::Sea => "sea",
            Self::Black => "black",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = MeroError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MeroError::InvalidSetting {
                key: SettingKey::Theme.as_str().to_string(),
                details: format!("unknown theme {wanted:?}"),
            })
    }
}

/// One of the three preset-controlled color fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ColorField {
    Background,
    Foreground,
    Accent,
}

impl ColorField {
    /// The color field behind a setting key, if it is one.
    #[must_use]
    pub const fn from_key(key: SettingKey) -> Option<Self> {
        match key {
            SettingKey::BackgroundColor => Some(Self::Background),
            SettingKey::ForegroundColor => Some(Self::Foreground),
            SettingKey::AccentColor => Some(Self::Accent),
            _ => None,
        }
    }

    #[must_use]
    pub const fn key(self) -> SettingKey {
        match self {
            Self::Background => SettingKey::BackgroundColor,
            Self::Foreground => SettingKey::ForegroundColor,
            Self::Accent => SettingKey::AccentColor,
        }
    }
}

impl SettingsRecord {
    /// Select a theme. A named preset overwrites the three color fields;
    /// `Custom` keeps whatever colors the record already has.
    pub fn apply_preset(&mut self, theme: Theme) {
        self.theme = theme;
        if let Some(preset) = theme.preset() {
            preset.background.clone_into(&mut self.background_color);
            preset.foreground.clone_into(&mut self.foreground_color);
            preset.accent.clone_into(&mut self.accent_color);
        }
    }

    /// Edit one color directly. The record becomes `custom`.
    pub fn set_custom_color(&mut self, field: ColorField, value: &str) {
        self.theme = Theme::Custom;
        let slot = match field {
            ColorField::Background => &mut self.background_color,
            ColorField::Foreground => &mut self.foreground_color,
            ColorField::Accent => &mut self.accent_color,
        };
        value.clone_into(slot);
    }

    /// Bring the colors in line with a named theme.
    ///
    /// Used once when a record is loaded, since older or hand-edited records
    /// can carry a preset name with stale colors. Returns whether anything
    /// changed.
    pub fn normalize_theme_colors(&mut self) -> bool {
        let Some(preset) = self.theme.preset() else {
            return false;
        };
        let stale = self.background_color != preset.background
            || self.foreground_color != preset.foreground
            || self.accent_color != preset.accent;
        if stale {
            self.apply_preset(self.theme);
        }
        stale
    }
}
