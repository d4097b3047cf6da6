//! The canonical settings record and its field-level update surface.
//!
//! # Merge Order
//!
//! ```text
//! compiled defaults → persisted keys (field by field)
//! ```
//!
//! Every field carries a compiled default and the struct is
//! `#[serde(default)]`, so a stored object with missing keys is completed
//! from the defaults and unknown keys are ignored. A stored value of the wrong
//! type fails the whole parse; callers treat that as "nothing stored".

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::theme::{Theme, ThemePreset};
use crate::core::errors::{MeroError, Result};

/// Tab title used when the stored one is empty.
pub const DEFAULT_TAB_TITLE: &str = "Mero Tab";

// ──────────────────── record ────────────────────

/// Every user-configurable display/behavior option.
///
/// Persisted as a flat JSON object with camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsRecord {
    /// Named preset, or `custom` when the colors were edited directly.
    pub theme: Theme,
    pub background_color: String,
    pub foreground_color: String,
    pub accent_color: String,
    pub font_family: FontFamily,
    /// CSS font stack used when `font_family` is `custom`.
    pub font_custom_value: String,
    pub ui_scale: f64,
    pub secondary_scale: f64,
    pub folders_per_row: u32,
    pub show_seconds: bool,
    pub show_icons: bool,
    /// Replaces real bookmarks with a synthetic tree and freezes the clock.
    pub test_mode: bool,
    /// Newline-separated lowercase folder titles, in display order.
    pub folder_order: String,
    pub tab_title: String,
    /// Pixels.
    pub separator_margin: u32,
    /// Pixels.
    pub secondary_separator_margin: u32,
    pub text_align: TextAlign,
    pub settings_trigger_opacity: f64,
    pub clock_opacity: f64,
    pub clock_format: ClockFormat,
    /// Name appended to the greeting, if the user set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting_name: Option<String>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        let preset = ThemePreset::DARK;
        Self {
            theme: Theme::Dark,
            background_color: preset.background.to_string(),
            foreground_color: preset.foreground.to_string(),
            accent_color: preset.accent.to_string(),
            font_family: FontFamily::default(),
            font_custom_value: String::new(),
            ui_scale: 1.0,
            secondary_scale: 0.4,
            folders_per_row: 3,
            show_seconds: false,
            show_icons: true,
            test_mode: false,
            folder_order: String::new(),
            tab_title: DEFAULT_TAB_TITLE.to_string(),
            separator_margin: 10,
            secondary_separator_margin: 5,
            text_align: TextAlign::default(),
            settings_trigger_opacity: 0.4,
            clock_opacity: 0.85,
            clock_format: ClockFormat::default(),
            greeting_name: None,
        }
    }
}

// ──────────────────── enums ────────────────────

/// Font selection. Everything except `Custom` maps to a fixed CSS stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Inter,
    System,
    Serif,
    Monospace,
    Custom,
}

impl FontFamily {
    pub const ALL: [Self; 5] = [
        Self::Inter,
        Self::System,
        Self::Serif,
        Self::Monospace,
        Self::Custom,
    ];

    /// CSS font stack, `None` for `Custom`.
    #[must_use]
    pub const fn css_stack(self) -> Option<&'static str> {
        match self {
            Self::Inter => Some("'Inter', sans-serif"),
            Self::System => Some("system-ui, -apple-system, sans-serif"),
            Self::Serif => Some("Georgia, 'Times New Roman', serif"),
            Self::Monospace => Some("'JetBrains Mono', monospace"),
            Self::Custom => None,
        }
    }
}

/// Horizontal alignment of the clock/greeting block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[serde(alias = "left")]
    Start,
    Center,
    #[default]
    #[serde(alias = "right")]
    End,
}

/// Hour display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockFormat {
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inter => write!(f, "inter"),
            Self::System => write!(f, "system"),
            Self::Serif => write!(f, "serif"),
            Self::Monospace => write!(f, "monospace"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Center => write!(f, "center"),
            Self::End => write!(f, "end"),
        }
    }
}

impl fmt::Display for ClockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwentyFourHour => write!(f, "24h"),
            Self::TwelveHour => write!(f, "12h"),
        }
    }
}

// ──────────────────── keys ────────────────────

/// When a change to a key is written to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Continuous controls (sliders, color pickers, free text).
    Debounced,
    /// Discrete controls (selects, toggles, committed text).
    Immediate,
}

impl SaveMode {
    #[must_use]
    pub const fn is_immediate(self) -> bool {
        matches!(self, Self::Immediate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    OptionalText,
    Choice,
    Bool,
    Integer,
    Float,
}

/// Name of one field of [`SettingsRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SettingKey {
    Theme,
    BackgroundColor,
    ForegroundColor,
    AccentColor,
    FontFamily,
    FontCustomValue,
    UiScale,
    SecondaryScale,
    FoldersPerRow,
    ShowSeconds,
    ShowIcons,
    TestMode,
    FolderOrder,
    TabTitle,
    SeparatorMargin,
    SecondarySeparatorMargin,
    TextAlign,
    SettingsTriggerOpacity,
    ClockOpacity,
    ClockFormat,
    GreetingName,
}

impl SettingKey {
    pub const ALL: [Self; 21] = [
        Self::Theme,
        Self::BackgroundColor,
        Self::ForegroundColor,
        Self::AccentColor,
        Self::FontFamily,
        Self::FontCustomValue,
        Self::UiScale,
        Self::SecondaryScale,
        Self::FoldersPerRow,
        Self::ShowSeconds,
        Self::ShowIcons,
        Self::TestMode,
        Self::FolderOrder,
        Self::TabTitle,
        Self::SeparatorMargin,
        Self::SecondarySeparatorMargin,
        Self::TextAlign,
        Self::SettingsTriggerOpacity,
        Self::ClockOpacity,
        Self::ClockFormat,
        Self::GreetingName,
    ];

    /// Persisted key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::BackgroundColor => "backgroundColor",
            Self::ForegroundColor => "foregroundColor",
            Self::AccentColor => "accentColor",
            Self::FontFamily => "fontFamily",
            Self::FontCustomValue => "fontCustomValue",
            Self::UiScale => "uiScale",
            Self::SecondaryScale => "secondaryScale",
            Self::FoldersPerRow => "foldersPerRow",
            Self::ShowSeconds => "showSeconds",
            Self::ShowIcons => "showIcons",
            Self::TestMode => "testMode",
            Self::FolderOrder => "folderOrder",
            Self::TabTitle => "tabTitle",
            Self::SeparatorMargin => "separatorMargin",
            Self::SecondarySeparatorMargin => "secondarySeparatorMargin",
            Self::TextAlign => "textAlign",
            Self::SettingsTriggerOpacity => "settingsTriggerOpacity",
            Self::ClockOpacity => "clockOpacity",
            Self::ClockFormat => "clockFormat",
            Self::GreetingName => "greetingName",
        }
    }

    /// Save policy for edits to this key.
    #[must_use]
    pub const fn save_mode(self) -> SaveMode {
        match self {
            Self::BackgroundColor
            | Self::ForegroundColor
            | Self::AccentColor
            | Self::FontCustomValue
            | Self::UiScale
            | Self::SecondaryScale
            | Self::FoldersPerRow
            | Self::SeparatorMargin
            | Self::SecondarySeparatorMargin
            | Self::SettingsTriggerOpacity
            | Self::ClockOpacity => SaveMode::Debounced,
            Self::Theme
            | Self::FontFamily
            | Self::ShowSeconds
            | Self::ShowIcons
            | Self::TestMode
            | Self::FolderOrder
            | Self::TabTitle
            | Self::TextAlign
            | Self::ClockFormat
            | Self::GreetingName => SaveMode::Immediate,
        }
    }

    /// Whether a change to this key invalidates the rendered bookmark grid.
    #[must_use]
    pub const fn affects_bookmarks(self) -> bool {
        matches!(self, Self::ShowIcons | Self::TestMode | Self::FolderOrder)
    }

    const fn kind(self) -> ValueKind {
        match self {
            Self::Theme | Self::FontFamily | Self::TextAlign | Self::ClockFormat => {
                ValueKind::Choice
            }
            Self::BackgroundColor
            | Self::ForegroundColor
            | Self::AccentColor
            | Self::FontCustomValue
            | Self::FolderOrder
            | Self::TabTitle => ValueKind::Text,
            Self::GreetingName => ValueKind::OptionalText,
            Self::ShowSeconds | Self::ShowIcons | Self::TestMode => ValueKind::Bool,
            Self::FoldersPerRow | Self::SeparatorMargin | Self::SecondarySeparatorMargin => {
                ValueKind::Integer
            }
            Self::UiScale
            | Self::SecondaryScale
            | Self::SettingsTriggerOpacity
            | Self::ClockOpacity => ValueKind::Float,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = MeroError;

    /// Accepts the persisted camelCase name as well as snake_case and
    /// kebab-case spellings.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| MeroError::UnknownSetting { key: s.to_string() })
    }
}

// ──────────────────── field access ────────────────────

impl SettingsRecord {
    /// Parse a persisted JSON value into a complete record.
    pub fn from_stored(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| MeroError::CorruptSettings {
            details: e.to_string(),
        })
    }

    /// Serialize to the flat persisted object.
    pub fn to_stored(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Current value of one field as JSON (`null` for an unset optional).
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Value {
        self.to_stored()
            .ok()
            .and_then(|v| v.get(key.as_str()).cloned())
            .unwrap_or(Value::Null)
    }

    /// Current value of one field rendered for humans (no JSON quoting).
    #[must_use]
    pub fn get_display(&self, key: SettingKey) -> String {
        match self.get(key) {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Overwrite one field from its textual form.
    ///
    /// The record is left untouched when the value does not parse or is out
    /// of range. This is a raw field write: it does not switch the theme to
    /// `custom` or apply presets; see the theme helpers for that.
    pub fn set_from_str(&mut self, key: SettingKey, raw: &str) -> Result<()> {
        let parsed = parse_raw(key, raw)?;
        let Value::Object(mut map) = self.to_stored()? else {
            return Err(MeroError::Serialization {
                context: "settings record",
                details: "record did not serialize to an object".to_string(),
            });
        };
        if parsed.is_null() {
            map.remove(key.as_str());
        } else {
            map.insert(key.as_str().to_string(), parsed);
        }
        let next: Self =
            serde_json::from_value(Value::Object(map)).map_err(|e| MeroError::InvalidSetting {
                key: key.as_str().to_string(),
                details: e.to_string(),
            })?;
        next.check_range(key)?;
        *self = next;
        Ok(())
    }

    /// Every field with its current value, in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(SettingKey, Value)> {
        let map = match self.to_stored() {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        SettingKey::ALL
            .into_iter()
            .map(|key| (key, map.get(key.as_str()).cloned().unwrap_or(Value::Null)))
            .collect()
    }

    fn check_range(&self, key: SettingKey) -> Result<()> {
        let fail = |details: String| {
            Err(MeroError::InvalidSetting {
                key: key.as_str().to_string(),
                details,
            })
        };
        match key {
            SettingKey::UiScale if self.ui_scale <= 0.0 => {
                fail(format!("must be > 0, got {}", self.ui_scale))
            }
            SettingKey::SecondaryScale if self.secondary_scale <= 0.0 => {
                fail(format!("must be > 0, got {}", self.secondary_scale))
            }
            SettingKey::FoldersPerRow if self.folders_per_row == 0 => {
                fail("must be >= 1".to_string())
            }
            SettingKey::SettingsTriggerOpacity
                if !(0.0..=1.0).contains(&self.settings_trigger_opacity) =>
            {
                fail(format!(
                    "must be in [0, 1], got {}",
                    self.settings_trigger_opacity
                ))
            }
            SettingKey::ClockOpacity if !(0.0..=1.0).contains(&self.clock_opacity) => {
                fail(format!("must be in [0, 1], got {}", self.clock_opacity))
            }
            _ => Ok(()),
        }
    }
}

fn parse_raw(key: SettingKey, raw: &str) -> Result<Value> {
    let invalid = |details: String| MeroError::InvalidSetting {
        key: key.as_str().to_string(),
        details,
    };
    let trimmed = raw.trim();
    match key.kind() {
        ValueKind::Text => Ok(Value::String(raw.to_string())),
        ValueKind::OptionalText if trimmed.is_empty() => Ok(Value::Null),
        ValueKind::OptionalText => Ok(Value::String(trimmed.to_string())),
        ValueKind::Choice => Ok(Value::String(trimmed.to_ascii_lowercase())),
        ValueKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "off" | "no" | "0" => Ok(Value::Bool(false)),
            other => Err(invalid(format!("expected a boolean, got {other:?}"))),
        },
        ValueKind::Integer => trimmed
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|e| invalid(format!("expected a non-negative integer: {e}"))),
        ValueKind::Float => {
            let n = trimmed
                .parse::<f64>()
                .map_err(|e| invalid(format!("expected a number: {e}")))?;
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| invalid(format!("{n} is not a finite number")))
        }
    }
}

// ──────────────────── tests ────────────────────
