//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{MeroError, Result};

/// Full application configuration model.
///
/// This is operator configuration (where things live, timing knobs). The
/// user-facing appearance options are the separate
/// [`SettingsRecord`](crate::settings::record::SettingsRecord).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub bookmarks: BookmarksConfig,
    pub test_mode: TestModeConfig,
    pub runtime: RuntimeConfig,
    pub paths: PathsConfig,
}

/// Where settings are persisted and how writes are coalesced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Local, unsynchronized settings store.
    pub settings_file: PathBuf,
    /// Optional settings file inside a synchronized directory. Used in
    /// preference to `settings_file` when its directory exists.
    pub sync_file: Option<PathBuf>,
    /// Trailing-edge debounce window for continuous controls.
    pub save_debounce_ms: u64,
}

/// Bookmark source selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BookmarksConfig {
    /// Forest JSON or Chromium `Bookmarks` file. `None` = no provider.
    pub source: Option<PathBuf>,
}

/// Shape of the synthetic tree shown in test mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TestModeConfig {
    pub folder_count: usize,
    pub min_items: usize,
    pub max_items: usize,
}

/// Event-loop pacing for `mero watch`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tick_interval_ms: u64,
}

/// Filesystem paths used by mero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_file: config_dir().join("settings.json"),
            sync_file: None,
            save_debounce_ms: 300,
        }
    }
}

impl Default for TestModeConfig {
    fn default() -> Self {
        Self {
            folder_count: 6,
            min_items: 4,
            max_items: 8,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: config_dir().join("config.toml"),
        }
    }
}

fn config_dir() -> PathBuf {
    let home_dir = env::var_os("HOME").map_or_else(
        || {
            tracing::warn!("HOME not set, falling back to /tmp for mero paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    );
    home_dir.join(".config").join("mero")
}

impl StorageConfig {
    #[must_use]
    pub const fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

impl RuntimeConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| MeroError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(MeroError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MERO_SETTINGS_FILE") {
            self.storage.settings_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("MERO_SYNC_FILE") {
            self.storage.sync_file = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("MERO_SAVE_DEBOUNCE_MS") {
            self.storage.save_debounce_ms = parse_env_u64("MERO_SAVE_DEBOUNCE_MS", &raw)?;
        }
        if let Some(raw) = lookup("MERO_BOOKMARKS_FILE") {
            self.bookmarks.source = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("MERO_TEST_FOLDER_COUNT") {
            self.test_mode.folder_count = parse_env_usize("MERO_TEST_FOLDER_COUNT", &raw)?;
        }
        if let Some(raw) = lookup("MERO_TICK_INTERVAL_MS") {
            self.runtime.tick_interval_ms = parse_env_u64("MERO_TICK_INTERVAL_MS", &raw)?;
        }
        Ok(())
    }

    /// An empty `sync_file` in TOML means "no synchronized store".
    fn normalize_paths(&mut self) {
        if self
            .storage
            .sync_file
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.storage.sync_file = None;
        }
        if self
            .bookmarks
            .source
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.bookmarks.source = None;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage.save_debounce_ms > 10_000 {
            return Err(MeroError::InvalidConfig {
                details: format!(
                    "storage.save_debounce_ms must be <= 10000, got {}",
                    self.storage.save_debounce_ms
                ),
            });
        }
        if self.runtime.tick_interval_ms < 50 {
            return Err(MeroError::InvalidConfig {
                details: format!(
                    "runtime.tick_interval_ms must be >= 50, got {}",
                    self.runtime.tick_interval_ms
                ),
            });
        }
        if self.test_mode.folder_count == 0 {
            return Err(MeroError::InvalidConfig {
                details: "test_mode.folder_count must be >= 1".to_string(),
            });
        }
        if self.test_mode.min_items == 0 || self.test_mode.min_items > self.test_mode.max_items {
            return Err(MeroError::InvalidConfig {
                details: format!(
                    "test_mode item bounds must satisfy 1 <= min_items <= max_items, got {}..={}",
                    self.test_mode.min_items, self.test_mode.max_items
                ),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|error| MeroError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|error| MeroError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
