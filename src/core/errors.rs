//! MERO-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, MeroError>;

/// Top-level error type for the new-tab core.
///
/// None of these escape the settings store or the bookmark adapter; both
/// convert failures into logged fallbacks. They do reach the CLI.
#[derive(Debug, Error)]
pub enum MeroError {
    #[error("[MERO-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[MERO-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[MERO-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[MERO-1101] unknown setting: {key}")]
    UnknownSetting { key: String },

    #[error("[MERO-1102] invalid value for setting {key}: {details}")]
    InvalidSetting { key: String, details: String },

    #[error("[MERO-2001] persistence failure in {backend} backend: {details}")]
    Persistence {
        backend: &'static str,
        details: String,
    },

    #[error("[MERO-2002] corrupt stored settings: {details}")]
    CorruptSettings { details: String },

    #[error("[MERO-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[MERO-3001] bookmark provider unavailable: {details}")]
    ProviderUnavailable { details: String },

    #[error("[MERO-3002] bookmark not found: {id}")]
    BookmarkNotFound { id: String },

    #[error("[MERO-3003] bookmark move of {id} rejected: {reason}")]
    MoveFailed { id: String, reason: String },

    #[error("[MERO-3101] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[MERO-3102] settings watcher failure: {details}")]
    Watch { details: String },
}

impl MeroError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "MERO-1001",
            Self::MissingConfig { .. } => "MERO-1002",
            Self::ConfigParse { .. } => "MERO-1003",
            Self::UnknownSetting { .. } => "MERO-1101",
            Self::InvalidSetting { .. } => "MERO-1102",
            Self::Persistence { .. } => "MERO-2001",
            Self::CorruptSettings { .. } => "MERO-2002",
            Self::Serialization { .. } => "MERO-2101",
            Self::ProviderUnavailable { .. } => "MERO-3001",
            Self::BookmarkNotFound { .. } => "MERO-3002",
            Self::MoveFailed { .. } => "MERO-3003",
            Self::Io { .. } => "MERO-3101",
            Self::Watch { .. } => "MERO-3102",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::Persistence { .. }
                | Self::ProviderUnavailable { .. }
                | Self::Watch { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for MeroError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for MeroError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<MeroError> {
        vec![
            MeroError::InvalidConfig {
                details: String::new(),
            },
            MeroError::MissingConfig {
                path: PathBuf::new(),
            },
            MeroError::ConfigParse {
                context: "",
                details: String::new(),
            },
            MeroError::UnknownSetting { key: String::new() },
            MeroError::InvalidSetting {
                key: String::new(),
                details: String::new(),
            },
            MeroError::Persistence {
                backend: "",
                details: String::new(),
            },
            MeroError::CorruptSettings {
                details: String::new(),
            },
            MeroError::Serialization {
                context: "",
                details: String::new(),
            },
            MeroError::ProviderUnavailable {
                details: String::new(),
            },
            MeroError::BookmarkNotFound { id: String::new() },
            MeroError::MoveFailed {
                id: String::new(),
                reason: String::new(),
            },
            MeroError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            MeroError::Watch {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = all_variants();
        let codes: Vec<&str> = errors.iter().map(MeroError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_mero_prefix() {
        for err in &all_variants() {
            assert!(
                err.code().starts_with("MERO-"),
                "code {} must start with MERO-",
                err.code()
            );
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = MeroError::InvalidSetting {
            key: "uiScale".to_string(),
            details: "expected a number".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MERO-1102"), "missing code: {msg}");
        assert!(msg.contains("uiScale"), "missing key: {msg}");
    }

    #[test]
    fn retryable_errors_are_correct() {
        assert!(
            MeroError::Persistence {
                backend: "local",
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            MeroError::ProviderUnavailable {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(!MeroError::UnknownSetting { key: String::new() }.is_retryable());
        assert!(
            !MeroError::CorruptSettings {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            !MeroError::MoveFailed {
                id: String::new(),
                reason: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = MeroError::io(
            "/tmp/settings.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "MERO-3101");
        assert!(err.to_string().contains("/tmp/settings.json"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: MeroError = json_err.into();
        assert_eq!(err.code(), "MERO-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: MeroError = toml_err.into();
        assert_eq!(err.code(), "MERO-1003");
    }
}
