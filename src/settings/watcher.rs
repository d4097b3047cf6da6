//! Synchronized settings file watcher.
//!
//! Watches the directory holding the synchronized settings file and forwards
//! modify/create events for that file to the event loop as
//! [`ExternalChange`] values. The loop decides whether the content actually
//! differs from what it holds.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::Sender;
use notify::{Config as NotifyConfig, Event, PollWatcher, RecursiveMode, Watcher};

use super::backend::ExternalChange;
use crate::core::errors::{MeroError, Result};

/// Poll interval used when the native watcher backend is unavailable.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Keeps a filesystem watcher alive for the lifetime of the backend.
pub struct SettingsWatcher {
    _watcher: Box<dyn Watcher + Send>,
    path: PathBuf,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn make_event_handler(
    filename: OsString,
    path: PathBuf,
    tx: Sender<ExternalChange>,
) -> impl Fn(std::result::Result<Event, notify::Error>) + Send + 'static {
    move |result| match result {
        Ok(event) => {
            // Create covers atomic replace-by-rename.
            if !matches!(
                event.kind,
                notify::EventKind::Modify(_) | notify::EventKind::Create(_)
            ) {
                return;
            }
            let touches_file = event
                .paths
                .iter()
                .any(|p| p.file_name().is_some_and(|f| f == filename));
            if !touches_file {
                return;
            }
            tracing::debug!(path = %path.display(), "synchronized settings file changed");
            if tx
                .send(ExternalChange {
                    source: path.display().to_string(),
                })
                .is_err()
            {
                tracing::debug!("settings change receiver dropped");
            }
        }
        Err(e) => tracing::warn!(error = %e, "settings watcher error"),
    }
}

impl SettingsWatcher {
    /// Start watching `settings_path`.
    ///
    /// Prefers the platform-native watcher and falls back to polling when it
    /// cannot be created (containers, network filesystems).
    pub fn new(settings_path: &Path, tx: Sender<ExternalChange>) -> Result<Self> {
        let parent = settings_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| MeroError::Watch {
                details: format!("{} has no parent directory", settings_path.display()),
            })?;
        let parent = parent
            .canonicalize()
            .map_err(|e| MeroError::io(parent, e))?;
        let filename = settings_path
            .file_name()
            .ok_or_else(|| MeroError::Watch {
                details: format!("{} has no file name", settings_path.display()),
            })?
            .to_os_string();
        let path = parent.join(&filename);

        let mut watcher = Self::create_watcher(&filename, &path, tx)?;
        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| MeroError::Watch {
                details: format!("failed to watch {}: {e}", parent.display()),
            })?;

        tracing::info!(path = %path.display(), "watching synchronized settings");
        Ok(Self {
            _watcher: watcher,
            path,
        })
    }

    fn create_watcher(
        filename: &OsString,
        path: &Path,
        tx: Sender<ExternalChange>,
    ) -> Result<Box<dyn Watcher + Send>> {
        let handler = make_event_handler(filename.clone(), path.to_path_buf(), tx.clone());
        match notify::recommended_watcher(handler) {
            Ok(w) => Ok(Box::new(w)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "native watcher unavailable, falling back to polling"
                );
                let fallback = make_event_handler(filename.clone(), path.to_path_buf(), tx);
                let poll = PollWatcher::new(
                    fallback,
                    NotifyConfig::default().with_poll_interval(POLL_INTERVAL),
                )
                .map_err(|e| MeroError::Watch {
                    details: e.to_string(),
                })?;
                Ok(Box::new(poll))
            }
        }
    }

    /// Canonical path of the watched file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
