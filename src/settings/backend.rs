//! Persistence backends for the settings record.
//!
//! Two kinds exist: a synchronized store (changes can arrive from other
//! processes or devices, announced through [`SettingsBackend::subscribe`]) and
//! a local unsynchronized store. The store picks one at startup with
//! [`select_backend`].
//!
//! Backends report failures as [`MeroError`]; the settings store is the
//! boundary that turns them into logged fallbacks.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use serde_json::Value;

use super::record::SettingsRecord;
use crate::core::atomic::write_json_atomic;
use crate::core::config::StorageConfig;
use crate::core::errors::{MeroError, Result};

/// Whether a backend can observe writes made elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Shared across processes/devices; external changes are announced.
    Synced,
    /// Private to this installation.
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Notification that persisted settings changed outside this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalChange {
    /// Where the change was observed (file path, peer handle).
    pub source: String,
}

/// Key-value persistence for a [`SettingsRecord`].
pub trait SettingsBackend: Send {
    /// Synced or local.
    fn kind(&self) -> BackendKind;

    /// Human-readable location, for logs and `mero settings path`.
    fn describe(&self) -> String;

    /// Raw stored object, `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<Value>>;

    /// Persist the full record.
    fn write(&mut self, record: &SettingsRecord) -> Result<()>;

    /// Channel of external-change notifications. `Ok(None)` for backends
    /// that cannot observe foreign writes.
    fn subscribe(&mut self) -> Result<Option<Receiver<ExternalChange>>> {
        Ok(None)
    }
}

// ──────────────────── JSON file ────────────────────

fn read_json_file(path: &Path) -> Result<Option<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        // Binary garbage / invalid UTF-8 is corrupt content, not an I/O error.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(MeroError::CorruptSettings {
                details: format!("{}: {e}", path.display()),
            });
        }
        Err(e) => return Err(MeroError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| MeroError::CorruptSettings {
            details: format!("{}: {e}", path.display()),
        })
}

/// Local unsynchronized store: one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for JsonFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Option<Value>> {
        read_json_file(&self.path)
    }

    fn write(&mut self, record: &SettingsRecord) -> Result<()> {
        write_json_atomic(record, &self.path)
    }
}

/// Synchronized store: a JSON file inside a directory that some other tool
/// keeps in sync across machines. Foreign writes are picked up by watching
/// the file.
pub struct SyncedFileBackend {
    path: PathBuf,
    #[cfg(feature = "watcher")]
    watcher: Option<super::watcher::SettingsWatcher>,
}

impl fmt::Debug for SyncedFileBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedFileBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SyncedFileBackend {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            #[cfg(feature = "watcher")]
            watcher: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for SyncedFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Synced
    }

    fn describe(&self) -> String {
        format!("{} (synced)", self.path.display())
    }

    fn read(&self) -> Result<Option<Value>> {
        read_json_file(&self.path)
    }

    fn write(&mut self, record: &SettingsRecord) -> Result<()> {
        write_json_atomic(record, &self.path)
    }

    #[cfg(feature = "watcher")]
    fn subscribe(&mut self) -> Result<Option<Receiver<ExternalChange>>> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.watcher = Some(super::watcher::SettingsWatcher::new(&self.path, tx)?);
        Ok(Some(rx))
    }

    #[cfg(not(feature = "watcher"))]
    fn subscribe(&mut self) -> Result<Option<Receiver<ExternalChange>>> {
        tracing::warn!("built without the watcher feature; external settings changes are not observed");
        Ok(None)
    }
}

// ──────────────────── in-process shared store ────────────────────

#[derive(Debug, Default)]
struct SharedStore {
    value: Option<Value>,
    writes: usize,
    failing: bool,
    next_handle: u64,
    listeners: Vec<(u64, Sender<ExternalChange>)>,
}

impl SharedStore {
    fn publish(&mut self, writer: u64) {
        let change = ExternalChange {
            source: format!("handle-{writer}"),
        };
        self.listeners
            .retain(|(id, tx)| *id == writer || tx.send(change.clone()).is_ok());
    }
}

/// In-process key-value store. Handles created with
/// [`MemoryBackend::handle`] share one value, and in synced mode each
/// handle's writes are announced to the other handles' subscribers.
#[derive(Debug)]
pub struct MemoryBackend {
    shared: Arc<Mutex<SharedStore>>,
    id: u64,
    kind: BackendKind,
}

impl MemoryBackend {
    /// Fresh empty store whose handles see each other's writes.
    #[must_use]
    pub fn synced() -> Self {
        Self::fresh(BackendKind::Synced)
    }

    /// Fresh empty store without change notification.
    #[must_use]
    pub fn local() -> Self {
        Self::fresh(BackendKind::Local)
    }

    fn fresh(kind: BackendKind) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SharedStore::default())),
            id: 0,
            kind,
        }
    }

    /// Another handle on the same underlying store (another "device").
    #[must_use]
    pub fn handle(&self) -> Self {
        let id = {
            let mut shared = self.shared.lock();
            shared.next_handle += 1;
            shared.next_handle
        };
        Self {
            shared: Arc::clone(&self.shared),
            id,
            kind: self.kind,
        }
    }

    /// Store a raw object as if written by this handle.
    pub fn put_raw(&self, value: Value) {
        let mut shared = self.shared.lock();
        shared.value = Some(value);
        shared.writes += 1;
        if self.kind == BackendKind::Synced {
            shared.publish(self.id);
        }
    }

    /// Currently stored object.
    #[must_use]
    pub fn stored(&self) -> Option<Value> {
        self.shared.lock().value.clone()
    }

    /// Total writes across all handles.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.shared.lock().writes
    }

    /// Make every read and write fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.shared.lock().failing = failing;
    }

    fn check_available(&self) -> Result<()> {
        if self.shared.lock().failing {
            return Err(MeroError::Persistence {
                backend: "memory",
                details: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl SettingsBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn describe(&self) -> String {
        format!("memory ({}, handle {})", self.kind, self.id)
    }

    fn read(&self) -> Result<Option<Value>> {
        self.check_available()?;
        Ok(self.stored())
    }

    fn write(&mut self, record: &SettingsRecord) -> Result<()> {
        self.check_available()?;
        self.put_raw(record.to_stored()?);
        Ok(())
    }

    fn subscribe(&mut self) -> Result<Option<Receiver<ExternalChange>>> {
        if self.kind != BackendKind::Synced {
            return Ok(None);
        }
        let (tx, rx) = crossbeam_channel::unbounded();
        self.shared.lock().listeners.push((self.id, tx));
        Ok(Some(rx))
    }
}

// ──────────────────── selection ────────────────────

/// Pick the synchronized store when it is configured and its directory is
/// reachable, the local store otherwise.
#[must_use]
pub fn select_backend(config: &StorageConfig) -> Box<dyn SettingsBackend> {
    if let Some(sync_file) = &config.sync_file {
        let reachable = sync_file
            .parent()
            .is_some_and(|dir| dir.as_os_str().is_empty() || dir.is_dir());
        if reachable {
            tracing::debug!(path = %sync_file.display(), "using synchronized settings store");
            return Box::new(SyncedFileBackend::new(sync_file.clone()));
        }
        tracing::warn!(
            path = %sync_file.display(),
            "synchronized settings directory unavailable, using local store"
        );
    }
    Box::new(JsonFileBackend::new(config.settings_file.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_backend_missing_file_reads_none() {
        let backend = JsonFileBackend::new(PathBuf::from("/nonexistent/mero/settings.json"));
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonFileBackend::new(dir.path().join("settings.json"));
        let record = SettingsRecord {
            folders_per_row: 4,
            ..Default::default()
        };
        backend.write(&record).unwrap();
        let stored = backend.read().unwrap().unwrap();
        assert_eq!(stored["foldersPerRow"], 4);
        assert_eq!(SettingsRecord::from_stored(stored).unwrap(), record);
    }

    #[test]
    fn file_backend_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not valid json {{{").unwrap();
        let err = JsonFileBackend::new(path).read().unwrap_err();
        assert!(matches!(err, MeroError::CorruptSettings { .. }));
    }

    #[test]
    fn memory_handles_share_value_and_notify_peers() {
        let mut first = MemoryBackend::synced();
        let mut second = first.handle();
        let first_rx = first.subscribe().unwrap().unwrap();
        let second_rx = second.subscribe().unwrap().unwrap();

        second.write(&SettingsRecord::default()).unwrap();

        assert!(first.read().unwrap().is_some());
        assert_eq!(first_rx.try_recv().unwrap().source, "handle-1");
        assert!(second_rx.try_recv().is_err(), "writer is not notified");
        assert_eq!(first.write_count(), 1);
    }

    #[test]
    fn local_memory_backend_has_no_subscription() {
        let mut backend = MemoryBackend::local();
        assert!(backend.subscribe().unwrap().is_none());
        backend.put_raw(json!({"showIcons": false}));
        assert_eq!(backend.stored().unwrap()["showIcons"], false);
    }

    #[test]
    fn failing_memory_backend_errors() {
        let mut backend = MemoryBackend::local();
        backend.set_failing(true);
        assert!(backend.read().is_err());
        assert!(backend.write(&SettingsRecord::default()).is_err());
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn selection_prefers_reachable_sync_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            settings_file: dir.path().join("local.json"),
            sync_file: Some(dir.path().join("synced.json")),
            save_debounce_ms: 300,
        };
        assert_eq!(select_backend(&config).kind(), BackendKind::Synced);
    }

    #[test]
    fn selection_falls_back_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            settings_file: dir.path().join("local.json"),
            sync_file: Some(PathBuf::from("/nonexistent/sync/mero.json")),
            save_debounce_ms: 300,
        };
        let backend = select_backend(&config);
        assert_eq!(backend.kind(), BackendKind::Local);
        assert!(backend.describe().ends_with("local.json"));
    }
}
