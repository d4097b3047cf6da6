//! The settings store: sole owner of the live [`SettingsRecord`].
//!
//! # Persistence Strategy
//!
//! Continuous controls schedule a trailing-edge debounced write; discrete
//! actions write immediately and supersede any scheduled write. Either way
//! the apply listeners run right away, so the presentation layer reflects
//! the intended state before the backend has it.
//!
//! # Error Philosophy
//!
//! Load errors: log + fall back to compiled defaults (never panic).
//! Save errors: log + drop (the UI already shows the intended state).
//!
//! Everything runs on the caller's event loop. The only cross-thread input is
//! the external-change channel, drained by
//! [`SettingsStore::check_external_changes`].

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use super::backend::{BackendKind, ExternalChange, SettingsBackend, select_backend};
use super::debounce::{DEFAULT_WINDOW, Debouncer};
use super::record::{SaveMode, SettingKey, SettingsRecord};
use super::theme::{ColorField, Theme};
use crate::core::config::StorageConfig;
use crate::core::errors::Result;

/// Callback receiving the current record.
pub type RecordListener = Box<dyn FnMut(&SettingsRecord)>;

/// Write counters, mostly for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Successful backend writes.
    pub writes: usize,
    /// Backend writes that failed and were dropped.
    pub failed_writes: usize,
    /// External changes adopted.
    pub external_reloads: usize,
}

/// Owns the settings record and mediates every read and write of it.
pub struct SettingsStore {
    record: SettingsRecord,
    backend: Box<dyn SettingsBackend>,
    debouncer: Debouncer,
    changes: Option<Receiver<ExternalChange>>,
    /// Last state known to be in the backend, written by us or adopted from
    /// an external change. Used to recognize echoes of our own writes.
    last_persisted: Option<SettingsRecord>,
    apply_listeners: Vec<RecordListener>,
    change_listeners: Vec<RecordListener>,
    stats: StoreStats,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("backend", &self.backend.describe())
            .field("record", &self.record)
            .field("pending", &self.debouncer.is_pending())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Store over `backend`, holding defaults until [`load`](Self::load).
    #[must_use]
    pub fn new(backend: Box<dyn SettingsBackend>) -> Self {
        Self {
            record: SettingsRecord::default(),
            backend,
            debouncer: Debouncer::new(DEFAULT_WINDOW),
            changes: None,
            last_persisted: None,
            apply_listeners: Vec::new(),
            change_listeners: Vec::new(),
            stats: StoreStats::default(),
        }
    }

    /// Store over the backend chosen by [`select_backend`].
    #[must_use]
    pub fn open(config: &StorageConfig) -> Self {
        Self::new(select_backend(config)).with_debounce(config.save_debounce())
    }

    /// Override the debounce window (useful for testing).
    #[must_use]
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debouncer = Debouncer::new(window);
        self
    }

    // ──────────────────── reading ────────────────────

    /// Read the backend and replace the live record with defaults overlaid
    /// by whatever was stored. Never fails.
    ///
    /// On a synchronized backend this also starts listening for external
    /// changes.
    pub fn load(&mut self) -> &SettingsRecord {
        self.record = match self.read_stored() {
            Ok(Some(record)) => {
                self.last_persisted = Some(record.clone());
                record
            }
            Ok(None) => {
                tracing::debug!(backend = %self.backend.describe(), "no stored settings, using defaults");
                SettingsRecord::default()
            }
            Err(e) => {
                tracing::warn!(
                    backend = %self.backend.describe(),
                    error = %e,
                    "could not load settings, using defaults"
                );
                SettingsRecord::default()
            }
        };
        self.debouncer.take();

        if self.changes.is_none() && self.backend.kind() == BackendKind::Synced {
            match self.backend.subscribe() {
                Ok(rx) => self.changes = rx,
                Err(e) => tracing::warn!(error = %e, "external settings changes will not be observed"),
            }
        }

        self.notify_apply();
        &self.record
    }

    fn read_stored(&self) -> Result<Option<SettingsRecord>> {
        let Some(value) = self.backend.read()? else {
            return Ok(None);
        };
        let mut record = SettingsRecord::from_stored(value)?;
        if record.normalize_theme_colors() {
            tracing::debug!(theme = %record.theme, "stored colors realigned with theme preset");
        }
        Ok(Some(record))
    }

    /// The live record.
    #[must_use]
    pub const fn record(&self) -> &SettingsRecord {
        &self.record
    }

    /// Owned copy of the live record.
    #[must_use]
    pub fn snapshot(&self) -> SettingsRecord {
        self.record.clone()
    }

    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    #[must_use]
    pub fn describe_backend(&self) -> String {
        self.backend.describe()
    }

    #[must_use]
    pub const fn stats(&self) -> StoreStats {
        self.stats
    }

    // ──────────────────── listeners ────────────────────

    /// Run `listener` after every load, save and adopted external change.
    pub fn on_apply(&mut self, listener: impl FnMut(&SettingsRecord) + 'static) {
        self.apply_listeners.push(Box::new(listener));
    }

    /// Run `listener` when an external change replaced the record.
    pub fn on_external_change(&mut self, listener: impl FnMut(&SettingsRecord) + 'static) {
        self.change_listeners.push(Box::new(listener));
    }

    fn notify_apply(&mut self) {
        for listener in &mut self.apply_listeners {
            listener(&self.record);
        }
    }

    // ──────────────────── writing ────────────────────

    /// Persist the live record, debounced unless `immediate`.
    pub fn save(&mut self, immediate: bool) {
        self.save_at(immediate, Instant::now());
    }

    /// [`save`](Self::save) with an explicit clock reading.
    pub fn save_at(&mut self, immediate: bool, now: Instant) {
        if immediate {
            // The immediate write carries the newest state, so a scheduled
            // write would only repeat it.
            self.debouncer.take();
            self.persist();
        } else {
            self.debouncer.request_at(now);
        }
        self.notify_apply();
    }

    /// Perform the scheduled write if it is due. Call from the event loop.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// [`poll`](Self::poll) with an explicit clock reading.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        if self.debouncer.due_at(now) {
            self.persist();
            return true;
        }
        false
    }

    /// Write a scheduled save now. Used on shutdown.
    pub fn flush(&mut self) -> bool {
        if self.debouncer.take() {
            self.persist();
            return true;
        }
        false
    }

    #[must_use]
    pub const fn is_save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the scheduled write becomes due, if any.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn persist(&mut self) -> bool {
        match self.backend.write(&self.record) {
            Ok(()) => {
                self.stats.writes += 1;
                self.last_persisted = Some(self.record.clone());
                tracing::debug!(backend = %self.backend.describe(), "settings saved");
                true
            }
            Err(e) => {
                self.stats.failed_writes += 1;
                tracing::error!(
                    backend = %self.backend.describe(),
                    error = %e,
                    "failed to save settings"
                );
                false
            }
        }
    }

    // ──────────────────── mutations ────────────────────

    /// Overwrite one field from text, saving with the key's [`SaveMode`].
    ///
    /// `theme` goes through [`apply_preset`](Self::apply_preset) and the
    /// color keys through [`set_custom_color`](Self::set_custom_color).
    pub fn update(&mut self, key: SettingKey, raw: &str) -> Result<SaveMode> {
        self.update_at(key, raw, Instant::now())
    }

    /// [`update`](Self::update) with an explicit clock reading.
    pub fn update_at(&mut self, key: SettingKey, raw: &str, now: Instant) -> Result<SaveMode> {
        if key == SettingKey::Theme {
            let theme: Theme = raw.parse()?;
            self.record.apply_preset(theme);
        } else if let Some(field) = ColorField::from_key(key) {
            self.record.set_custom_color(field, raw.trim());
        } else {
            self.record.set_from_str(key, raw)?;
        }
        let mode = key.save_mode();
        self.save_at(mode.is_immediate(), now);
        Ok(mode)
    }

    /// Explicit theme selection; saved immediately.
    pub fn apply_preset(&mut self, theme: Theme) {
        self.record.apply_preset(theme);
        self.save(true);
    }

    /// Direct color edit; the theme becomes `custom`. Debounced.
    pub fn set_custom_color(&mut self, field: ColorField, value: &str) {
        self.record.set_custom_color(field, value);
        self.save(false);
    }

    /// Replace the folder order string; saved immediately.
    pub fn set_folder_order(&mut self, order: String) {
        self.record.folder_order = order;
        self.save(true);
    }

    /// Replace the record with a fresh default and persist immediately.
    pub fn reset_to_defaults(&mut self) {
        self.record = SettingsRecord::default();
        self.save(true);
    }

    // ──────────────────── external changes ────────────────────

    /// Drain pending external-change notifications and adopt the stored
    /// record if it differs from what this store last persisted.
    ///
    /// Returns whether the live record was replaced. Echoes of this store's
    /// own writes are ignored. A failed re-read keeps the live record.
    pub fn check_external_changes(&mut self) -> bool {
        let Some(rx) = &self.changes else {
            return false;
        };
        let mut notified = false;
        for change in rx.try_iter() {
            tracing::debug!(source = %change.source, "external settings change");
            notified = true;
        }
        if !notified {
            return false;
        }

        let incoming = match self.read_stored() {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable external settings change");
                return false;
            }
        };
        if self.last_persisted.as_ref() == Some(&incoming) || incoming == self.record {
            return false;
        }

        tracing::info!(backend = %self.backend.describe(), "settings changed externally, reloading");
        // Last write wins: a scheduled local write would clobber the newer
        // remote state.
        self.debouncer.take();
        self.record = incoming.clone();
        self.last_persisted = Some(incoming);
        self.stats.external_reloads += 1;
        self.notify_apply();
        for listener in &mut self.change_listeners {
            listener(&self.record);
        }
        true
    }
}
