//! The new-tab page: settings, bookmarks and drag state wired together.
//!
//! [`NewTabPage`] owns one of each component and applies the cross-cutting
//! side effects: toggling `showIcons`/`testMode`, resetting, external
//! settings changes and successful bookmark moves all re-read the tree, and
//! a folder drop rewrites the saved folder order.

#![allow(missing_docs)]

use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::bookmarks::adapter::{BookmarkTreeAdapter, TreeSource};
use crate::bookmarks::node::RenderFolder;
use crate::bookmarks::order::resolve_folders;
use crate::bookmarks::provider::open_provider;
use crate::core::config::Config;
use crate::core::errors::Result;
use crate::display::appearance::Appearance;
use crate::display::clock::ClockFace;
use crate::drag::board::{Board, ItemMove};
use crate::drag::coordinator::{DragCoordinator, DragKind};
use crate::settings::record::{SaveMode, SettingKey, SettingsRecord};
use crate::settings::store::SettingsStore;
use crate::settings::theme::Theme;

/// What a drop did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Folders reordered; the new order was saved.
    FoldersReordered { folder_order: String },
    /// Link moved on screen. `persisted` tells whether the provider
    /// accepted the move.
    ItemMoved {
        #[serde(flatten)]
        item: ItemMove,
        persisted: bool,
    },
}

/// What one event-loop tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A debounced settings write went out.
    pub saved: bool,
    /// Settings were replaced by an external change.
    pub reloaded: bool,
    /// Clock digit slots that flipped.
    pub changed_digits: Vec<usize>,
}

/// Snapshot of everything on screen.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub title: String,
    pub clock: ClockFace,
    pub appearance: Appearance,
    pub source: String,
    pub folders: Vec<RenderFolder>,
}

/// One open new-tab page.
#[derive(Debug)]
pub struct NewTabPage {
    store: SettingsStore,
    adapter: BookmarkTreeAdapter,
    board: Board,
    source: TreeSource,
    drag: DragCoordinator<String>,
    clock: Option<ClockFace>,
}

impl NewTabPage {
    #[must_use]
    pub fn new(store: SettingsStore, adapter: BookmarkTreeAdapter) -> Self {
        Self {
            store,
            adapter,
            board: Board::default(),
            source: TreeSource::Sample,
            drag: DragCoordinator::new(),
            clock: None,
        }
    }

    /// Page wired from `config`. A bookmark source that cannot be opened is
    /// logged and treated as absent.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let provider = config
            .bookmarks
            .source
            .as_deref()
            .and_then(|path| match open_provider(path) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "bookmark source unavailable");
                    None
                }
            });
        let adapter = BookmarkTreeAdapter::new(provider).with_test_shape(config.test_mode.clone());
        Self::new(SettingsStore::open(&config.storage), adapter)
    }

    /// Load settings and render bookmarks.
    pub fn start(&mut self) {
        self.store.load();
        self.reload_bookmarks();
        tracing::debug!(
            backend = %self.store.describe_backend(),
            source = %self.source,
            folders = self.board.folders().len(),
            "page started"
        );
    }

    /// Flush a pending debounced write.
    pub fn shutdown(&mut self) {
        self.store.flush();
    }

    #[must_use]
    pub const fn settings(&self) -> &SettingsRecord {
        self.store.record()
    }

    #[must_use]
    pub const fn store(&self) -> &SettingsStore {
        &self.store
    }

    #[must_use]
    pub fn folders(&self) -> &[RenderFolder] {
        self.board.folders()
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub const fn source(&self) -> TreeSource {
        self.source
    }

    #[must_use]
    pub fn appearance(&self) -> Appearance {
        Appearance::from_record(self.store.record())
    }

    /// Re-read the tree and re-apply the saved folder order.
    pub fn reload_bookmarks(&mut self) {
        let record = self.store.record();
        self.adapter.set_test_mode(record.test_mode);
        let (source, root) = self.adapter.fetch_with_source();
        self.board = Board::new(resolve_folders(&root, &record.folder_order));
        self.source = source;
    }

    // ──────────────────── settings intents ────────────────────

    /// Change one setting from text.
    pub fn change_setting(&mut self, key: SettingKey, raw: &str) -> Result<SaveMode> {
        let mode = self.store.update(key, raw)?;
        if key.affects_bookmarks() {
            self.reload_bookmarks();
        }
        Ok(mode)
    }

    pub fn select_theme(&mut self, theme: Theme) {
        self.store.apply_preset(theme);
    }

    /// Restore defaults (after the caller confirmed) and re-render.
    pub fn reset(&mut self) {
        self.store.reset_to_defaults();
        self.reload_bookmarks();
    }

    // ──────────────────── drag gestures ────────────────────

    pub fn drag_start(&mut self, id: &str, kind: DragKind) {
        self.drag.drag_start(id.to_string(), kind);
    }

    pub fn drag_over(&mut self, id: &str, kind: DragKind) -> bool {
        self.drag.drag_over(id.to_string(), kind)
    }

    pub fn drag_leave(&mut self, id: &str) {
        self.drag.drag_leave(&id.to_string());
    }

    pub fn drag_end(&mut self) {
        self.drag.drag_end();
    }

    #[must_use]
    pub const fn drag_state(&self) -> &DragCoordinator<String> {
        &self.drag
    }

    /// Release over `id` and apply the resulting reorder.
    pub fn drop(&mut self, id: &str, kind: DragKind) -> Option<DropOutcome> {
        let plan = self.drag.drop(id.to_string(), kind)?;
        match plan.kind {
            DragKind::Folder => {
                if !self.board.move_folder(&plan.dragged, &plan.target) {
                    return None;
                }
                let folder_order = self.board.folder_order();
                self.store.set_folder_order(folder_order.clone());
                Some(DropOutcome::FoldersReordered { folder_order })
            }
            DragKind::Item => {
                // Provider position of the target before anything moves.
                let destination = self.adapter.locate(&plan.target);
                let item = self.board.move_item(&plan.dragged, &plan.target)?;
                let persisted = destination.is_some_and(|(parent_id, index)| {
                    self.adapter.move_item(&plan.dragged, &parent_id, index)
                });
                if persisted {
                    self.reload_bookmarks();
                }
                Some(DropOutcome::ItemMoved { item, persisted })
            }
        }
    }

    /// Complete gesture: start on `dragged`, hover and drop on `target`, end.
    pub fn drag_and_drop(&mut self, dragged: &str, target: &str, kind: DragKind) -> Option<DropOutcome> {
        self.drag_start(dragged, kind);
        self.drag_over(target, kind);
        let outcome = self.drop(target, kind);
        self.drag_end();
        outcome
    }

    // ──────────────────── event loop ────────────────────

    /// One event-loop turn at the current time.
    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Instant::now(), &Local::now().naive_local())
    }

    /// [`tick`](Self::tick) with explicit monotonic and wall-clock readings.
    pub fn tick_at(&mut self, now: Instant, wall: &NaiveDateTime) -> TickReport {
        let saved = self.store.poll_at(now);
        let reloaded = self.store.check_external_changes();
        if reloaded {
            self.reload_bookmarks();
        }
        let face = ClockFace::at(wall, self.store.record());
        let changed_digits = face.changed_digits(self.clock.as_ref());
        self.clock = Some(face);
        TickReport {
            saved,
            reloaded,
            changed_digits,
        }
    }

    /// Everything on screen at `wall` time.
    #[must_use]
    pub fn view_at(&self, wall: &NaiveDateTime) -> PageView {
        let appearance = self.appearance();
        PageView {
            title: appearance.tab_title.clone(),
            clock: ClockFace::at(wall, self.store.record()),
            appearance,
            source: self.source.to_string(),
            folders: self.board.folders().to_vec(),
        }
    }

    #[must_use]
    pub fn view(&self) -> PageView {
        self.view_at(&Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::node::BookmarkNode;
    use crate::bookmarks::provider::TreeProvider;
    use crate::settings::backend::MemoryBackend;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn provider() -> TreeProvider {
        TreeProvider::new(vec![BookmarkNode::folder(
            "1",
            "Bar",
            vec![
                BookmarkNode::folder(
                    "w",
                    "Work",
                    vec![
                        BookmarkNode::link("a", "A", "https://a"),
                        BookmarkNode::link("b", "B", "https://b"),
                    ],
                ),
                BookmarkNode::folder("n", "News", vec![BookmarkNode::link("c", "C", "https://c")]),
            ],
        )])
    }

    fn page(backend: &MemoryBackend) -> NewTabPage {
        let store = SettingsStore::new(Box::new(backend.handle()));
        let adapter = BookmarkTreeAdapter::new(Some(Box::new(provider()))).with_seed(1);
        let mut page = NewTabPage::new(store, adapter);
        page.start();
        page
    }

    fn titles(page: &NewTabPage) -> Vec<&str> {
        page.folders().iter().map(|f| f.title.as_str()).collect()
    }

    fn wall(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn folder_drop_saves_order_immediately() {
        let backend = MemoryBackend::local();
        let mut page = page(&backend);
        assert_eq!(titles(&page), ["Work", "News"]);
        let outcome = page.drag_and_drop("w", "n", DragKind::Folder).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::FoldersReordered {
                folder_order: "news\nwork".to_string()
            }
        );
        assert_eq!(backend.stored().unwrap()["folderOrder"], "news\nwork");

        page.reload_bookmarks();
        assert_eq!(titles(&page), ["News", "Work"]);
    }

    #[test]
    fn item_drop_moves_bookmark_and_reloads() {
        let backend = MemoryBackend::local();
        let mut page = page(&backend);
        let outcome = page.drag_and_drop("a", "c", DragKind::Item).unwrap();
        let DropOutcome::ItemMoved { item, persisted } = outcome else {
            panic!("expected an item move");
        };
        assert!(persisted);
        assert_eq!(item.to_folder, "n");
        let news = &page.folders()[1];
        let ids: Vec<_> = news.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn mixed_kind_drop_does_nothing() {
        let backend = MemoryBackend::local();
        let mut page = page(&backend);
        page.drag_start("w", DragKind::Folder);
        assert!(!page.drag_over("a", DragKind::Item));
        assert!(page.drop("a", DragKind::Item).is_none());
        page.drag_end();
        assert_eq!(titles(&page), ["Work", "News"]);
        assert!(!page.drag_state().is_dragging());
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_mode_toggle_reloads_tree() {
        let backend = MemoryBackend::local();
        let mut page = page(&backend);
        page.change_setting(SettingKey::TestMode, "true").unwrap();
        assert_eq!(page.source(), TreeSource::TestMode);
        assert_eq!(page.folders().len(), 6);
        page.reset();
        assert_eq!(page.source(), TreeSource::Provider);
        assert_eq!(titles(&page), ["Work", "News"]);
    }

    #[test]
    fn tick_flushes_debounced_save_and_flips_digits() {
        let backend = MemoryBackend::local();
        let mut page = page(&backend);
        let start = Instant::now();
        let first = page.tick_at(start, &wall(9, 0, 0));
        assert_eq!(first.changed_digits.len(), 6);

        page.change_setting(SettingKey::UiScale, "1.5").unwrap();
        assert_eq!(backend.write_count(), 0);
        let later = page.tick_at(Instant::now() + Duration::from_secs(1), &wall(9, 0, 1));
        assert!(later.saved);
        assert_eq!(later.changed_digits, [5]);
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn external_change_reloads_bookmarks() {
        let backend = MemoryBackend::synced();
        let mut page = page(&backend);
        backend
            .handle()
            .put_raw(serde_json::json!({"folderOrder": "news"}));
        let report = page.tick_at(Instant::now(), &wall(12, 0, 0));
        assert!(report.reloaded);
        assert_eq!(titles(&page), ["News", "Work"]);
    }

    #[test]
    fn view_uses_title_fallback() {
        let backend = MemoryBackend::local();
        let mut page = page(&backend);
        page.change_setting(SettingKey::TabTitle, "").unwrap();
        let view = page.view_at(&wall(8, 0, 0));
        assert_eq!(view.title, "Mero Tab");
        assert_eq!(view.clock.greeting, "Good morning");
        assert_eq!(view.source, "provider");
    }
}
