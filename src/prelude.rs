//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use mero_tab::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{MeroError, Result};

// Settings
pub use crate::settings::backend::{
    BackendKind, JsonFileBackend, MemoryBackend, SettingsBackend, SyncedFileBackend,
    select_backend,
};
pub use crate::settings::record::{SaveMode, SettingKey, SettingsRecord};
pub use crate::settings::store::SettingsStore;
pub use crate::settings::theme::{ColorField, Theme};

// Bookmarks
pub use crate::bookmarks::adapter::{BookmarkTreeAdapter, TreeSource};
pub use crate::bookmarks::node::{BookmarkNode, RenderFolder, RenderLink};
pub use crate::bookmarks::order::{folder_order_string, parse_folder_order, resolve_folders};
pub use crate::bookmarks::provider::{BookmarkProvider, MoveDestination, TreeProvider, open_provider};

// Drag
pub use crate::drag::board::Board;
pub use crate::drag::coordinator::{DragCoordinator, DragKind, DropPlan, Placement};

// Display
pub use crate::display::appearance::Appearance;
pub use crate::display::clock::ClockFace;

// Page
pub use crate::page::{DropOutcome, NewTabPage, PageView};
