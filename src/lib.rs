#![forbid(unsafe_code)]

//! Mero Tab is the core of a browser new-tab page. It shows a clock, a
//! greeting and a grid of bookmark folders, styled by user settings that
//! follow the user across devices.
//!
//! Four cooperating parts:
//! 1. **Settings store**: one settings record with debounced or immediate
//!    saves and synchronized-store change tracking
//! 2. **Bookmark tree adapter**: provider tree, test-mode tree or sample
//!    fallback, best-effort moves
//! 3. **Folder order resolver**: saved folder order applied to the tree
//! 4. **Drag coordinator**: folder/link reordering without an event system
//!
//! [`page::NewTabPage`] wires them together on a single-threaded event loop.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use mero_tab::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use mero_tab::core::config::Config;
//! use mero_tab::bookmarks::order::resolve_folders;
//! ```

pub mod prelude;

pub mod bookmarks;
pub mod core;
pub mod display;
pub mod drag;
pub mod page;
pub mod settings;
