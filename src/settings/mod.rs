//! Settings persistence: the record, its themes, storage backends and the
//! store that ties them together.

pub mod backend;
pub mod debounce;
pub mod record;
pub mod store;
pub mod theme;
#[cfg(feature = "watcher")]
pub mod watcher;
