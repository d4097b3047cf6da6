//! Bookmark providers: where the tree comes from and where moves go.
//!
//! A provider owns one rooted tree. The root itself is never displayed; its
//! children are the top-level containers (bookmarks bar, other bookmarks).

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::chromium::ChromiumBookmarks;
use super::node::BookmarkNode;
use crate::core::atomic::write_json_atomic;
use crate::core::errors::{MeroError, Result};

/// Id given to the invisible root of a provider tree.
pub const ROOT_ID: &str = "0";

/// Destination of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDestination {
    pub parent_id: String,
    /// Final position of the node inside `parent_id` once the move is done.
    /// Clamped to the end of the destination.
    pub index: usize,
}

/// Source of the bookmark tree.
pub trait BookmarkProvider: Send {
    /// Human-readable source description for logs.
    fn describe(&self) -> String;

    /// The whole tree, with `parent_id`/`index` filled in.
    fn get_tree(&self) -> Result<BookmarkNode>;

    /// One node, with `parent_id`/`index` filled in.
    fn get(&self, id: &str) -> Result<BookmarkNode> {
        let mut root = self.get_tree()?;
        root.fill_positions();
        root.find(id)
            .cloned()
            .ok_or_else(|| MeroError::BookmarkNotFound { id: id.to_string() })
    }

    /// Move `id` to `destination`.
    fn move_node(&mut self, id: &str, destination: &MoveDestination) -> Result<BookmarkNode>;
}

// ──────────────────── in-memory tree ────────────────────

/// In-memory forest, optionally mirrored to a JSON file.
///
/// The file holds the root's children as a JSON array of nodes. It is
/// rewritten atomically after every successful move.
#[derive(Debug, Clone)]
pub struct TreeProvider {
    root: BookmarkNode,
    file: Option<PathBuf>,
}

impl TreeProvider {
    /// Provider over `top_level` nodes, not backed by a file.
    #[must_use]
    pub fn new(top_level: Vec<BookmarkNode>) -> Self {
        Self {
            root: BookmarkNode::folder(ROOT_ID, "", top_level),
            file: None,
        }
    }

    /// Load a forest file: either an array of top-level nodes or a single
    /// root object with `children`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut provider = Self::from_value(read_json(path)?)?;
        provider.file = Some(path.to_path_buf());
        Ok(provider)
    }

    fn from_value(value: Value) -> Result<Self> {
        let top_level: Vec<BookmarkNode> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            let root: BookmarkNode = serde_json::from_value(value)?;
            root.children.ok_or_else(|| MeroError::ProviderUnavailable {
                details: "bookmark file root has no children".to_string(),
            })?
        };
        Ok(Self::new(top_level))
    }

    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn persist(&self) -> Result<()> {
        match &self.file {
            Some(path) => write_json_atomic(self.root.children(), path),
            None => Ok(()),
        }
    }
}

impl BookmarkProvider for TreeProvider {
    fn describe(&self) -> String {
        self.file.as_ref().map_or_else(
            || "in-memory bookmarks".to_string(),
            |p| format!("bookmarks {}", p.display()),
        )
    }

    fn get_tree(&self) -> Result<BookmarkNode> {
        let mut root = self.root.clone();
        root.fill_positions();
        Ok(root)
    }

    fn move_node(&mut self, id: &str, destination: &MoveDestination) -> Result<BookmarkNode> {
        let fail = |reason: String| MeroError::MoveFailed {
            id: id.to_string(),
            reason,
        };

        if id == ROOT_ID {
            return Err(fail("the root cannot be moved".to_string()));
        }
        let moving = self
            .root
            .find(id)
            .ok_or_else(|| MeroError::BookmarkNotFound { id: id.to_string() })?;
        if moving.contains(&destination.parent_id) {
            return Err(fail("destination is inside the moved node".to_string()));
        }
        match self.root.find(&destination.parent_id) {
            Some(parent) if parent.is_folder() => {}
            Some(_) => return Err(fail(format!("{} is not a folder", destination.parent_id))),
            None => {
                return Err(MeroError::BookmarkNotFound {
                    id: destination.parent_id.clone(),
                });
            }
        }

        let Some((old_parent, old_index)) = self.root.position_of(id) else {
            return Err(fail("node has no parent".to_string()));
        };
        let node = self
            .root
            .find_mut(&old_parent)
            .and_then(|p| p.children.as_mut())
            .map(|siblings| siblings.remove(old_index))
            .ok_or_else(|| fail("source parent vanished".to_string()))?;

        let siblings = self
            .root
            .find_mut(&destination.parent_id)
            .and_then(|p| p.children.as_mut())
            .ok_or_else(|| fail("destination vanished".to_string()))?;
        let index = destination.index.min(siblings.len());
        siblings.insert(index, node);

        tracing::debug!(
            id,
            from = %old_parent,
            to = %destination.parent_id,
            index,
            "bookmark moved"
        );
        self.persist()?;
        self.get(id)
    }
}

// ──────────────────── opening ────────────────────

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).map_err(|e| MeroError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| MeroError::Serialization {
        context: "bookmark file",
        details: format!("{}: {e}", path.display()),
    })
}

/// Open the bookmark file at `path`, detecting its format.
///
/// A JSON object with a `roots` key is a Chromium profile `Bookmarks` file
/// (read-only); anything else is a forest file.
pub fn open_provider(path: &Path) -> Result<Box<dyn BookmarkProvider>> {
    let value = read_json(path)?;
    if value.get("roots").is_some() {
        tracing::debug!(path = %path.display(), "detected chromium bookmarks file");
        return Ok(Box::new(ChromiumBookmarks::new(path.to_path_buf())));
    }
    let mut provider = TreeProvider::from_value(value)?;
    provider.file = Some(path.to_path_buf());
    Ok(Box::new(provider))
}
