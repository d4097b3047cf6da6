//! Read-only provider over a Chromium profile `Bookmarks` file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::node::BookmarkNode;
use super::provider::{BookmarkProvider, MoveDestination, ROOT_ID};
use crate::core::errors::{MeroError, Result};

#[derive(Debug, Deserialize)]
struct ChromiumFile {
    roots: ChromiumRoots,
}

#[derive(Debug, Deserialize)]
struct ChromiumRoots {
    bookmark_bar: Option<ChromiumNode>,
    other: Option<ChromiumNode>,
    synced: Option<ChromiumNode>,
}

#[derive(Debug, Deserialize)]
struct ChromiumNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    url: Option<String>,
    #[serde(default)]
    children: Vec<ChromiumNode>,
}

impl ChromiumNode {
    fn into_node(self) -> BookmarkNode {
        if self.kind == "url" {
            return BookmarkNode::link(self.id, self.name, self.url.unwrap_or_default());
        }
        let children = self.children.into_iter().map(Self::into_node).collect();
        BookmarkNode::folder(self.id, self.name, children)
    }
}

/// Chromium `Bookmarks` file, re-read on every lookup.
///
/// The browser owns the file, so moves are refused.
#[derive(Debug, Clone)]
pub struct ChromiumBookmarks {
    path: PathBuf,
}

impl ChromiumBookmarks {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BookmarkNode> {
        let raw = fs::read_to_string(&self.path).map_err(|e| MeroError::io(&self.path, e))?;
        let file: ChromiumFile =
            serde_json::from_str(&raw).map_err(|e| MeroError::ProviderUnavailable {
                details: format!("{}: {e}", self.path.display()),
            })?;
        let roots = file.roots;
        let top_level = [roots.bookmark_bar, roots.other, roots.synced]
            .into_iter()
            .flatten()
            .map(ChromiumNode::into_node)
            .collect();
        Ok(BookmarkNode::folder(ROOT_ID, "", top_level))
    }
}

impl BookmarkProvider for ChromiumBookmarks {
    fn describe(&self) -> String {
        format!("chromium bookmarks {}", self.path.display())
    }

    fn get_tree(&self) -> Result<BookmarkNode> {
        let mut root = self.load()?;
        root.fill_positions();
        Ok(root)
    }

    fn move_node(&mut self, id: &str, _destination: &MoveDestination) -> Result<BookmarkNode> {
        Err(MeroError::MoveFailed {
            id: id.to_string(),
            reason: "chromium bookmarks are read-only".to_string(),
        })
    }
}
