//! Front door to the bookmark tree.
//!
//! Chooses between the provider tree, the test-mode tree and the sample
//! fallback, and turns provider failures into logged fallbacks. Nothing here
//! returns an error to the caller.

#![allow(missing_docs)]

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::node::BookmarkNode;
use super::provider::{BookmarkProvider, MoveDestination};
use super::sample::{sample_root, test_root};
use crate::core::config::TestModeConfig;

/// Id of the root child preferred as the display root (the bookmarks bar).
pub const MAIN_ROOT_ID: &str = "1";

/// Where a fetched tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    Provider,
    TestMode,
    Sample,
}

impl fmt::Display for TreeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provider => "provider",
            Self::TestMode => "test-mode",
            Self::Sample => "sample",
        })
    }
}

/// Fetches display roots and forwards moves to the provider.
pub struct BookmarkTreeAdapter {
    provider: Option<Box<dyn BookmarkProvider>>,
    test_mode: bool,
    test_shape: TestModeConfig,
    rng: StdRng,
}

impl fmt::Debug for BookmarkTreeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkTreeAdapter")
            .field("provider", &self.provider.as_ref().map(|p| p.describe()))
            .field("test_mode", &self.test_mode)
            .finish_non_exhaustive()
    }
}

impl BookmarkTreeAdapter {
    #[must_use]
    pub fn new(provider: Option<Box<dyn BookmarkProvider>>) -> Self {
        Self {
            provider,
            test_mode: false,
            test_shape: TestModeConfig::default(),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    #[must_use]
    pub fn with_test_shape(mut self, shape: TestModeConfig) -> Self {
        self.test_shape = shape;
        self
    }

    /// Deterministic test-mode trees.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_test_mode(&mut self, enabled: bool) {
        self.test_mode = enabled;
    }

    #[must_use]
    pub const fn test_mode(&self) -> bool {
        self.test_mode
    }

    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// The node whose children are rendered.
    pub fn fetch(&mut self) -> BookmarkNode {
        self.fetch_with_source().1
    }

    /// [`fetch`](Self::fetch), also reporting which source answered.
    pub fn fetch_with_source(&mut self) -> (TreeSource, BookmarkNode) {
        if self.test_mode {
            return (TreeSource::TestMode, test_root(&mut self.rng, &self.test_shape));
        }
        let Some(provider) = &self.provider else {
            tracing::debug!("no bookmark provider, showing sample");
            return (TreeSource::Sample, sample_root());
        };
        match provider.get_tree() {
            Ok(root) => match main_root(root) {
                Some(node) => (TreeSource::Provider, node),
                None => {
                    tracing::warn!(provider = %provider.describe(), "bookmark tree is empty, showing sample");
                    (TreeSource::Sample, sample_root())
                }
            },
            Err(e) => {
                tracing::warn!(
                    provider = %provider.describe(),
                    error = %e,
                    "bookmark provider failed, showing sample"
                );
                (TreeSource::Sample, sample_root())
            }
        }
    }

    /// Current `(parent id, index)` of a provider node.
    pub fn locate(&self, id: &str) -> Option<(String, usize)> {
        let provider = self.provider.as_ref()?;
        match provider.get(id) {
            Ok(node) => node.parent_id.zip(node.index),
            Err(e) => {
                tracing::warn!(id, error = %e, "bookmark lookup failed");
                None
            }
        }
    }

    /// Best-effort move. Returns whether the provider accepted it.
    pub fn move_item(&mut self, id: &str, parent_id: &str, index: usize) -> bool {
        if self.test_mode {
            tracing::debug!(id, "test-mode bookmarks are not persisted");
            return false;
        }
        let Some(provider) = self.provider.as_mut() else {
            return false;
        };
        let destination = MoveDestination {
            parent_id: parent_id.to_string(),
            index,
        };
        match provider.move_node(id, &destination) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(id, parent_id, index, error = %e, "bookmark move failed");
                false
            }
        }
    }
}

/// Root child with id `1`, else the first root child.
fn main_root(root: BookmarkNode) -> Option<BookmarkNode> {
    let children = root.children?;
    let index = children
        .iter()
        .position(|c| c.id == MAIN_ROOT_ID)
        .unwrap_or(0);
    children.into_iter().nth(index).filter(BookmarkNode::is_folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::provider::TreeProvider;
    use crate::core::errors::{MeroError, Result};

    struct BrokenProvider;

    impl BookmarkProvider for BrokenProvider {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn get_tree(&self) -> Result<BookmarkNode> {
            Err(MeroError::ProviderUnavailable {
                details: "offline".to_string(),
            })
        }

        fn move_node(&mut self, id: &str, _: &MoveDestination) -> Result<BookmarkNode> {
            Err(MeroError::BookmarkNotFound { id: id.to_string() })
        }
    }

    fn bar_and_other() -> TreeProvider {
        TreeProvider::new(vec![
            BookmarkNode::folder("2", "Other", vec![]),
            BookmarkNode::folder(
                "1",
                "Bar",
                vec![
                    BookmarkNode::link("a", "A", "https://a"),
                    BookmarkNode::link("b", "B", "https://b"),
                ],
            ),
        ])
    }

    #[test]
    fn prefers_main_root() {
        let mut adapter = BookmarkTreeAdapter::new(Some(Box::new(bar_and_other())));
        let (source, root) = adapter.fetch_with_source();
        assert_eq!(source, TreeSource::Provider);
        assert_eq!(root.id, "1");
    }

    #[test]
    fn falls_back_to_first_root_child() {
        let provider = TreeProvider::new(vec![BookmarkNode::folder("9", "Only", vec![])]);
        let mut adapter = BookmarkTreeAdapter::new(Some(Box::new(provider)));
        assert_eq!(adapter.fetch().id, "9");
    }

    #[test]
    fn missing_provider_yields_sample() {
        let mut adapter = BookmarkTreeAdapter::new(None);
        let (source, root) = adapter.fetch_with_source();
        assert_eq!(source, TreeSource::Sample);
        assert_eq!(root.children()[0].title, "Sample");
    }

    #[test]
    fn failing_or_empty_provider_yields_sample() {
        let mut broken = BookmarkTreeAdapter::new(Some(Box::new(BrokenProvider)));
        assert_eq!(broken.fetch_with_source().0, TreeSource::Sample);
        let mut empty = BookmarkTreeAdapter::new(Some(Box::new(TreeProvider::new(vec![]))));
        assert_eq!(empty.fetch_with_source().0, TreeSource::Sample);
    }

    #[test]
    fn test_mode_overrides_provider() {
        let mut adapter = BookmarkTreeAdapter::new(Some(Box::new(bar_and_other()))).with_seed(3);
        adapter.set_test_mode(true);
        let (source, root) = adapter.fetch_with_source();
        assert_eq!(source, TreeSource::TestMode);
        assert_eq!(root.children().len(), 6);
        assert!(!adapter.move_item("a", "1", 1));
    }

    #[test]
    fn move_item_reports_outcome() {
        let mut adapter = BookmarkTreeAdapter::new(Some(Box::new(bar_and_other())));
        assert_eq!(adapter.locate("b"), Some(("1".to_string(), 1)));
        assert!(adapter.move_item("b", "1", 0));
        assert_eq!(adapter.locate("b"), Some(("1".to_string(), 0)));
        assert!(!adapter.move_item("missing", "1", 0));
        assert!(!BookmarkTreeAdapter::new(None).move_item("a", "1", 0));
    }
}
