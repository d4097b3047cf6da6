//! Bookmark tree nodes and the render-ready folder/link shapes.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// Id of the synthetic folder collecting loose root links.
pub const VIRTUAL_ROOT_ID: &str = "virtual-root";
/// Title of the synthetic folder collecting loose root links.
pub const VIRTUAL_ROOT_TITLE: &str = "Bookmarks";

/// A bookmark tree node as a provider reports it.
///
/// A node with `children` is a folder; a node with `url` and no `children`
/// is a link. `parent_id` and `index` are filled in by providers on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl BookmarkNode {
    #[must_use]
    pub fn folder(id: impl Into<String>, title: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            children: Some(children),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn link(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    #[must_use]
    pub const fn is_link(&self) -> bool {
        self.children.is_none() && self.url.is_some()
    }

    /// Children, empty for links.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Lowercased, trimmed title used to match folder order entries.
    #[must_use]
    pub fn order_key(&self) -> String {
        order_key(&self.title)
    }

    /// Depth-first search for `id`, including `self`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Self> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .as_deref_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// `(parent id, index)` of the node with `id`, searching below `self`.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<(String, usize)> {
        let children = self.children();
        if let Some(index) = children.iter().position(|c| c.id == id) {
            return Some((self.id.clone(), index));
        }
        children.iter().find_map(|child| child.position_of(id))
    }

    /// Whether `id` names `self` or one of its descendants.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Recursively set `parent_id` and `index` on every descendant.
    pub fn fill_positions(&mut self) {
        let parent_id = self.id.clone();
        if let Some(children) = self.children.as_mut() {
            for (index, child) in children.iter_mut().enumerate() {
                child.parent_id = Some(parent_id.clone());
                child.index = Some(index);
                child.fill_positions();
            }
        }
    }

    /// Number of links in the subtree.
    #[must_use]
    pub fn link_count(&self) -> usize {
        usize::from(self.is_link()) + self.children().iter().map(Self::link_count).sum::<usize>()
    }
}

/// Normalized form of a folder title for order matching.
#[must_use]
pub fn order_key(title: &str) -> String {
    title.trim().to_lowercase()
}

// ──────────────────── render shapes ────────────────────

/// One link as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderLink {
    pub id: String,
    pub url: String,
    /// Bookmark title, or the URL when the title is empty.
    pub title: String,
}

impl RenderLink {
    /// Render shape of a link node; `None` for folders and url-less nodes.
    #[must_use]
    pub fn from_node(node: &BookmarkNode) -> Option<Self> {
        if !node.is_link() {
            return None;
        }
        let url = node.url.clone()?;
        let title = if node.title.trim().is_empty() {
            url.clone()
        } else {
            node.title.clone()
        };
        Some(Self {
            id: node.id.clone(),
            url,
            title,
        })
    }
}

/// One folder as displayed, with its links in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderFolder {
    pub id: String,
    pub title: String,
    pub items: Vec<RenderLink>,
    /// True for the folder gathering loose root links.
    pub synthetic: bool,
}

impl RenderFolder {
    /// Render shape of a folder node. Nested folders are skipped.
    #[must_use]
    pub fn from_folder(node: &BookmarkNode) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            items: node.children().iter().filter_map(RenderLink::from_node).collect(),
            synthetic: false,
        }
    }

    /// The synthetic folder for loose root links.
    #[must_use]
    pub fn virtual_root(items: Vec<RenderLink>) -> Self {
        Self {
            id: VIRTUAL_ROOT_ID.to_string(),
            title: VIRTUAL_ROOT_TITLE.to_string(),
            items,
            synthetic: true,
        }
    }

    #[must_use]
    pub fn order_key(&self) -> String {
        order_key(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> BookmarkNode {
        BookmarkNode::folder(
            "0",
            "",
            vec![BookmarkNode::folder(
                "1",
                "Bar",
                vec![
                    BookmarkNode::link("10", "Docs", "https://docs.rs"),
                    BookmarkNode::folder("11", "Nested", vec![BookmarkNode::link("12", "", "https://a")]),
                ],
            )],
        )
    }

    #[test]
    fn find_and_position() {
        let root = tree();
        assert_eq!(root.find("12").unwrap().url.as_deref(), Some("https://a"));
        assert_eq!(root.position_of("11"), Some(("1".to_string(), 1)));
        assert_eq!(root.position_of("missing"), None);
        assert!(root.find("1").unwrap().contains("12"));
        assert_eq!(root.link_count(), 2);
    }

    #[test]
    fn fill_positions_sets_parent_and_index() {
        let mut root = tree();
        root.fill_positions();
        let nested = root.find("12").unwrap();
        assert_eq!(nested.parent_id.as_deref(), Some("11"));
        assert_eq!(nested.index, Some(0));
    }

    #[test]
    fn link_title_falls_back_to_url() {
        let link = RenderLink::from_node(&BookmarkNode::link("1", "  ", "https://x.org")).unwrap();
        assert_eq!(link.title, "https://x.org");
        assert!(RenderLink::from_node(&BookmarkNode::folder("2", "F", vec![])).is_none());
    }

    #[test]
    fn render_folder_keeps_only_links() {
        let root = tree();
        let folder = RenderFolder::from_folder(root.find("1").unwrap());
        assert_eq!(folder.items.len(), 1);
        assert_eq!(folder.items[0].id, "10");
        assert!(!folder.synthetic);
    }

    #[test]
    fn node_json_uses_camel_case() {
        let mut node = BookmarkNode::link("5", "X", "https://x");
        node.parent_id = Some("1".into());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["parentId"], "1");
        assert!(json.get("children").is_none());
    }
}
