//! Folder ordering: applies the user's saved folder order to a tree.
//!
//! The saved order is a newline-separated list of folder titles. Matching is
//! on the lowercased, trimmed title. Folders the order does not mention keep
//! their discovery order after the ordered ones; titles the tree does not
//! contain are skipped.

use super::node::{BookmarkNode, RenderFolder, RenderLink, order_key};

/// Normalized, non-empty order entries.
#[must_use]
pub fn parse_folder_order(folder_order: &str) -> Vec<String> {
    folder_order
        .lines()
        .map(order_key)
        .filter(|key| !key.is_empty())
        .collect()
}

/// Join folder titles in visual order into a storable order string.
#[must_use]
pub fn folder_order_string<'a>(titles: impl IntoIterator<Item = &'a str>) -> String {
    titles.into_iter().map(order_key).collect::<Vec<_>>().join("\n")
}

/// Render folders for `root`'s children in the saved order.
///
/// Loose root links are gathered into one synthetic `Bookmarks` folder that
/// takes part in ordering like any other folder. Nodes that are neither
/// folders nor links are dropped.
#[must_use]
pub fn resolve_folders(root: &BookmarkNode, folder_order: &str) -> Vec<RenderFolder> {
    let mut discovered = Vec::new();
    let mut loose = Vec::new();
    for child in root.children() {
        if child.is_folder() {
            discovered.push(RenderFolder::from_folder(child));
        } else if let Some(link) = RenderLink::from_node(child) {
            loose.push(link);
        }
    }
    if !loose.is_empty() {
        discovered.push(RenderFolder::virtual_root(loose));
    }
    apply_order(discovered, folder_order)
}

/// Reorder already-built folders by `folder_order`.
///
/// Every folder with a claimed key moves, so duplicate titles travel
/// together in their discovery order.
#[must_use]
pub fn apply_order(folders: Vec<RenderFolder>, folder_order: &str) -> Vec<RenderFolder> {
    let mut remaining: Vec<Option<RenderFolder>> = folders.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    for key in parse_folder_order(folder_order) {
        for slot in &mut remaining {
            if slot.as_ref().is_some_and(|f| f.order_key() == key) {
                ordered.extend(slot.take());
            }
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::node::VIRTUAL_ROOT_ID;
    use proptest::prelude::*;

    fn root_with(titles: &[&str]) -> BookmarkNode {
        let children = titles
            .iter()
            .enumerate()
            .map(|(i, t)| BookmarkNode::folder(format!("f{i}"), *t, vec![]))
            .collect();
        BookmarkNode::folder("1", "Bar", children)
    }

    fn titles(folders: &[RenderFolder]) -> Vec<&str> {
        folders.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn parse_normalizes_and_drops_empties() {
        assert_eq!(
            parse_folder_order("  Work \n\n\nNEWS\n   \nwork"),
            ["work", "news", "work"]
        );
        assert!(parse_folder_order("").is_empty());
    }

    #[test]
    fn ordered_first_then_discovery_order() {
        let root = root_with(&["Alpha", "Beta", "Gamma", "Delta"]);
        let folders = resolve_folders(&root, "gamma\nALPHA\nmissing");
        assert_eq!(titles(&folders), ["Gamma", "Alpha", "Beta", "Delta"]);
    }

    #[test]
    fn repeated_entries_are_no_ops() {
        let root = root_with(&["A", "B", "C"]);
        let folders = resolve_folders(&root, "c\nc\na\nc");
        assert_eq!(titles(&folders), ["C", "A", "B"]);
    }

    #[test]
    fn loose_links_form_virtual_folder() {
        let root = BookmarkNode::folder(
            "1",
            "Bar",
            vec![
                BookmarkNode::link("x", "X", "https://x"),
                BookmarkNode::folder("f", "Tools", vec![BookmarkNode::link("t", "", "https://t")]),
                BookmarkNode::link("y", "Y", "https://y"),
                BookmarkNode {
                    id: "sep".into(),
                    ..BookmarkNode::default()
                },
            ],
        );
        let folders = resolve_folders(&root, "");
        assert_eq!(titles(&folders), ["Tools", "Bookmarks"]);
        let virtual_root = &folders[1];
        assert_eq!(virtual_root.id, VIRTUAL_ROOT_ID);
        assert!(virtual_root.synthetic);
        assert_eq!(virtual_root.items.len(), 2);

        let reordered = resolve_folders(&root, "bookmarks");
        assert_eq!(titles(&reordered), ["Bookmarks", "Tools"]);
    }

    #[test]
    fn duplicate_titles_travel_together() {
        let root = root_with(&["News", "Work", "news"]);
        let folders = resolve_folders(&root, "news");
        let ids: Vec<_> = folders.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["f0", "f2", "f1"]);
    }

    #[test]
    fn order_string_joins_with_newlines() {
        assert_eq!(folder_order_string([" Work", "News"]), "work\nnews");
    }

    fn unique_titles() -> impl Strategy<Value = Vec<String>> {
        prop::collection::hash_set("[a-z]{1,6}", 0..8).prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn resolving_is_a_permutation(names in unique_titles(), order in prop::collection::vec("[a-z]{1,6}", 0..8)) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let root = root_with(&refs);
            let folders = resolve_folders(&root, &order.join("\n"));
            let mut got: Vec<String> = folders.iter().map(|f| f.title.clone()).collect();
            let mut want = names.clone();
            got.sort();
            want.sort();
            prop_assert_eq!(got, want);
        }

        #[test]
        fn resolving_is_idempotent(names in unique_titles(), order in prop::collection::vec("[a-z]{1,6}", 0..8)) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let root = root_with(&refs);
            let once = resolve_folders(&root, &order.join("\n"));
            let saved = folder_order_string(once.iter().map(|f| f.title.as_str()));
            let twice = resolve_folders(&root, &saved);
            prop_assert_eq!(titles(&once), titles(&twice));
        }

        #[test]
        fn saved_visual_order_round_trips(names in unique_titles()) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let root = root_with(&refs);
            let mut visual: Vec<&str> = refs.clone();
            visual.reverse();
            let folders = resolve_folders(&root, &folder_order_string(visual.iter().copied()));
            prop_assert_eq!(titles(&folders), visual);
        }
    }
}
