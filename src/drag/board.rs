//! The rendered folder grid as a mutable model for drag reordering.

#![allow(missing_docs)]

use serde::Serialize;

use super::coordinator::move_adjacent;
use crate::bookmarks::node::RenderFolder;
use crate::bookmarks::order::folder_order_string;

/// Where a link ended up after an optimistic move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemMove {
    pub item_id: String,
    /// The link it was dropped on.
    pub target_id: String,
    pub from_folder: String,
    pub to_folder: String,
    /// Position inside `to_folder` after the move.
    pub index: usize,
}

/// Folders in visual order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    folders: Vec<RenderFolder>,
}

impl Board {
    #[must_use]
    pub const fn new(folders: Vec<RenderFolder>) -> Self {
        Self { folders }
    }

    #[must_use]
    pub fn folders(&self) -> &[RenderFolder] {
        &self.folders
    }

    #[must_use]
    pub fn folder_index(&self, id: &str) -> Option<usize> {
        self.folders.iter().position(|f| f.id == id)
    }

    /// `(folder index, item index)` of a link.
    #[must_use]
    pub fn locate_item(&self, id: &str) -> Option<(usize, usize)> {
        self.folders.iter().enumerate().find_map(|(fi, folder)| {
            folder
                .items
                .iter()
                .position(|item| item.id == id)
                .map(|ii| (fi, ii))
        })
    }

    /// Put folder `dragged` next to folder `target`.
    pub fn move_folder(&mut self, dragged: &str, target: &str) -> bool {
        match (self.folder_index(dragged), self.folder_index(target)) {
            (Some(from), Some(to)) => move_adjacent(&mut self.folders, from, to),
            _ => false,
        }
    }

    /// Put link `dragged` next to link `target`.
    ///
    /// Within one folder this follows the adjacent-move rule. Across folders
    /// the link lands just before the target.
    pub fn move_item(&mut self, dragged: &str, target: &str) -> Option<ItemMove> {
        let (from_folder, from_item) = self.locate_item(dragged)?;
        let (to_folder, to_item) = self.locate_item(target)?;
        let from_id = self.folders[from_folder].id.clone();

        if from_folder == to_folder {
            if !move_adjacent(&mut self.folders[from_folder].items, from_item, to_item) {
                return None;
            }
        } else {
            let link = self.folders[from_folder].items.remove(from_item);
            self.folders[to_folder].items.insert(to_item, link);
        }

        Some(ItemMove {
            item_id: dragged.to_string(),
            target_id: target.to_string(),
            from_folder: from_id,
            to_folder: self.folders[to_folder].id.clone(),
            index: to_item,
        })
    }

    /// Folder titles in visual order, joined for storage.
    #[must_use]
    pub fn folder_order(&self) -> String {
        folder_order_string(self.folders.iter().map(|f| f.title.as_str()))
    }

    /// Find a folder by id, else by case-insensitive title.
    #[must_use]
    pub fn resolve_folder(&self, id_or_title: &str) -> Option<&RenderFolder> {
        let key = crate::bookmarks::node::order_key(id_or_title);
        self.folders
            .iter()
            .find(|f| f.id == id_or_title)
            .or_else(|| self.folders.iter().find(|f| f.order_key() == key))
    }
}
