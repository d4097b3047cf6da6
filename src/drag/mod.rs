//! Drag-and-drop reordering of folders and links.

pub mod board;
pub mod coordinator;
