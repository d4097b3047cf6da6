//! Bookmark tree access, fallback trees and folder ordering.

pub mod adapter;
pub mod chromium;
pub mod node;
pub mod order;
pub mod provider;
pub mod sample;
