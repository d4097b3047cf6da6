//! Placeholder trees: the fallback sample and the randomized test-mode tree.

use rand::Rng;

use super::node::BookmarkNode;
use crate::core::config::TestModeConfig;

/// Words used for test-mode folder and link titles.
pub const WORD_BANK: [&str; 20] = [
    "Nebula", "Zenith", "Vortex", "Pulse", "Echo", "Lumina", "Stellar", "Aventis", "Cyber",
    "Flux", "Nova", "Titan", "Apex", "Ethereal", "Prism", "Oracle", "Synergy", "Catalyst",
    "Nexus", "Aura",
];

/// Target of every test-mode link.
pub const TEST_URL: &str = "https://example.com";

/// Root shown when no usable provider tree exists: one `Sample` folder
/// holding a single link.
#[must_use]
pub fn sample_root() -> BookmarkNode {
    BookmarkNode::folder(
        "sample-root",
        "",
        vec![BookmarkNode::folder(
            "sample",
            "Sample",
            vec![BookmarkNode::link("sample-google", "Google", "https://google.com")],
        )],
    )
}

/// A word from [`WORD_BANK`].
pub fn random_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    WORD_BANK[rng.random_range(0..WORD_BANK.len())]
}

/// Synthetic root with `shape.folder_count` folders of
/// `shape.min_items..=shape.max_items` randomly titled links each.
pub fn test_root<R: Rng + ?Sized>(rng: &mut R, shape: &TestModeConfig) -> BookmarkNode {
    let folders = (0..shape.folder_count)
        .map(|i| {
            let count = rng.random_range(shape.min_items..=shape.max_items.max(shape.min_items));
            let links = (0..count)
                .map(|j| BookmarkNode::link(format!("test-bm-{i}-{j}"), random_word(rng), TEST_URL))
                .collect();
            BookmarkNode::folder(format!("test-folder-{i}"), random_word(rng), links)
        })
        .collect();
    BookmarkNode::folder("test-root", "", folders)
}
