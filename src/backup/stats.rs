use std::path::Path;

use walkdir::WalkDir;

const GIB: f64 = (1024u64 * 1024 * 1024) as f64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub files: u64,
    pub bytes: u64,
}

impl TreeStats {
    pub fn gib(&self) -> f64 {
        self.bytes as f64 / GIB
    }
}

/// Counts regular files under `root` and sums their sizes. Entries that
/// vanish or cannot be read while walking are skipped.
pub fn tree_stats(root: &Path) -> TreeStats {
    let mut stats = TreeStats::default();
    for entry in WalkDir::new(root).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            stats.files += 1;
            stats.bytes += meta.len();
        }
    }
    stats
}
