use std::path::{Path, PathBuf};

use globset::Glob;
use walkdir::WalkDir;

use crate::error::{DriveVaultError, Result};

/// Files under `root` whose name matches the glob `pattern`, as paths
/// relative to `root`, sorted.
pub fn search_in_backup(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| DriveVaultError::message(format!("invalid pattern {}: {}", pattern, e)))?
        .compile_matcher();
    let mut matches = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        if !matcher.is_match(entry.file_name()) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            matches.push(rel.to_path_buf());
        }
    }
    matches.sort();
    Ok(matches)
}
