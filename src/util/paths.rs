use std::env;
use std::path::{Path, PathBuf};

use crate::error::{DriveVaultError, Result};

/// Expands a leading `~` against `$HOME`. Other paths are returned as-is.
pub fn expand_home(path: &str) -> PathBuf {
    let home = match env::var("HOME") {
        Ok(home) if !home.is_empty() => home,
        _ => return PathBuf::from(path),
    };
    if path == "~" {
        return PathBuf::from(home);
    }
    match path.strip_prefix("~/") {
        Some(rest) => Path::new(&home).join(rest),
        None => PathBuf::from(path),
    }
}

pub fn file_name_string(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| DriveVaultError::message(format!("{} has no file name", path.display())))
}

/// Renders a path with a trailing `/` so rsync copies the directory contents.
pub fn with_trailing_slash(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.ends_with('/') {
        text.to_string()
    } else {
        format!("{}/", text)
    }
}
