//! Backup version bookkeeping: where a run writes, which versions exist,
//! retention pruning and the `latest` symlink.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::error::{DriveVaultError, Result};
use crate::util::paths::file_name_string;

pub const CURRENT: &str = "current";
pub const LATEST: &str = "latest";
pub const VERSION_PREFIX: &str = "backup_";
const NAME_FORMAT: &str = "%Y%m%d_%H%M%S";
const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupVersion {
    /// Directory name under the destination root.
    pub name: String,
    /// Human-readable label: the formatted timestamp, `current`, or the raw
    /// directory name when the timestamp does not parse.
    pub label: String,
    pub path: PathBuf,
}

impl BackupVersion {
    pub fn is_current(&self) -> bool {
        self.name == CURRENT
    }
}

/// Directory a run started at `now` writes to.
pub fn version_path(root: &Path, retention: usize, now: NaiveDateTime) -> PathBuf {
    if retention <= 1 {
        root.join(CURRENT)
    } else {
        root.join(format!("{}{}", VERSION_PREFIX, now.format(NAME_FORMAT)))
    }
}

/// Picks the destination for a new run and makes sure it exists.
///
/// Two versioned runs inside the same second share a directory.
pub fn allocate_destination(root: &Path, retention: usize) -> Result<PathBuf> {
    let path = version_path(root, retention, Local::now().naive_local());
    fs::create_dir_all(&path)
        .map_err(|e| DriveVaultError::message(format!("create {}: {}", path.display(), e)))?;
    info!("Backup destination: {}", path.display());
    Ok(path)
}

/// Formats the timestamp in a `backup_*` directory name.
pub fn parse_label(name: &str) -> Option<String> {
    let stamp = name.strip_prefix(VERSION_PREFIX)?;
    NaiveDateTime::parse_from_str(stamp, NAME_FORMAT)
        .ok()
        .map(|dt| dt.format(LABEL_FORMAT).to_string())
}

/// Names of the `backup_*` directories directly under `root`, unsorted.
/// Symlinks are not followed. Entries that cannot be inspected are skipped.
fn version_dir_names(root: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in {}: {}", root.display(), err);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(VERSION_PREFIX) {
            continue;
        }
        if is_real_dir(&entry.path(), entry.file_type()) {
            names.push(name);
        }
    }
    Ok(names)
}

fn is_real_dir(path: &Path, file_type: io::Result<fs::FileType>) -> bool {
    match file_type {
        Ok(kind) => kind.is_dir(),
        Err(err) => {
            warn!("skipping {}: {}", path.display(), err);
            false
        }
    }
}

/// Lists every version under `root`, most recent first.
///
/// `current` always sorts ahead of dated versions.
pub fn enumerate_versions(root: &Path) -> Result<Vec<BackupVersion>> {
    let mut versions: Vec<BackupVersion> = version_dir_names(root)?
        .into_iter()
        .map(|name| BackupVersion {
            label: parse_label(&name).unwrap_or_else(|| name.clone()),
            path: root.join(&name),
            name,
        })
        .collect();
    versions.sort_by(|a, b| b.label.cmp(&a.label));

    let current = root.join(CURRENT);
    if current.is_dir() {
        versions.insert(
            0,
            BackupVersion {
                name: CURRENT.to_string(),
                label: CURRENT.to_string(),
                path: current,
            },
        );
    }
    Ok(versions)
}

/// Deletes `backup_*` directories beyond the newest `retention` ones.
///
/// Each candidate is handled on its own: a failed delete is logged and the
/// remaining candidates are still processed. Returns the removed paths.
pub fn prune(root: &Path, retention: usize) -> Vec<PathBuf> {
    if retention <= 1 {
        return Vec::new();
    }
    let mut names = match version_dir_names(root) {
        Ok(names) => names,
        Err(err) => {
            warn!("cannot list {}: {}", root.display(), err);
            return Vec::new();
        }
    };
    names.sort_by(|a, b| b.cmp(a));

    let mut removed = Vec::new();
    for name in names.iter().skip(retention) {
        let target = root.join(name);
        info!("Removing old backup: {}", target.display());
        match fs::remove_dir_all(&target) {
            Ok(()) => removed.push(target),
            Err(err) => warn!("failed to remove {}: {}", target.display(), err),
        }
    }
    removed
}

/// Points `root/latest` at the directory name of `new_version`.
///
/// The link target is relative, so the whole destination tree can be moved.
pub fn update_latest_alias(root: &Path, new_version: &Path, retention: usize) -> Result<()> {
    if retention <= 1 {
        return Ok(());
    }
    let target = file_name_string(new_version)?;
    let link = root.join(LATEST);
    if let Ok(meta) = fs::symlink_metadata(&link) {
        if meta.is_dir() {
            warn!("skip updating {} (directory exists)", link.display());
            return Ok(());
        }
        fs::remove_file(&link)
            .map_err(|e| DriveVaultError::message(format!("remove {}: {}", link.display(), e)))?;
    }
    symlink(&target, &link)
        .map_err(|e| DriveVaultError::message(format!("symlink {}: {}", link.display(), e)))?;
    info!("Created symlink '{}' -> {}", LATEST, target);
    Ok(())
}
