use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::SourceKind;
use crate::util::paths::expand_home;

/// On-disk settings for a backup/restore setup.
///
/// Every key is optional in the file; absent keys take the values of
/// [`Config::default`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source_type: SourceKind,
    pub rclone_remote: String,
    pub local_source: String,
    pub backup_destination: String,
    pub exclude_patterns: Vec<String>,
    pub rsync_options: Vec<String>,
    pub rclone_options: Vec<String>,
    pub log_file: String,
    /// Number of `backup_*` versions kept. `1` (or `0`) keeps a single
    /// `current` mirror with no history.
    pub keep_versions: usize,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_type: SourceKind::Rclone,
            rclone_remote: "onedrive:".to_string(),
            local_source: "~/OneDrive".to_string(),
            backup_destination: "~/onedrive-backup".to_string(),
            exclude_patterns: strings(&["*.tmp", "~$*", ".DS_Store", "Thumbs.db", "desktop.ini"]),
            rsync_options: strings(&[
                "--archive",
                "--verbose",
                "--human-readable",
                "--progress",
                "--delete-after",
                "--partial",
            ]),
            rclone_options: strings(&[
                "--verbose",
                "--progress",
                "--transfers",
                "4",
                "--checkers",
                "8",
                "--contimeout",
                "60s",
                "--timeout",
                "300s",
                "--retries",
                "3",
                "--low-level-retries",
                "10",
            ]),
            log_file: "~/onedrive-backup/backup.log".to_string(),
            keep_versions: 3,
            dry_run: false,
        }
    }
}

impl Config {
    pub fn destination_root(&self) -> PathBuf {
        expand_home(&self.backup_destination)
    }

    pub fn source_path(&self) -> PathBuf {
        expand_home(&self.local_source)
    }

    pub fn log_path(&self) -> PathBuf {
        expand_home(&self.log_file)
    }

    /// True when old versions are kept next to the newest one, which is when
    /// retention and the `latest` alias apply.
    pub fn is_versioned(&self) -> bool {
        self.keep_versions > 1
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
