use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the backup data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Cloud drive reached through an rclone remote.
    Rclone,
    /// Locally mounted drive folder mirrored with rsync.
    Local,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Rclone => "rclone",
            SourceKind::Local => "local",
        }
    }

    /// External tool that performs the sync for this source.
    pub fn tool(&self) -> &'static str {
        match self {
            SourceKind::Rclone => "rclone",
            SourceKind::Local => "rsync",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}
