use std::time::Duration;

use serde::Deserialize;

use crate::error::{DriveVaultError, Result};
use crate::sync::rclone::lsjson_command;
use crate::util::command::ToolRunner;

/// One object of `rclone lsjson` output.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListingEntry {
    pub path: String,
    pub name: String,
    /// `-1` for directories.
    pub size: i64,
    pub mod_time: Option<String>,
    pub is_dir: bool,
}

/// Result of listing one remote path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub success: bool,
    pub entries: Vec<ListingEntry>,
    /// Raw diagnostic output of the listing call, kept even on success.
    pub diagnostics: String,
}

/// Lists the immediate children of a remote path.
///
/// An `Err` means the call did not finish (timeout, spawn failure, garbled
/// output); callers treat it as inconclusive.
pub trait RemoteLister {
    fn list(&mut self, path: &str, timeout: Duration) -> Result<Listing>;
}

pub struct RcloneLister<R: ToolRunner> {
    runner: R,
    verbose: bool,
}

impl<R: ToolRunner> RcloneLister<R> {
    pub fn new(runner: R, verbose: bool) -> Self {
        Self { runner, verbose }
    }
}

pub fn parse_lsjson(stdout: &str) -> Result<Vec<ListingEntry>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(stdout)
        .map_err(|e| DriveVaultError::message(format!("parse lsjson output: {}", e)))
}

impl<R: ToolRunner> RemoteLister for RcloneLister<R> {
    fn list(&mut self, path: &str, timeout: Duration) -> Result<Listing> {
        let mut cmd = lsjson_command(path, self.verbose);
        let out = self.runner.capture(&mut cmd, Some(timeout))?;
        if !out.success() {
            return Ok(Listing {
                success: false,
                entries: Vec::new(),
                diagnostics: out.stderr,
            });
        }
        Ok(Listing {
            success: true,
            entries: parse_lsjson(&out.stdout)?,
            diagnostics: out.stderr,
        })
    }
}
