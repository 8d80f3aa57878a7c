use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::backup::versions::BackupVersion;
use crate::config::Config;
use crate::error::{DriveVaultError, RestoreError, Result, ToolError};
use crate::sync::rsync::restore_command;
use crate::types::SourceKind;
use crate::util::command::{format_command, ToolRunner};
use crate::util::paths::{expand_home, with_trailing_slash};

pub mod search;

pub const DEFAULT_RESTORE_DIR: &str = "~/OneDrive-Restored";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Files restored individually. Empty for a whole-tree restore.
    pub restored: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Resolves `token` against the enumerated versions: the first version whose
/// label or path contains it. Without a token, the most recent version.
pub fn select_version<'a>(
    versions: &'a [BackupVersion],
    token: Option<&str>,
) -> Result<&'a BackupVersion> {
    match token {
        Some(token) => versions
            .iter()
            .find(|v| v.label.contains(token) || v.path.to_string_lossy().contains(token))
            .ok_or_else(|| RestoreError::VersionNotFound(token.to_string()).into()),
        None => versions.first().ok_or_else(|| RestoreError::NoBackups.into()),
    }
}

pub fn default_destination(cfg: &Config) -> PathBuf {
    match cfg.source_type {
        SourceKind::Local => cfg.source_path(),
        SourceKind::Rclone => expand_home(DEFAULT_RESTORE_DIR),
    }
}

/// Asks a yes/no question. Only `y` (any case) counts as yes.
pub fn confirm<I: BufRead, O: Write>(prompt: &str, input: &mut I, output: &mut O) -> Result<bool> {
    write!(output, "{} (y/n): ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn run_rsync<R: ToolRunner>(runner: &mut R, source: &str, dest: &Path, dry_run: bool) -> Result<()> {
    let mut cmd = restore_command(source, dest, dry_run);
    info!("Running: {}", format_command(&cmd));
    let code = runner.stream(&mut cmd)?;
    if code != 0 {
        return Err(ToolError::ExitStatus {
            program: "rsync".to_string(),
            code,
        }
        .into());
    }
    Ok(())
}

/// Copies a backup version (or selected relative files from it) to
/// `destination`.
pub fn restore_files<R: ToolRunner>(
    runner: &mut R,
    version_path: &Path,
    destination: &Path,
    files: &[PathBuf],
    dry_run: bool,
) -> Result<RestoreSummary> {
    let mut summary = RestoreSummary::default();
    if files.is_empty() {
        println!("Restoring entire backup to {}", destination.display());
        run_rsync(runner, &with_trailing_slash(version_path), destination, dry_run)?;
        return Ok(summary);
    }

    for file in files {
        if file.is_absolute() {
            return Err(DriveVaultError::message(format!(
                "{} must be relative to the backup root",
                file.display()
            )));
        }
        let source = version_path.join(file);
        if !source.exists() {
            warn!("not in backup, skipping: {}", file.display());
            summary.missing.push(file.clone());
            continue;
        }
        let target = destination.join(file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| DriveVaultError::message(format!("create {}: {}", parent.display(), e)))?;
        }
        println!("Restoring: {}", file.display());
        run_rsync(runner, &source.to_string_lossy(), &target, dry_run)?;
        summary.restored.push(file.clone());
    }
    Ok(summary)
}
