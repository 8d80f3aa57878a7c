use std::path::Path;
use std::process::Command;

use crate::config::Config;
use crate::error::{ConfigError, Result, ToolError};
use crate::util::command::ToolRunner;

pub const RCLONE: &str = "rclone";

pub fn sync_command(cfg: &Config, dest: &Path, exclude_file: &Path, dry_run: bool) -> Command {
    let mut cmd = Command::new(RCLONE);
    cmd.arg("sync").arg(&cfg.rclone_remote).arg(dest);
    cmd.args(&cfg.rclone_options);
    cmd.arg("--exclude-from").arg(exclude_file);
    if dry_run {
        cmd.arg("--dry-run");
    }
    cmd
}

/// Lists the immediate subdirectories of `path` as JSON.
pub fn lsjson_command(path: &str, verbose: bool) -> Command {
    let mut cmd = Command::new(RCLONE);
    cmd.arg("lsjson")
        .arg(path)
        .arg("--dirs-only")
        .arg("--max-depth")
        .arg("1");
    if verbose {
        cmd.arg("-vv");
    }
    cmd
}

/// Remote name as printed by `rclone listremotes`, e.g. `onedrive:` for
/// `onedrive:Documents`.
pub fn remote_name(remote: &str) -> &str {
    match remote.find(':') {
        Some(idx) => &remote[..=idx],
        None => remote,
    }
}

pub fn check_remote<R: ToolRunner>(runner: &mut R, remote: &str) -> Result<()> {
    let mut cmd = Command::new(RCLONE);
    cmd.arg("listremotes");
    let out = runner.capture(&mut cmd, None)?;
    if !out.success() {
        return Err(ToolError::ExitStatus {
            program: "rclone listremotes".to_string(),
            code: out.code,
        }
        .into());
    }
    let wanted = remote_name(remote);
    if out.stdout.lines().any(|line| line.trim() == wanted) {
        Ok(())
    } else {
        Err(ConfigError::RemoteNotConfigured(remote.to_string()).into())
    }
}
