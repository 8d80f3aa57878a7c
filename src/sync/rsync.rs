use std::path::Path;
use std::process::Command;

use crate::config::Config;
use crate::util::paths::with_trailing_slash;

pub const RSYNC: &str = "rsync";

/// Mirror of the local drive folder into `dest`.
pub fn mirror_command(
    cfg: &Config,
    source: &Path,
    dest: &Path,
    exclude_file: &Path,
    dry_run: bool,
) -> Command {
    let mut cmd = Command::new(RSYNC);
    cmd.args(&cfg.rsync_options);
    cmd.arg("--exclude-from").arg(exclude_file);
    if dry_run {
        cmd.arg("--dry-run");
    }
    cmd.arg(with_trailing_slash(source)).arg(dest);
    cmd
}

/// Copy from a backup version back to a restore destination. `source` is
/// passed through untouched so callers decide between a tree (`dir/`) and a
/// single file.
pub fn restore_command(source: &str, dest: &Path, dry_run: bool) -> Command {
    let mut cmd = Command::new(RSYNC);
    cmd.arg("-avh").arg("--progress");
    if dry_run {
        cmd.arg("--dry-run");
    }
    cmd.arg(source).arg(dest);
    cmd
}
