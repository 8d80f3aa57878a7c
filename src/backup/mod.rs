use std::path::PathBuf;

use chrono::Local;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::sync::run_sync;
use crate::types::{RunMode, SourceKind};
use crate::util::command::ToolRunner;

pub mod stats;
pub mod versions;

use stats::{tree_stats, TreeStats};
use versions::{allocate_destination, prune, update_latest_alias, version_path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    pub destination: PathBuf,
    /// Versions removed by retention. Always empty for dry runs.
    pub pruned: Vec<PathBuf>,
    /// Size of the new version. `None` for dry runs.
    pub stats: Option<TreeStats>,
}

pub fn print_config_details(cfg: &Config) {
    let excludes = if cfg.exclude_patterns.is_empty() {
        "<none>".to_string()
    } else {
        cfg.exclude_patterns.join(", ")
    };
    println!("source: {}", cfg.source_type);
    match cfg.source_type {
        SourceKind::Rclone => println!("  remote: {}", cfg.rclone_remote),
        SourceKind::Local => println!("  path: {}", cfg.source_path().display()),
    }
    println!("  destination: {}", cfg.destination_root().display());
    println!("  keep versions: {}", cfg.keep_versions);
    println!("  excludes: {}", excludes);
}

/// Runs one backup: allocate the version directory, mirror into it, then
/// apply retention and move `latest`.
///
/// Retention and the alias are only touched after a successful, non-dry
/// sync. A failed sync leaves whatever the tool wrote in place. Once the
/// sync succeeded, housekeeping failures are logged and the run still
/// counts as successful.
pub fn perform_backup<R: ToolRunner>(
    runner: &mut R,
    cfg: &Config,
    run_mode: RunMode,
) -> Result<BackupOutcome> {
    if run_mode.verbose {
        print_config_details(cfg);
    }
    if cfg.source_type == SourceKind::Local && !cfg.source_path().is_dir() {
        return Err(ConfigError::SourceMissing(cfg.source_path().display().to_string()).into());
    }

    let root = cfg.destination_root();
    let destination = if run_mode.dry_run {
        let path = version_path(&root, cfg.keep_versions, Local::now().naive_local());
        info!("dry-run: mkdir -p {}", path.display());
        path
    } else {
        allocate_destination(&root, cfg.keep_versions)?
    };

    run_sync(runner, cfg, &destination, run_mode.dry_run)?;

    if run_mode.dry_run {
        return Ok(BackupOutcome {
            destination,
            pruned: Vec::new(),
            stats: None,
        });
    }

    let mut pruned = Vec::new();
    if cfg.is_versioned() {
        pruned = prune(&root, cfg.keep_versions);
        if let Err(err) = update_latest_alias(&root, &destination, cfg.keep_versions) {
            warn!("could not update latest alias: {}", err);
        }
    }
    let stats = tree_stats(&destination);
    info!(
        "Backup statistics: {} files, {:.2} GB",
        stats.files,
        stats.gib()
    );
    Ok(BackupOutcome {
        destination,
        pruned,
        stats: Some(stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::versions::{LATEST, VERSION_PREFIX};
    use crate::error::{DriveVaultError, ToolError};
    use crate::util::command::Captured;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::process::Command;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Pretends to be the sync tool: writes one file into the destination
    /// (the last argument) unless it was asked for a dry run.
    struct FakeSync {
        code: i32,
        calls: usize,
        /// Directory made read-only once the sync has written its file.
        freeze: Option<PathBuf>,
    }

    impl FakeSync {
        fn new(code: i32) -> Self {
            Self {
                code,
                calls: 0,
                freeze: None,
            }
        }
    }

    impl ToolRunner for FakeSync {
        fn stream(&mut self, cmd: &mut Command) -> Result<i32> {
            self.calls += 1;
            let args: Vec<String> = cmd
                .get_args()
                .map(|a| a.to_string_lossy().to_string())
                .collect();
            let dry_run = args.iter().any(|a| a == "--dry-run");
            let dest = if cmd.get_program() == "rclone" {
                PathBuf::from(&args[2])
            } else {
                PathBuf::from(args.last().expect("dest"))
            };
            if !dry_run {
                fs::write(dest.join("synced.txt"), b"0123456789").expect("write");
            }
            if let Some(dir) = &self.freeze {
                fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).expect("chmod");
            }
            Ok(self.code)
        }

        fn capture(&mut self, _cmd: &mut Command, _timeout: Option<Duration>) -> Result<Captured> {
            unreachable!("backup does not capture")
        }
    }

    fn config_for(dest: &Path, keep_versions: usize) -> Config {
        Config {
            backup_destination: dest.to_string_lossy().to_string(),
            keep_versions,
            ..Config::default()
        }
    }

    fn version_count(root: &Path) -> usize {
        fs::read_dir(root)
            .expect("read")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(VERSION_PREFIX))
            .count()
    }

    #[test]
    fn versioned_backup_prunes_and_links_latest() {
        let dir = TempDir::new().expect("tempdir");
        for name in ["backup_20000101_000000", "backup_20000102_000000", "backup_20000103_000000"] {
            fs::create_dir_all(dir.path().join(name)).expect("mkdir");
        }
        let cfg = config_for(dir.path(), 2);
        let mut runner = FakeSync::new(0);

        let outcome = perform_backup(&mut runner, &cfg, RunMode::default()).expect("backup");

        assert_eq!(version_count(dir.path()), 2);
        assert!(outcome.destination.join("synced.txt").is_file());
        assert!(dir.path().join("backup_20000103_000000").is_dir());
        assert_eq!(outcome.pruned.len(), 2);
        let target = fs::read_link(dir.path().join(LATEST)).expect("readlink");
        assert_eq!(Some(target.as_os_str()), outcome.destination.file_name());
        assert_eq!(outcome.stats, Some(TreeStats { files: 1, bytes: 10 }));
    }

    #[test]
    fn single_version_backup_writes_current_without_alias() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = config_for(dir.path(), 1);

        for _ in 0..2 {
            let mut runner = FakeSync::new(0);
            let outcome = perform_backup(&mut runner, &cfg, RunMode::default()).expect("backup");
            assert_eq!(outcome.destination, dir.path().join("current"));
        }
        assert_eq!(version_count(dir.path()), 0);
        assert!(fs::symlink_metadata(dir.path().join(LATEST)).is_err());
    }

    #[test]
    fn dry_run_leaves_destination_untouched() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("backup_20000101_000000")).expect("mkdir");
        fs::create_dir_all(dir.path().join("backup_20000102_000000")).expect("mkdir");
        let cfg = config_for(dir.path(), 2);
        let mut runner = FakeSync::new(0);

        let outcome = perform_backup(
            &mut runner,
            &cfg,
            RunMode {
                dry_run: true,
                verbose: false,
            },
        )
        .expect("dry run");

        assert_eq!(runner.calls, 1);
        assert!(outcome.pruned.is_empty());
        assert!(outcome.stats.is_none());
        assert!(!outcome.destination.exists());
        assert_eq!(version_count(dir.path()), 2);
        assert!(fs::symlink_metadata(dir.path().join(LATEST)).is_err());
    }

    #[test]
    fn failed_sync_skips_retention() {
        let dir = TempDir::new().expect("tempdir");
        for name in ["backup_20000101_000000", "backup_20000102_000000"] {
            fs::create_dir_all(dir.path().join(name)).expect("mkdir");
        }
        let cfg = config_for(dir.path(), 2);
        let mut runner = FakeSync::new(1);

        let err = perform_backup(&mut runner, &cfg, RunMode::default()).unwrap_err();
        assert!(matches!(err, DriveVaultError::Tool(ToolError::ExitStatus { code: 1, .. })));
        assert_eq!(version_count(dir.path()), 3);
        assert!(fs::symlink_metadata(dir.path().join(LATEST)).is_err());
    }

    #[test]
    fn local_source_must_exist_before_allocating() {
        let dir = TempDir::new().expect("tempdir");
        let mut cfg = config_for(&dir.path().join("dest"), 3);
        cfg.source_type = SourceKind::Local;
        cfg.local_source = dir.path().join("missing").to_string_lossy().to_string();
        let mut runner = FakeSync::new(0);

        let err = perform_backup(&mut runner, &cfg, RunMode::default()).unwrap_err();
        assert!(matches!(err, DriveVaultError::Config(ConfigError::SourceMissing(_))));
        assert!(!dir.path().join("dest").exists());
        assert_eq!(runner.calls, 0);
    }

    #[test]
    fn local_source_is_mirrored_with_rsync() {
        let dir = TempDir::new().expect("tempdir");
        let source = dir.path().join("drive");
        fs::create_dir_all(&source).expect("mkdir");
        let mut cfg = config_for(&dir.path().join("dest"), 3);
        cfg.source_type = SourceKind::Local;
        cfg.local_source = source.to_string_lossy().to_string();
        let mut runner = FakeSync::new(0);

        let outcome = perform_backup(&mut runner, &cfg, RunMode::default()).expect("backup");
        assert!(outcome.destination.join("synced.txt").is_file());
    }

    #[test]
    fn alias_failure_after_successful_sync_is_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("backup_20000101_000000")).expect("mkdir");
        fs::write(dir.path().join(LATEST), b"stale").expect("write latest");
        let cfg = config_for(dir.path(), 2);
        let mut runner = FakeSync::new(0);
        runner.freeze = Some(dir.path().to_path_buf());

        let result = perform_backup(&mut runner, &cfg, RunMode::default());
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).expect("chmod back");

        let outcome = result.expect("backup succeeds despite alias failure");
        assert!(outcome.destination.join("synced.txt").is_file());
        assert_eq!(outcome.stats, Some(TreeStats { files: 1, bytes: 10 }));
    }
}
