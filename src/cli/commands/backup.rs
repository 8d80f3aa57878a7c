use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info};

use crate::backup::{perform_backup, BackupOutcome};
use crate::cli::args::BackupArgs;
use crate::config::{load_or_create, Config, LoadOutcome};
use crate::error::DriveVaultError;
use crate::logging;
use crate::sync::{check_dependencies, rclone::check_remote};
use crate::types::{RunMode, SourceKind};
use crate::util::command::SystemRunner;
use crate::util::lock::acquire_lock;

/// Resolves the configuration for a backup run. `None` means the command
/// is finished (setup only).
fn prepare_config(config_path: &Path, args: &BackupArgs) -> Result<Option<Config>> {
    match load_or_create(config_path)? {
        LoadOutcome::Created(cfg) => {
            println!("Created default configuration file: {}", config_path.display());
            println!("Please edit this file to match your setup before running the backup.");
            if args.setup {
                return Ok(None);
            }
            Ok(Some(cfg))
        }
        LoadOutcome::Loaded(_) if args.setup => {
            println!("Configuration file already exists: {}", config_path.display());
            Ok(None)
        }
        LoadOutcome::Loaded(cfg) => Ok(Some(cfg)),
    }
}

pub fn run_backup_command(config_path: &Path, args: &BackupArgs, verbose: bool) -> Result<()> {
    let cfg = match prepare_config(config_path, args)? {
        Some(cfg) => cfg,
        None => return Ok(()),
    };

    let run_mode = RunMode {
        dry_run: args.dry_run || cfg.dry_run,
        verbose,
    };
    logging::init(Some(&cfg.log_path()), verbose)?;

    let started = Instant::now();
    if run_mode.dry_run {
        info!("Running in DRY RUN mode - no changes will be made");
    }
    info!("Starting {} backup", cfg.source_type);

    let result = execute(&cfg, run_mode);
    let elapsed = started.elapsed().as_secs_f64();
    match &result {
        Ok(_) => info!("Backup completed in {:.2} seconds", elapsed),
        Err(err) => error!("Backup failed in {:.2} seconds: {}", elapsed, err),
    }
    result?;
    Ok(())
}

fn execute(cfg: &Config, run_mode: RunMode) -> crate::error::Result<BackupOutcome> {
    check_dependencies(cfg.source_type)?;
    let mut runner = SystemRunner;
    if cfg.source_type == SourceKind::Rclone {
        check_remote(&mut runner, &cfg.rclone_remote)?;
    }

    let _lock = if run_mode.dry_run {
        None
    } else {
        let root = cfg.destination_root();
        fs::create_dir_all(&root).map_err(|e| {
            DriveVaultError::message(format!("create {}: {}", root.display(), e))
        })?;
        Some(acquire_lock(&root)?)
    };

    perform_backup(&mut runner, cfg, run_mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::TempDir;

    #[test]
    fn setup_writes_default_config_and_succeeds() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        let args = BackupArgs {
            dry_run: false,
            setup: true,
        };
        run_backup_command(&path, &args, false).expect("setup");
        assert_eq!(load_config(&path).expect("load"), Config::default());

        run_backup_command(&path, &args, false).expect("setup again");
    }

    #[test]
    fn missing_config_without_setup_continues_with_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        let args = BackupArgs {
            dry_run: true,
            setup: false,
        };

        let cfg = prepare_config(&path, &args).expect("prepare");

        assert_eq!(cfg, Some(Config::default()));
        assert!(path.is_file());
    }

    #[test]
    fn existing_config_is_used_for_the_run() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        let setup = BackupArgs {
            dry_run: false,
            setup: true,
        };
        assert_eq!(prepare_config(&path, &setup).expect("create"), None);
        assert_eq!(prepare_config(&path, &setup).expect("exists"), None);

        let cfg = prepare_config(&path, &BackupArgs::default()).expect("load");
        assert_eq!(cfg, Some(Config::default()));
    }
}
