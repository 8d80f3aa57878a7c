use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;

use crate::backup::stats::tree_stats;
use crate::backup::versions::{enumerate_versions, BackupVersion};
use crate::cli::args::RestoreArgs;
use crate::config::load_config;
use crate::error::RestoreError;
use crate::logging;
use crate::restore::search::search_in_backup;
use crate::restore::{confirm, default_destination, restore_files, select_version};
use crate::sync::{require_tool, rsync::RSYNC};
use crate::util::command::SystemRunner;
use crate::util::paths::expand_home;

const SEARCH_DISPLAY_LIMIT: usize = 20;

pub fn run_restore_command(config_path: &Path, args: &RestoreArgs, verbose: bool) -> Result<()> {
    logging::init(None, verbose)?;
    let stdin = io::stdin();
    restore_with(config_path, args, &mut stdin.lock(), &mut io::stdout())
}

fn restore_with<I: BufRead, W: Write>(
    config_path: &Path,
    args: &RestoreArgs,
    input: &mut I,
    output: &mut W,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let root = cfg.destination_root();
    if !root.is_dir() {
        return Err(RestoreError::BackupDirMissing(root.display().to_string()).into());
    }
    let versions = enumerate_versions(&root)?;

    if args.list {
        print_versions(&versions);
        return Ok(());
    }

    let version = select_version(&versions, args.backup.as_deref())?;
    println!("Using backup: {}", version.path.display());

    if let Some(pattern) = &args.search {
        print_matches(&search_in_backup(&version.path, pattern)?);
        return Ok(());
    }

    let destination = match &args.destination {
        Some(dest) => expand_home(dest),
        None => default_destination(&cfg),
    };

    require_tool(RSYNC)?;
    if !args.dry_run && !args.yes {
        let prompt = format!("Restore to {}?", destination.display());
        if !confirm(&prompt, input, output)? {
            println!("Restore cancelled");
            return Ok(());
        }
    }

    let mut runner = SystemRunner;
    let summary = restore_files(&mut runner, &version.path, &destination, &args.files, args.dry_run)?;
    for missing in &summary.missing {
        println!("Not found in backup: {}", missing.display());
    }
    if !args.dry_run {
        println!("Restore complete to: {}", destination.display());
    }
    Ok(())
}

fn print_versions(versions: &[BackupVersion]) {
    if versions.is_empty() {
        println!("No backups found");
        return;
    }
    println!("Available backups:");
    for version in versions {
        let stats = tree_stats(&version.path);
        println!("  {}: {:.2} GB", version.label, stats.gib());
    }
}

fn print_matches(matches: &[std::path::PathBuf]) {
    if matches.is_empty() {
        println!("No matching files found");
        return;
    }
    println!("Found {} matching files:", matches.len());
    for found in matches.iter().take(SEARCH_DISPLAY_LIMIT) {
        println!("  {}", found.display());
    }
    if matches.len() > SEARCH_DISPLAY_LIMIT {
        println!("  ... and {} more", matches.len() - SEARCH_DISPLAY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{save_config, Config};
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, dest: &Path) -> std::path::PathBuf {
        let path = dir.join("config.json");
        let cfg = Config {
            backup_destination: dest.to_string_lossy().to_string(),
            ..Config::default()
        };
        save_config(&path, &cfg).expect("save");
        path
    }

    #[test]
    fn missing_backup_dir_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(dir.path(), &dir.path().join("nowhere"));
        let err = run_restore_command(&path, &RestoreArgs::default(), false).unwrap_err();
        assert!(err.to_string().starts_with("backup directory not found"));
    }

    #[test]
    fn unknown_version_token_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let dest = dir.path().join("dest");
        fs::create_dir_all(dest.join("backup_20240101_000000")).expect("mkdir");
        let path = write_config(dir.path(), &dest);
        let args = RestoreArgs {
            backup: Some("2019".to_string()),
            ..RestoreArgs::default()
        };
        let err = run_restore_command(&path, &args, false).unwrap_err();
        assert_eq!(err.to_string(), "backup not found: 2019");
    }

    #[test]
    fn list_and_search_do_not_restore() {
        let dir = TempDir::new().expect("tempdir");
        let dest = dir.path().join("dest");
        fs::create_dir_all(dest.join("current/Docs")).expect("mkdir");
        fs::write(dest.join("current/Docs/plan.txt"), b"x").expect("write");
        let path = write_config(dir.path(), &dest);

        let list = RestoreArgs {
            list: true,
            ..RestoreArgs::default()
        };
        run_restore_command(&path, &list, false).expect("list");

        let search = RestoreArgs {
            search: Some("*.txt".to_string()),
            ..RestoreArgs::default()
        };
        run_restore_command(&path, &search, false).expect("search");
    }

    #[test]
    fn rsync_is_required_before_the_prompt() {
        let dir = TempDir::new().expect("tempdir");
        let dest = dir.path().join("dest");
        fs::create_dir_all(dest.join("current")).expect("mkdir");
        let path = write_config(dir.path(), &dest);
        let target = dir.path().join("restored");
        let args = RestoreArgs {
            destination: Some(target.to_string_lossy().to_string()),
            ..RestoreArgs::default()
        };
        let mut input = "n\n".as_bytes();
        let mut output = Vec::new();

        let result = restore_with(&path, &args, &mut input, &mut output);

        if which::which(RSYNC).is_err() {
            assert!(result.unwrap_err().to_string().contains("rsync"));
            assert!(output.is_empty());
        } else {
            result.expect("cancelled restore");
            assert!(String::from_utf8_lossy(&output).starts_with("Restore to "));
            assert!(!target.exists());
        }
    }
}
