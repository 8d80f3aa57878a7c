use std::path::Path;

use anyhow::Result;

use crate::cli::args::ProbeArgs;
use crate::config::{load_config, Config};
use crate::logging;
use crate::probe::listing::RcloneLister;
use crate::probe::{probe_path, probe_tree, PathCheck, ProbeReport, LIST_TIMEOUT};
use crate::sync::{rclone::RCLONE, require_tool};
use crate::util::command::SystemRunner;

pub fn run_probe_command(config_path: &Path, args: &ProbeArgs, verbose: bool) -> Result<()> {
    logging::init(None, verbose)?;
    require_tool(RCLONE)?;

    if let Some(path) = &args.path {
        println!("Testing path: {}", path);
        let mut lister = RcloneLister::new(SystemRunner, true);
        match probe_path(&mut lister, path, LIST_TIMEOUT)? {
            PathCheck::Accessible => println!("Path is accessible: {}", path),
            PathCheck::Problematic { diagnostics } => {
                println!("ERROR: resource handle error for path: {}", path);
                println!();
                println!("Detailed error output:");
                println!("{}", diagnostics);
            }
            PathCheck::Unreadable { diagnostics } => {
                println!("Path could not be listed: {}", path);
                println!("{}", diagnostics);
            }
        }
        return Ok(());
    }

    let root = resolve_root(config_path, args.remote.as_deref())?;
    println!("Scanning {} for problematic files/folders...", root);
    println!("This may take a few minutes...");
    println!();
    let mut lister = RcloneLister::new(SystemRunner, verbose);
    let report = probe_tree(&mut lister, &root, LIST_TIMEOUT);
    print_report(&report);
    Ok(())
}

/// Remote to scan: `--remote`, else the configured remote when a
/// configuration file exists, else the default remote.
pub fn resolve_root(config_path: &Path, remote: Option<&str>) -> crate::error::Result<String> {
    if let Some(remote) = remote {
        return Ok(remote.to_string());
    }
    if config_path.exists() {
        return Ok(load_config(config_path)?.rclone_remote);
    }
    Ok(Config::default().rclone_remote)
}

fn print_report(report: &ProbeReport) {
    println!();
    println!("{}", "=".repeat(50));
    println!("Checked {} path(s)", report.visited.len());
    if !report.inconclusive.is_empty() {
        println!("Inconclusive (timeout or other error):");
        for path in &report.inconclusive {
            println!("  - {}", path);
        }
    }
    if report.problematic.is_empty() {
        println!("No problematic paths found.");
        println!("The error might be transient or related to specific file operations.");
        return;
    }
    println!("PROBLEMATIC PATHS FOUND:");
    for path in &report.problematic {
        println!("  - {}", path);
    }
    println!();
    println!("You can exclude these paths from your backup by adding them to exclude_patterns in the configuration.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::save_config;
    use tempfile::TempDir;

    #[test]
    fn explicit_remote_wins() {
        let dir = TempDir::new().expect("tempdir");
        let root = resolve_root(&dir.path().join("config.json"), Some("gdrive:")).expect("root");
        assert_eq!(root, "gdrive:");
    }

    #[test]
    fn configured_remote_is_used_when_present() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        let cfg = Config {
            rclone_remote: "work:".to_string(),
            ..Config::default()
        };
        save_config(&path, &cfg).expect("save");
        assert_eq!(resolve_root(&path, None).expect("root"), "work:");
    }

    #[test]
    fn default_remote_without_config() {
        let dir = TempDir::new().expect("tempdir");
        let root = resolve_root(&dir.path().join("config.json"), None).expect("root");
        assert_eq!(root, "onedrive:");
    }
}
