use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "drivevault",
    version,
    about = "Versioned backups of a cloud drive folder using rclone or rsync"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Mirror the drive into a new backup version
    Backup(BackupArgs),
    /// Restore files from a backup version
    Restore(RestoreArgs),
    /// Scan the remote for paths that fail with resource-handle errors
    Probe(ProbeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct BackupArgs {
    /// Perform a dry run without making changes
    #[arg(long)]
    pub dry_run: bool,
    /// Create the default configuration and exit
    #[arg(long)]
    pub setup: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RestoreArgs {
    /// List available backups
    #[arg(long)]
    pub list: bool,
    /// Backup version to restore from (default: latest)
    #[arg(long)]
    pub backup: Option<String>,
    /// Restore destination (default: original location)
    #[arg(long)]
    pub destination: Option<String>,
    /// Specific files to restore, relative to the backup root
    #[arg(long, num_args = 1..)]
    pub files: Vec<PathBuf>,
    /// Search for files matching a glob pattern
    #[arg(long)]
    pub search: Option<String>,
    /// Show what would be restored without doing it
    #[arg(long)]
    pub dry_run: bool,
    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Test only this remote path
    pub path: Option<String>,
    /// Remote root to scan (default: rclone_remote from the configuration)
    #[arg(long)]
    pub remote: Option<String>,
}
