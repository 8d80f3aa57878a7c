use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::args::{Cli, Command};
use crate::cli::commands::{backup, probe, restore};

const CONFIG_FILE: &str = "config.json";
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod args;
pub mod commands;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if cli.verbose {
        print_banner();
    }
    match &cli.command {
        Command::Backup(args) => backup::run_backup_command(&config_path, args, cli.verbose)?,
        Command::Restore(args) => restore::run_restore_command(&config_path, args, cli.verbose)?,
        Command::Probe(args) => probe::run_probe_command(&config_path, args, cli.verbose)?,
    }
    Ok(())
}

fn print_banner() {
    println!("DriveVault {}", VERSION);
}
