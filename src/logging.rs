//! Logging setup using tracing.
//!
//! Events go to stdout and, for backup runs, are appended to the configured
//! log file as `YYYY-MM-DD HH:MM:SS LEVEL message` lines.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{DriveVaultError, Result};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        DriveVaultError::message(format!("create {}: {}", parent.display(), e))
                    })?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DriveVaultError::message(format!("open {}: {}", path.display(), e)))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(LocalTimer),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_timer(LocalTimer),
        )
        .with(file_layer)
        .try_init();
    Ok(())
}
