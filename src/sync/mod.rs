//! Invocation of the external sync tools.

use std::path::Path;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{ConfigError, Result, ToolError};
use crate::types::SourceKind;
use crate::util::command::{format_command, program_name, ToolRunner};

pub mod excludes;
pub mod rclone;
pub mod rsync;

use excludes::ExcludeList;

fn install_hint(tool: &str) -> &'static str {
    match tool {
        rclone::RCLONE => "install rclone: https://rclone.org/install/",
        rsync::RSYNC => "install rsync: sudo apt-get install rsync",
        _ => "install it and make sure it is on PATH",
    }
}

pub fn check_dependencies(kind: SourceKind) -> Result<()> {
    require_tool(kind.tool())
}

pub fn require_tool(tool: &str) -> Result<()> {
    if which::which(tool).is_err() {
        return Err(ToolError::Missing {
            tool: tool.to_string(),
            hint: install_hint(tool).to_string(),
        }
        .into());
    }
    Ok(())
}

/// Mirrors the configured source into `dest`.
///
/// The exclusion list only lives for the duration of the call.
pub fn run_sync<R: ToolRunner>(
    runner: &mut R,
    cfg: &Config,
    dest: &Path,
    dry_run: bool,
) -> Result<()> {
    let excludes = ExcludeList::write(&cfg.exclude_patterns)?;
    let mut cmd = match cfg.source_type {
        SourceKind::Rclone => rclone::sync_command(cfg, dest, excludes.path(), dry_run),
        SourceKind::Local => {
            let source = cfg.source_path();
            if !source.is_dir() {
                return Err(ConfigError::SourceMissing(source.display().to_string()).into());
            }
            rsync::mirror_command(cfg, &source, dest, excludes.path(), dry_run)
        }
    };
    info!("Running: {}", format_command(&cmd));
    let code = runner.stream(&mut cmd)?;
    if code != 0 {
        error!("{} failed with return code: {}", program_name(&cmd), code);
        return Err(ToolError::ExitStatus {
            program: program_name(&cmd),
            code,
        }
        .into());
    }
    info!("sync completed successfully");
    Ok(())
}
