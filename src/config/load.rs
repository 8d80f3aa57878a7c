use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::config::model::Config;
use crate::config::save::save_config;
use crate::error::{ConfigError, DriveVaultError, Result};
use crate::types::SourceKind;

/// Result of [`load_or_create`].
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Config),
    /// No file existed; the defaults were written to disk.
    Created(Config),
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(DriveVaultError::message(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    let cfg: Config =
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn load_or_create(path: &Path) -> Result<LoadOutcome> {
    if path.exists() {
        return load_config(path).map(LoadOutcome::Loaded);
    }
    let cfg = Config::default();
    save_config(path, &cfg)?;
    info!("created default configuration file: {}", path.display());
    Ok(LoadOutcome::Created(cfg))
}

fn validate(cfg: &Config) -> Result<()> {
    if cfg.backup_destination.trim().is_empty() {
        return Err(ConfigError::Invalid("backup_destination is empty".to_string()).into());
    }
    if cfg.log_file.trim().is_empty() {
        return Err(ConfigError::Invalid("log_file is empty".to_string()).into());
    }
    match cfg.source_type {
        SourceKind::Rclone if cfg.rclone_remote.trim().is_empty() => Err(ConfigError::Invalid(
            "rclone_remote is required for source_type rclone".to_string(),
        )
        .into()),
        SourceKind::Local if cfg.local_source.trim().is_empty() => Err(ConfigError::Invalid(
            "local_source is required for source_type local".to_string(),
        )
        .into()),
        _ => Ok(()),
    }
}
