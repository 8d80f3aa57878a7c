use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveVaultError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Tool(ToolError),
    #[error("{0}")]
    Restore(RestoreError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
    #[error("remote {0:?} not found in rclone config (run `rclone config` to set it up)")]
    RemoteNotConfigured(String),
    #[error("source directory not found: {0}")]
    SourceMissing(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required tool {tool} ({hint})")]
    Missing { tool: String, hint: String },
    #[error("{program} failed with exit code {code}")]
    ExitStatus { program: String, code: i32 },
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },
    #[error("{program}: {message}")]
    Spawn { program: String, message: String },
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("backup directory not found: {0}")]
    BackupDirMissing(String),
    #[error("no backups found")]
    NoBackups,
    #[error("backup not found: {0}")]
    VersionNotFound(String),
}

pub type Result<T> = std::result::Result<T, DriveVaultError>;

impl DriveVaultError {
    pub fn message(msg: impl Into<String>) -> Self {
        DriveVaultError::Message(msg.into())
    }
}

impl From<ConfigError> for DriveVaultError {
    fn from(err: ConfigError) -> Self {
        DriveVaultError::Config(err)
    }
}

impl From<ToolError> for DriveVaultError {
    fn from(err: ToolError) -> Self {
        DriveVaultError::Tool(err)
    }
}

impl From<RestoreError> for DriveVaultError {
    fn from(err: RestoreError) -> Self {
        DriveVaultError::Restore(err)
    }
}
