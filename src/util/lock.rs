use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DriveVaultError, Result};

pub const LOCK_FILE_NAME: &str = ".drivevault.lock";

/// Advisory PID lock on a backup destination root. Released on drop.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = unlock_file(&self.path);
    }
}

pub fn acquire_lock(root: &Path) -> Result<LockGuard> {
    let path = root.join(LOCK_FILE_NAME);
    match lock_file(&path) {
        Ok(true) => {
            debug!("acquired lock {}", path.display());
            Ok(LockGuard { path })
        }
        Ok(false) => Err(DriveVaultError::message(format!(
            "another backup is already running against {}",
            root.display()
        ))),
        Err(e) => Err(DriveVaultError::message(format!(
            "failed to lock {}: {}",
            path.display(),
            e
        ))),
    }
}

fn lock_file(path: &Path) -> io::Result<bool> {
    for _ in 0..3 {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut f) => {
                writeln!(f, "{}", std::process::id())?;
                return Ok(true);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let pid = match fs::read_to_string(path) {
                    Ok(text) => text.trim().parse::<u32>().ok(),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(err) => return Err(err),
                };
                if let Some(pid) = pid {
                    if Path::new("/proc").join(pid.to_string()).exists() {
                        return Ok(false);
                    }
                }
                debug!("removing stale lock {}", path.display());
                match fs::remove_file(path) {
                    Ok(()) => continue,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(err) => return Err(err),
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(false)
}

fn unlock_file(path: &Path) -> io::Result<()> {
    let pid = fs::read_to_string(path).ok();
    if let Some(pid) = pid {
        if pid.trim() == std::process::id().to_string() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
