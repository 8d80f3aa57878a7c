use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::config::model::Config;
use crate::error::{DriveVaultError, Result};

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let mut data = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut data, PrettyFormatter::with_indent(b"    "));
    cfg.serialize(&mut ser)
        .map_err(|e| DriveVaultError::message(format!("encode config: {}", e)))?;
    data.push(b'\n');
    let mut file = File::create(path)
        .map_err(|e| DriveVaultError::message(format!("write config {}: {}", path.display(), e)))?;
    file.write_all(&data)
        .map_err(|e| DriveVaultError::message(format!("write config {}: {}", path.display(), e)))?;
    Ok(())
}
