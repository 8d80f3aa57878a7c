use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Exclusion patterns materialized as a newline-delimited file for
/// `--exclude-from`. The file is deleted when the value is dropped.
#[derive(Debug)]
pub struct ExcludeList {
    file: NamedTempFile,
}

impl ExcludeList {
    pub fn write(patterns: &[String]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("drivevault-exclude")
            .suffix(".txt")
            .tempfile()?;
        for pattern in patterns {
            writeln!(file, "{}", pattern)?;
        }
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
