pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod restore;
pub mod sync;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::{DriveVaultError, Result};
pub use types::{RunMode, SourceKind};
