//! Breadth-first scan of a remote tree for paths whose listing fails with a
//! resource-handle error.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::Result;

pub mod listing;

use listing::RemoteLister;

pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);
pub const ERROR_SIGNATURES: [&str; 2] = ["ObjectHandle is Invalid", "invalidResourceId"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Every path listed, in visiting order.
    pub visited: Vec<String>,
    /// Paths whose listing carried an error signature. Never descended into.
    pub problematic: Vec<String>,
    /// Paths whose listing timed out or failed without a signature.
    pub inconclusive: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCheck {
    Accessible,
    Problematic { diagnostics: String },
    Unreadable { diagnostics: String },
}

pub fn has_error_signature(text: &str) -> bool {
    ERROR_SIGNATURES.iter().any(|sig| text.contains(sig))
}

/// Address of `name` under `parent`. A remote root such as `onedrive:` takes
/// the name directly; nested paths are joined with `/`.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with(':') || parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Walks the tree under `root` one path at a time, FIFO.
///
/// There is no revisit protection; the remote is assumed to be a finite
/// acyclic hierarchy.
pub fn probe_tree<L: RemoteLister>(lister: &mut L, root: &str, timeout: Duration) -> ProbeReport {
    let mut report = ProbeReport::default();
    let mut pending = VecDeque::from([root.to_string()]);

    while let Some(path) = pending.pop_front() {
        info!("Checking: {}", path);
        report.visited.push(path.clone());
        let listing = match lister.list(&path, timeout) {
            Ok(listing) => listing,
            Err(err) => {
                warn!("inconclusive {}: {}", path, err);
                report.inconclusive.push(path);
                continue;
            }
        };
        if has_error_signature(&listing.diagnostics) {
            warn!("error signature found at: {}", path);
            report.problematic.push(path);
            continue;
        }
        if !listing.success {
            warn!("listing {} failed without a known error signature", path);
            report.inconclusive.push(path);
            continue;
        }
        for entry in listing.entries.iter().filter(|e| e.is_dir) {
            pending.push_back(child_path(&path, &entry.name));
        }
    }
    report
}

/// Lists a single path and classifies the result.
pub fn probe_path<L: RemoteLister>(lister: &mut L, path: &str, timeout: Duration) -> Result<PathCheck> {
    let listing = lister.list(path, timeout)?;
    if has_error_signature(&listing.diagnostics) {
        return Ok(PathCheck::Problematic {
            diagnostics: listing.diagnostics,
        });
    }
    if !listing.success {
        return Ok(PathCheck::Unreadable {
            diagnostics: listing.diagnostics,
        });
    }
    Ok(PathCheck::Accessible)
}
