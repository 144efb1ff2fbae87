//! Error types for the scanning module.
//!
//! Almost nothing that goes wrong during a scan is fatal: per-file
//! failures are recorded inline in the digest. The variants here are
//! the only two outcomes that abort the whole operation.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail during scanning.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Things that can go wrong when scanning a directory tree.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Couldn't open the scan root itself. Per-file and per-subdirectory
    /// failures are recovered locally; only this one is fatal.
    #[error("failed to access scan root '{path}': {source}")]
    RootAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every file in the tree was ignored or pruned. Surfaced as an
    /// error value rather than an empty digest so callers fail the
    /// generation pipeline instead of sending an empty prompt.
    #[error("no readable files found in '{0}'")]
    NoReadableFiles(PathBuf),
}

impl ScanError {
    /// Creates a root access error with the path for context.
    pub fn root(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RootAccess {
            path: path.into(),
            source,
        }
    }
}
