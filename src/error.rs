//! Error types for agent-skills-sync.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the installation engine.
///
/// Link-creation failure is deliberately *not* a variant: the projector
/// recovers from it by copying and surfaces it as the `link_failed` flag on
/// the result. An unreadable descriptor is also not an error; directories
/// without a valid descriptor are simply not skills.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A computed path escaped its expected base directory.
    ///
    /// Always fatal for the operation that computed it, never retried,
    /// never downgraded to a warning.
    #[error("unsafe path: {path} escapes {base}")]
    UnsafePath { base: PathBuf, path: PathBuf },

    /// A filesystem write failed.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A filesystem read failed while materializing content.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Create a `WriteFailed` error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a `ReadFailed` error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }
}

/// Errors produced by the lock-file store.
#[derive(Debug, Error)]
pub enum LockError {
    /// Failed to read or write the lock file.
    #[error("lock file I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lock file could not be serialized.
    #[error("failed to encode lock file: {0}")]
    Encode(#[from] serde_json::Error),
}
