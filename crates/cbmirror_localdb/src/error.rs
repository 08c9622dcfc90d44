//! Error types for the local mirror.

use cbmirror_registry::RegistryError;
use cbmirror_sync::SyncError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mirror operations.
pub type LocalDbResult<T> = Result<T, LocalDbError>;

/// Errors raised while mirroring.
#[derive(Debug, Error)]
pub enum LocalDbError {
    /// A registry could not be opened, rebuilt or committed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The server could not be reached or answered badly.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// A sound effect file could not be read or written.
    #[error("sound effect I/O error at {path}: {source}")]
    Sfx {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The server sent sound effect data that is not valid base64.
    #[error("invalid sound effect data for {username}: {source}")]
    SfxData {
        /// Player the data belongs to.
        username: String,
        /// Decode failure.
        #[source]
        source: base64::DecodeError,
    },

    /// A username cannot be used as a file name inside the sound effect
    /// directory.
    #[error("username {username:?} is not a plain file name")]
    UnsafeUsername {
        /// Offending username.
        username: String,
    },

    /// Sound effect sync was requested without a target directory.
    #[error("no sound effect directory configured")]
    NoSfxDir,
}

impl LocalDbError {
    /// Returns true if retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LocalDbError::Sync(e) => e.is_retryable(),
            _ => false,
        }
    }
}
