//! Error types for entries and registries.

use crate::identity::Identity;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for entry operations.
pub type EntryResult<T> = Result<T, EntryError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Boxed error returned by change hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building, comparing or serializing entries.
///
/// These are data-contract violations: they are never retried.
#[derive(Debug, Error)]
pub enum EntryError {
    /// A reference field held something that is neither an identifier nor a URL.
    #[error("invalid reference: {reason}")]
    InvalidReference {
        /// What was wrong with the value.
        reason: String,
    },

    /// Two entries of different kinds were compared.
    #[error("cannot compare a {left} entry with a {right} entry")]
    KindMismatch {
        /// Kind of the receiver.
        left: String,
        /// Kind of the argument.
        right: String,
    },

    /// The record did not match the kind's field shapes.
    #[error("malformed {kind} record: {source}")]
    Shape {
        /// Entry kind being built.
        kind: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// An entry serialized to something other than a JSON object.
    #[error("{kind} entry did not serialize to an object")]
    NotAnObject {
        /// Entry kind being serialized.
        kind: &'static str,
    },
}

impl EntryError {
    /// Creates an invalid reference error.
    pub fn invalid_reference(reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing file could not be created.
    #[error("cannot create registry file {path}: {source}")]
    Create {
        /// Backing file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The backing file could not be read.
    #[error("cannot load registry file {path}: {source}")]
    Load {
        /// Backing file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The backing file does not hold a JSON array of objects.
    #[error("cannot parse registry file {path}: {source}")]
    Parse {
        /// Backing file path.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The registry could not be written back to disk.
    #[error("cannot write registry file {path}: {source}")]
    Write {
        /// Backing file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A record could not be turned into an entry.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// No entry carries the requested identity.
    #[error("no {kind} entry with identity {identity}")]
    NotFound {
        /// Registry kind.
        kind: String,
        /// Requested identity.
        identity: Identity,
    },

    /// The registry kind declares no identity field.
    #[error("{kind} entries have no identity field")]
    NoIdentity {
        /// Registry kind.
        kind: String,
    },

    /// A change hook failed; the rebuild was abandoned.
    #[error("{kind} hook failed: {source}")]
    Hook {
        /// Registry kind.
        kind: String,
        /// Error returned by the hook.
        #[source]
        source: HookError,
    },

    /// Another process holds the cache directory.
    #[error("cache directory locked: another process has exclusive access")]
    Locked,

    /// I/O error outside a specific registry file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RegistryError {
    /// Returns true if the error comes from bad upstream or stored data.
    pub fn is_data_error(&self) -> bool {
        matches!(self, RegistryError::Entry(_) | RegistryError::Parse { .. })
    }

    /// Returns true for failed lookups, including kinds without identity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound { .. } | RegistryError::NoIdentity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RegistryError::NotFound {
            kind: "game".into(),
            identity: Identity::Int(7),
        };
        assert_eq!(err.to_string(), "no game entry with identity 7");

        let err = EntryError::KindMismatch {
            left: "game".into(),
            right: "player".into(),
        };
        assert!(err.to_string().contains("game"));
        assert!(err.to_string().contains("player"));
    }

    #[test]
    fn data_errors() {
        let err = RegistryError::Entry(EntryError::invalid_reference("boolean"));
        assert!(err.is_data_error());
        assert!(!RegistryError::Locked.is_data_error());
    }

    #[test]
    fn not_found_errors() {
        assert!(RegistryError::NoIdentity { kind: "note".into() }.is_not_found());
        assert!(RegistryError::NotFound {
            kind: "game".into(),
            identity: Identity::from("x"),
        }
        .is_not_found());
        assert!(!RegistryError::Locked.is_not_found());
    }
}
