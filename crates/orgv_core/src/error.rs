//! Error types for orgv_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for orgv_core operations.
#[derive(Error, Debug)]
pub enum OrgError {
    /// Required input is missing or malformed; rejected before any write.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced commit id does not exist.
    #[error("unknown commit: {0}")]
    UnknownCommit(String),

    /// Referenced tree id does not exist (no links recorded for it).
    #[error("unknown tree: {0}")]
    UnknownTree(String),

    /// Referenced node hash does not exist in the store.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The commit already carries a tag.
    #[error("commit {0} already has a tag")]
    DuplicateTag(String),

    /// The commit was already published to the shared line.
    #[error("commit {0} was already shared")]
    AlreadyShared(String),

    /// The commit is not strictly newer than the shared frontier.
    #[error("stale commit: created at {commit_created_at}, shared frontier is at {frontier_created_at}")]
    StaleCommit {
        /// Creation timestamp of the rejected commit (Unix ms).
        commit_created_at: i64,
        /// Creation timestamp of the latest shared commit (Unix ms).
        frontier_created_at: i64,
    },

    /// Invalid hex string for NodeHash parsing.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Invalid ref file content or format.
    #[error("invalid ref at {}: {}", path.display(), reason)]
    InvalidRef {
        /// Path to the invalid ref file
        path: PathBuf,
        /// Description of what's invalid
        reason: String,
    },

    /// Reference not found.
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// Serialization error during record encoding.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error during record decoding.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Storage backend failure, opaque cause attached.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrgError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateTag(_) => {
                Some("Each commit can carry only one tag. Tag a newer commit instead.")
            }
            Self::AlreadyShared(_) => {
                Some("This commit is already on the shared line; share a newer one.")
            }
            Self::StaleCommit { .. } => Some(
                "The shared line has moved past this commit. Fetch the latest shared \
                 snapshot, merge, and commit again before sharing.",
            ),
            Self::UnknownCommit(_) => {
                Some("Check the commit id with 'orgv log'.")
            }
            Self::RefNotFound(_) => {
                Some("The repository may not be initialized. Run 'orgv init' first.")
            }
            _ => None,
        }
    }
}

impl From<redb::Error> for OrgError {
    fn from(e: redb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::DatabaseError> for OrgError {
    fn from(e: redb::DatabaseError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for OrgError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::TableError> for OrgError {
    fn from(e: redb::TableError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for OrgError {
    fn from(e: redb::StorageError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for OrgError {
    fn from(e: redb::CommitError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Convenience Result type for orgv_core operations.
pub type Result<T> = std::result::Result<T, OrgError>;
