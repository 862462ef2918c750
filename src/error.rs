//! Error type for the fallible workspace operations.
//!
//! Pane-level operations never fail: unknown ids and missing collaborators are no-ops. Errors are
//! reserved for persistence and configuration, where the caller has something to report.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by persistence and configuration.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Reading or writing a workspace file failed.
    #[error("workspace io error: {0}")]
    Io(#[from] std::io::Error),
    /// A workspace record or configuration could not be (de)serialized.
    #[error("workspace serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// No saved canvas workspace has the given id.
    #[error("canvas workspace {0} not found")]
    WorkspaceNotFound(Uuid),
    /// The operation needs a persistence host but none was configured.
    #[error("no persistence host configured")]
    NoPersistenceHost,
    /// There is no current canvas workspace to overwrite.
    #[error("no canvas workspace is open")]
    NoCurrentWorkspace,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WorkspaceError>;
