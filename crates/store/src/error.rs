//! Infrastructure error model for the persistence layer.

use thiserror::Error;

/// Result type used across the store crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence/sync error.
///
/// Domain failures (validation, preconditions) live in `cdstock-core`;
/// everything here is about storage and the network.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Remote store unreachable or returned a non-success status.
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote responded, but the payload could not be parsed.
    #[error("remote response malformed: {0}")]
    RemoteMalformed(String),

    /// A required credential or store identifier is missing.
    #[error("remote configuration incomplete: {0}")]
    ConfigIncomplete(String),

    /// A bulk import was malformed or violated the document schema.
    #[error("import rejected: {0}")]
    ImportInvalid(String),

    /// Local cache I/O or corruption.
    #[error("local cache error: {0}")]
    Cache(String),
}

impl StoreError {
    pub fn remote_unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable(msg.into())
    }

    pub fn remote_malformed(msg: impl Into<String>) -> Self {
        Self::RemoteMalformed(msg.into())
    }

    pub fn config_incomplete(msg: impl Into<String>) -> Self {
        Self::ConfigIncomplete(msg.into())
    }

    pub fn import_invalid(msg: impl Into<String>) -> Self {
        Self::ImportInvalid(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }
}
