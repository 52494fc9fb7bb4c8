//! Storage error types

/// Errors raised by storage backends.
///
/// These never reach callers of [`TableStorage`](crate::storage::TableStorage),
/// which logs them and falls back to defaults.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// SQLite backend failure.
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    /// Value could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),

    /// Stored value could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(serde_json::Error),

    /// Backend refused the write (quota, read-only store, ...).
    #[error("write rejected: {0}")]
    Rejected(String),
}
