//! Storage backend trait.

use async_trait::async_trait;

use crate::error::StorageError;

/// Backend trait for UI state storage.
///
/// Implementations handle raw string storage and retrieval.
/// [`TableStorage`](super::TableStorage) wraps this with namespacing and
/// JSON serialization.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get the raw value for a key.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set the raw value for a key.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Get all keys starting with a prefix.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
