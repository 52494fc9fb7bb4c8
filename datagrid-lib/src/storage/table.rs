//! Namespaced, typed storage for one table's UI state.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::StorageBackend;
use crate::error::StorageError;

const KEY_PREFIX: &str = "mdata-table";

/// One persisted UI state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    SearchQuery,
    Filters,
    Sorting,
    ShowAdditionalFilters,
    ColumnVisibility,
    ColumnOrder,
}

impl Slot {
    /// Key suffix used for this slot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::SearchQuery => "searchQuery",
            Slot::Filters => "filters",
            Slot::Sorting => "sorting",
            Slot::ShowAdditionalFilters => "showAdditionalFilters",
            Slot::ColumnVisibility => "columnVisibility",
            Slot::ColumnOrder => "columnOrder",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage adapter for one table instance.
///
/// Keys are `mdata-table-<table_id>-<slot>`, so several tables can share a
/// backend. Values are JSON. Failures never reach the caller: `load` falls
/// back to the default and `save` drops the write, both with a warning.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::storage::{MemoryBackend, Slot, TableStorage};
///
/// let storage = TableStorage::new("users", MemoryBackend::new());
/// storage.save(Slot::SearchQuery, &"ann").await;
/// let query: String = storage.load(Slot::SearchQuery, String::new()).await;
/// ```
#[derive(Clone)]
pub struct TableStorage {
    table_id: String,
    backend: Arc<dyn StorageBackend>,
}

impl TableStorage {
    /// Creates an adapter for a table over the given backend.
    pub fn new(table_id: impl Into<String>, backend: impl StorageBackend + 'static) -> Self {
        Self::with_shared(table_id, Arc::new(backend))
    }

    /// Creates an adapter over a backend shared with other tables.
    pub fn with_shared(table_id: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            table_id: table_id.into(),
            backend,
        }
    }

    /// Returns the table identifier.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Returns the full storage key for a slot.
    pub fn key(&self, slot: Slot) -> String {
        format!("{}-{}-{}", KEY_PREFIX, self.table_id, slot)
    }

    /// Loads a slot, returning `default` when absent or unreadable.
    pub async fn load<T: DeserializeOwned>(&self, slot: Slot, default: T) -> T {
        match self.try_load(slot).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                log::warn!("Failed to load {} for table {}: {}", slot, self.table_id, e);
                default
            }
        }
    }

    /// Saves a slot, logging and dropping the write on failure.
    pub async fn save<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) {
        if let Err(e) = self.try_save(slot, value).await {
            log::warn!("Failed to save {} for table {}: {}", slot, self.table_id, e);
        }
    }

    /// Removes every slot stored for this table.
    pub async fn clear(&self) {
        let prefix = format!("{}-{}-", KEY_PREFIX, self.table_id);
        let keys = match self.backend.keys_with_prefix(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("Failed to list stored keys for table {}: {}", self.table_id, e);
                return;
            }
        };
        for key in keys {
            if let Err(e) = self.backend.delete(&key).await {
                log::warn!("Failed to delete {}: {}", key, e);
            }
        }
    }

    async fn try_load<T: DeserializeOwned>(&self, slot: Slot) -> Result<Option<T>, StorageError> {
        match self.backend.get(&self.key(slot)).await? {
            Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(StorageError::Deserialization),
            _ => Ok(None),
        }
    }

    async fn try_save<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(StorageError::Serialization)?;
        self.backend.set(&self.key(slot), raw).await
    }
}

impl fmt::Debug for TableStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStorage")
            .field("table_id", &self.table_id)
            .finish_non_exhaustive()
    }
}
