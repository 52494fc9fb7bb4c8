//! Integration tests for persisted table state.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use datagrid_lib::error::StorageError;
use datagrid_lib::query::FilterState;
use datagrid_lib::query::FilterValue;
use datagrid_lib::query::Sorting;
use datagrid_lib::storage::MemoryBackend;
use datagrid_lib::storage::Slot;
use datagrid_lib::storage::SqliteBackend;
use datagrid_lib::storage::StorageBackend;
use datagrid_lib::storage::TableStorage;

/// Rejects every operation.
struct BrokenBackend;

#[async_trait]
impl StorageBackend for BrokenBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Rejected("storage disabled".to_string()))
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Rejected("quota exceeded".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Rejected("storage disabled".to_string()))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Rejected("storage disabled".to_string()))
    }
}

#[test]
fn test_keys_are_namespaced() {
    let storage = TableStorage::new("users-table", MemoryBackend::new());
    assert_eq!(storage.key(Slot::SearchQuery), "mdata-table-users-table-searchQuery");
    assert_eq!(storage.key(Slot::ColumnOrder), "mdata-table-users-table-columnOrder");
    assert_eq!(
        storage.key(Slot::ShowAdditionalFilters),
        "mdata-table-users-table-showAdditionalFilters"
    );
}

#[tokio::test]
async fn test_save_and_load() {
    let storage = TableStorage::new("users", MemoryBackend::new());

    let mut filters = FilterState::new();
    filters.set("city", FilterValue::from("Paris"));
    filters.set("active", FilterValue::from(true));
    storage.save(Slot::Filters, &filters).await;
    storage.save(Slot::Sorting, &Some(Sorting::asc("name"))).await;

    let loaded: FilterState = storage.load(Slot::Filters, FilterState::new()).await;
    assert_eq!(loaded, filters);
    let sorting: Option<Sorting> = storage.load(Slot::Sorting, None).await;
    assert_eq!(sorting, Some(Sorting::asc("name")));
}

#[tokio::test]
async fn test_missing_and_corrupt_values_fall_back() {
    let backend = Arc::new(MemoryBackend::new());
    let shared: Arc<dyn StorageBackend> = backend.clone();
    let storage = TableStorage::with_shared("users", shared);

    let order: Vec<String> = storage.load(Slot::ColumnOrder, vec!["id".to_string()]).await;
    assert_eq!(order, ["id"]);

    backend.insert_raw("mdata-table-users-columnOrder", "[\"id\",");
    let order: Vec<String> = storage.load(Slot::ColumnOrder, Vec::new()).await;
    assert!(order.is_empty());

    backend.insert_raw("mdata-table-users-showAdditionalFilters", "");
    assert!(storage.load(Slot::ShowAdditionalFilters, true).await);
}

#[tokio::test]
async fn test_tables_do_not_share_slots() {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let users = TableStorage::with_shared("users", backend.clone());
    let orders = TableStorage::with_shared("orders", backend);

    users.save(Slot::SearchQuery, "ann").await;

    let query: String = orders.load(Slot::SearchQuery, String::new()).await;
    assert_eq!(query, "");
    let query: String = users.load(Slot::SearchQuery, String::new()).await;
    assert_eq!(query, "ann");
}

#[tokio::test]
async fn test_failing_backend_is_tolerated() {
    let storage = TableStorage::new("users", BrokenBackend);

    storage.save(Slot::SearchQuery, "ann").await;
    let query: String = storage.load(Slot::SearchQuery, "fallback".to_string()).await;
    assert_eq!(query, "fallback");
    storage.clear().await;
}

#[tokio::test]
async fn test_clear_only_touches_own_table() {
    let backend = Arc::new(MemoryBackend::new());
    let shared: Arc<dyn StorageBackend> = backend.clone();
    let users = TableStorage::with_shared("users", shared.clone());
    let orders = TableStorage::with_shared("orders", shared);

    for slot in [
        Slot::SearchQuery,
        Slot::Filters,
        Slot::Sorting,
        Slot::ShowAdditionalFilters,
        Slot::ColumnVisibility,
        Slot::ColumnOrder,
    ] {
        users.save(slot, &true).await;
    }
    orders.save(Slot::Filters, &FilterState::new()).await;
    assert_eq!(backend.len(), 7);

    users.clear().await;
    assert_eq!(backend.len(), 1);
    assert_eq!(backend.raw("mdata-table-orders-filters").as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.db");

    {
        let backend = SqliteBackend::open(&path).await.unwrap();
        let storage = TableStorage::new("users", backend);
        let mut visibility = BTreeMap::new();
        visibility.insert("email".to_string(), false);
        storage.save(Slot::ColumnVisibility, &visibility).await;
        storage.save(Slot::SearchQuery, "bob").await;
    }

    let backend = SqliteBackend::open(&path).await.unwrap();
    let storage = TableStorage::new("users", backend);
    let visibility: BTreeMap<String, bool> =
        storage.load(Slot::ColumnVisibility, BTreeMap::new()).await;
    assert_eq!(visibility.get("email"), Some(&false));
    let query: String = storage.load(Slot::SearchQuery, String::new()).await;
    assert_eq!(query, "bob");
}

#[tokio::test]
async fn test_sqlite_backend_operations() {
    let backend = SqliteBackend::open_in_memory().await.unwrap();

    backend.set("mdata-table-a-filters", "{}".to_string()).await.unwrap();
    backend.set("mdata-table-a-sorting", "null".to_string()).await.unwrap();
    backend.set("mdata-table-b-filters", "{}".to_string()).await.unwrap();
    backend.set("mdata-table-a-sorting", "{\"column\":\"id\",\"direction\":\"asc\"}".to_string())
        .await
        .unwrap();

    assert_eq!(
        backend.get("mdata-table-a-sorting").await.unwrap().as_deref(),
        Some("{\"column\":\"id\",\"direction\":\"asc\"}")
    );
    assert_eq!(
        backend.keys_with_prefix("mdata-table-a-").await.unwrap(),
        ["mdata-table-a-filters", "mdata-table-a-sorting"]
    );

    backend.delete("mdata-table-a-filters").await.unwrap();
    assert_eq!(backend.get("mdata-table-a-filters").await.unwrap(), None);
    assert_eq!(backend.get("missing").await.unwrap(), None);
}
