//! SQLite storage backend with in-memory read cache.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;
use dashmap::DashMap;

use super::StorageBackend;
use crate::error::StorageError;

/// A persistent backend backed by SQLite.
///
/// Values survive process restarts. Reads are served from a DashMap cache
/// after the first hit.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::storage::SqliteBackend;
///
/// let backend = SqliteBackend::open("storage.db").await?;
/// ```
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, String>,
}

impl SqliteBackend {
    /// Opens a SQLite backend at the specified path.
    ///
    /// Creates the database file and table if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    /// Opens an in-memory SQLite backend.
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    async fn init_schema(client: &Client) -> Result<(), StorageError> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS storage (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    [],
                )
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let key_owned = key.to_string();
        let result = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM storage WHERE key = ?")?;
                let mut rows = stmt.query([&key_owned])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, String>(0)?)),
                    None => Ok(None),
                }
            })
            .await?;

        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let key_owned = key.to_string();
        let value_clone = value.clone();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO storage (key, value) VALUES (?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![&key_owned, &value_clone],
                )
            })
            .await?;

        self.cache.insert(key.to_string(), value);

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key_owned = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM storage WHERE key = ?", [&key_owned]))
            .await?;

        self.cache.remove(key);

        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix = prefix.to_string();
        let mut keys: Vec<String> = self
            .client
            .conn(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM storage")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;
        // LIKE treats `_` and `%` in table ids as wildcards; match in Rust instead.
        keys.retain(|key| key.starts_with(&prefix));
        keys.sort();
        Ok(keys)
    }
}
