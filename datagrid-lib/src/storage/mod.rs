//! Durable key-value storage for table UI state.
//!
//! [`StorageBackend`] stores raw JSON strings by key. [`TableStorage`]
//! namespaces keys by table identifier and adds typed, failure-tolerant
//! `load`/`save` on top.

mod backend;
mod memory;
mod sqlite;
mod table;

pub use backend::StorageBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use table::Slot;
pub use table::TableStorage;
