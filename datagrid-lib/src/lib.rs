//! Data grid library
//!
//! Fetches JSON records from a remote endpoint and drives a searchable,
//! filterable, sortable, paginated grid over them. UI state is persisted
//! per table through a pluggable storage backend.

pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod storage;
pub mod table;
pub mod view;

pub use config::GridConfig;
pub use config::TableConfig;
pub use model::Record;
pub use table::DataTable;
pub use table::TableSnapshot;
pub use view::DataGrid;
