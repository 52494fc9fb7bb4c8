//! CSV export error types

use std::path::PathBuf;

/// Errors that can occur while writing a CSV export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// There were no rows to export.
    #[error("no rows to export")]
    Empty,

    /// Writing the file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
