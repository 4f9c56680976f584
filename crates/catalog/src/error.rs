//! Error types for the catalog crate.
//!
//! Catalog errors fall into two groups:
//! - file-level failures (missing file, unreadable JSON) abort a load
//! - record-level failures (a single malformed item) are reported so the
//!   caller can skip that item and keep the rest of the catalog

use thiserror::Error;

/// Errors that can occur while loading or validating catalog items.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be found
    #[error("Catalog file not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a catalog file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid JSON, or its top level has the wrong shape
    #[error("Malformed catalog document {file}: {reason}")]
    MalformedDocument { file: String, reason: String },

    /// A single record could not be decoded into a ContentItem
    #[error("Malformed record #{index} in {file}: {reason}")]
    MalformedRecord {
        file: String,
        index: usize,
        reason: String,
    },

    /// An item decoded fine but carries an out-of-range value
    #[error("Invalid value for {field} on item {item_id}: {value}")]
    InvalidValue {
        item_id: String,
        field: String,
        value: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
