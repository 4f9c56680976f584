//! Parser for catalog JSON documents.
//!
//! A document is either a bare JSON array of items or the object the media
//! server returns from its items endpoint (`{"Items": [...], ...}`).
//!
//! Decoding happens record by record: one malformed item is logged and
//! skipped instead of failing the whole file.

use crate::error::{CatalogError, Result};
use crate::types::ContentItem;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Parse a catalog file into items, skipping malformed records.
pub fn parse_items(path: &Path) -> Result<Vec<ContentItem>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_items_str(&content, &path.display().to_string())
}

/// Parse an in-memory catalog document.
///
/// # Arguments
/// * `content` - The JSON text
/// * `file` - Label used in diagnostics (usually the file path)
pub fn parse_items_str(content: &str, file: &str) -> Result<Vec<ContentItem>> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| CatalogError::MalformedDocument {
            file: file.to_string(),
            reason: e.to_string(),
        })?;

    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("Items") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(CatalogError::MalformedDocument {
                    file: file.to_string(),
                    reason: "expected an \"Items\" array".to_string(),
                });
            }
        },
        _ => {
            return Err(CatalogError::MalformedDocument {
                file: file.to_string(),
                reason: "expected a JSON array or object".to_string(),
            });
        }
    };

    let mut items = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match decode_record(record, file, index) {
            Ok(item) => items.push(item),
            Err(err) => warn!("Skipping catalog record: {}", err),
        }
    }
    Ok(items)
}

fn decode_record(record: Value, file: &str, index: usize) -> Result<ContentItem> {
    let item: ContentItem =
        serde_json::from_value(record).map_err(|e| CatalogError::MalformedRecord {
            file: file.to_string(),
            index,
            reason: e.to_string(),
        })?;
    item.validate()?;
    Ok(item)
}
