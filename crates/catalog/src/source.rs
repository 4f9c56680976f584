//! Catalog accessors.
//!
//! The engine consumes a catalog as two already-materialised collections:
//! the items the user has played and the items they have not. How those
//! collections are fetched (HTTP paging, caching, a local dump) is up to
//! the [`CatalogSource`] implementation.

use crate::error::Result;
use crate::parser;
use crate::types::ContentItem;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the played half of a directory catalog
pub const PLAYED_FILE: &str = "played.json";

/// File name of the unplayed half of a directory catalog
pub const UNPLAYED_FILE: &str = "unplayed.json";

/// The two collections the engine works on
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub watched: Vec<ContentItem>,
    pub unwatched: Vec<ContentItem>,
}

impl CatalogSnapshot {
    pub fn new(watched: Vec<ContentItem>, unwatched: Vec<ContentItem>) -> Self {
        Self { watched, unwatched }
    }

    /// Look an item up by id in either collection
    pub fn find(&self, id: &str) -> Option<&ContentItem> {
        self.watched
            .iter()
            .chain(self.unwatched.iter())
            .find(|item| item.id == id)
    }

    /// (watched, unwatched) counts for logging
    pub fn counts(&self) -> (usize, usize) {
        (self.watched.len(), self.unwatched.len())
    }
}

/// Anything that can hand out a catalog snapshot.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> Result<CatalogSnapshot>;
}

/// A snapshot is trivially its own source
impl CatalogSource for CatalogSnapshot {
    fn fetch(&self) -> Result<CatalogSnapshot> {
        Ok(self.clone())
    }
}

/// Reads `played.json` and `unplayed.json` from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CatalogSource for DirectoryCatalog {
    fn fetch(&self) -> Result<CatalogSnapshot> {
        let played_path = self.dir.join(PLAYED_FILE);
        let unplayed_path = self.dir.join(UNPLAYED_FILE);

        // Both halves are independent, parse them in parallel
        let (watched, unwatched) = rayon::join(
            || parser::parse_items(&played_path),
            || parser::parse_items(&unplayed_path),
        );
        let snapshot = CatalogSnapshot::new(watched?, unwatched?);

        let (watched_count, unwatched_count) = snapshot.counts();
        info!(
            "Loaded catalog from {:?}: {} watched, {} unwatched",
            self.dir, watched_count, unwatched_count
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("catalog-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_directory_catalog_loads_both_halves() {
        let dir = scratch_dir("both");
        fs::write(
            dir.join(PLAYED_FILE),
            r#"[{"Id": "w1", "Name": "Heat", "UserData": {"Played": true}}]"#,
        )
        .unwrap();
        fs::write(
            dir.join(UNPLAYED_FILE),
            r#"{"Items": [{"Id": "u1", "Name": "Thief"}, {"Id": "u2", "Name": "Collateral"}]}"#,
        )
        .unwrap();

        let snapshot = DirectoryCatalog::new(&dir).fetch().unwrap();
        assert_eq!(snapshot.counts(), (1, 2));
        assert_eq!(snapshot.find("u2").map(|i| i.name.as_str()), Some("Collateral"));
        assert!(snapshot.find("zz").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_directory_catalog_missing_file() {
        let dir = scratch_dir("missing");
        fs::write(dir.join(PLAYED_FILE), "[]").unwrap();

        let result = DirectoryCatalog::new(&dir).fetch();
        assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_snapshot_is_a_source() {
        let snapshot = CatalogSnapshot::new(vec![ContentItem::new("w", "Watched")], vec![]);
        let fetched = snapshot.fetch().unwrap();
        assert_eq!(fetched.counts(), (1, 0));
    }
}
