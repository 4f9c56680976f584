//! # Catalog Crate
//!
//! This crate holds the media catalog model consumed by the recommendation
//! engine, plus the plumbing to read a catalog from disk.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (ContentItem, Person, Studio, UserData)
//! - **parser**: Decode catalog JSON documents record by record
//! - **source**: The CatalogSource accessor and a directory-backed implementation
//! - **error**: Error types for catalog loading and item validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogSource, DirectoryCatalog};
//!
//! // Load played.json / unplayed.json from a directory
//! let snapshot = DirectoryCatalog::new("data/library").fetch()?;
//!
//! let (watched, unwatched) = snapshot.counts();
//! println!("{} watched, {} unwatched", watched, unwatched);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod source;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use types::{
    // Type aliases
    ItemId,
    // Core types
    ContentItem,
    Person,
    PersonKind,
    Studio,
    UserData,
    // Scales
    COMMUNITY_RATING_MAX,
    CRITIC_RATING_MAX,
};
pub use source::{CatalogSnapshot, CatalogSource, DirectoryCatalog};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation() {
        let item = ContentItem::new("42", "The Thing");
        assert_eq!(item.id, "42");
        assert!(!item.is_played());
        assert!(!item.is_favorite());
        assert!(item.genre_keys().is_empty());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::default();
        assert_eq!(snapshot.counts(), (0, 0));
        assert!(snapshot.find("anything").is_none());
    }
}
