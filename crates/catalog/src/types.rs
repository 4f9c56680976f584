//! Core domain types for a media server catalog.
//!
//! Items are decoded from the JSON the media server hands out, so field
//! names follow its PascalCase convention on the wire while staying
//! snake_case in Rust. The engine never mutates an item; every helper here
//! borrows.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque identifier assigned by the media server (usually a GUID string)
pub type ItemId = String;

/// Upper bound of the community rating scale
pub const COMMUNITY_RATING_MAX: f64 = 10.0;

/// Upper bound of the critic rating scale
pub const CRITIC_RATING_MAX: f64 = 100.0;

// =============================================================================
// People and Studios
// =============================================================================

/// Role a person played in the production of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonKind {
    Actor,
    Director,
    Writer,
    Producer,
    GuestStar,
    Composer,
    #[serde(other)]
    Other,
}

/// A cast or crew member attached to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type", default = "default_person_kind")]
    pub kind: PersonKind,
}

fn default_person_kind() -> PersonKind {
    PersonKind::Other
}

/// A production studio attached to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Studio {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl Studio {
    /// Key used for set comparisons: the id when present, otherwise the
    /// case-folded name.
    pub fn key(&self) -> String {
        if self.id.is_empty() {
            self.name.trim().to_lowercase()
        } else {
            self.id.clone()
        }
    }
}

/// Per-user playback state of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserData {
    pub played: bool,
    pub is_favorite: bool,
}

// =============================================================================
// ContentItem
// =============================================================================

/// A movie, series or episode from the catalog.
///
/// Categorical attributes (genres, tags) are compared case-insensitively;
/// use [`ContentItem::genre_keys`] and [`ContentItem::tag_keys`] instead of
/// reading the raw vectors when comparing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub people: Vec<Person>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub studios: Vec<Studio>,
    /// Community rating on a 0-10 scale
    #[serde(default)]
    pub community_rating: Option<f64>,
    /// Critic rating on a 0-100 scale
    #[serde(default)]
    pub critic_rating: Option<f64>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_data: UserData,
}

/// The server sends `null` for empty collections on some item types.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContentItem {
    /// Create a bare item with only identity set
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the user has already played this item
    pub fn is_played(&self) -> bool {
        self.user_data.played
    }

    /// Whether the user marked this item as a favorite
    pub fn is_favorite(&self) -> bool {
        self.user_data.is_favorite
    }

    /// Case-folded, de-duplicated genres
    pub fn genre_keys(&self) -> HashSet<String> {
        fold_keys(&self.genres)
    }

    /// Case-folded, de-duplicated tags
    pub fn tag_keys(&self) -> HashSet<String> {
        fold_keys(&self.tags)
    }

    /// People of the given kinds
    pub fn people_of<'a>(&'a self, kinds: &'a [PersonKind]) -> impl Iterator<Item = &'a Person> {
        self.people.iter().filter(move |p| kinds.contains(&p.kind))
    }

    /// Ids of the actors credited on this item
    pub fn actor_ids(&self) -> HashSet<&str> {
        self.people_of(&[PersonKind::Actor])
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Ids of the directors and writers credited on this item
    pub fn director_writer_ids(&self) -> HashSet<&str> {
        self.people_of(&[PersonKind::Director, PersonKind::Writer])
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Studio keys (see [`Studio::key`])
    pub fn studio_keys(&self) -> HashSet<String> {
        self.studios.iter().map(Studio::key).collect()
    }

    /// Check that the item can be scored.
    ///
    /// Rejects an empty id and numeric attributes that are non-finite or
    /// outside their scale. A rejected item is skipped by the engine rather
    /// than aborting a whole pass.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("Id", "<empty>".to_string()));
        }
        if let Some(rating) = self.community_rating {
            if !rating.is_finite() || !(0.0..=COMMUNITY_RATING_MAX).contains(&rating) {
                return Err(self.invalid("CommunityRating", rating.to_string()));
            }
        }
        if let Some(rating) = self.critic_rating {
            if !rating.is_finite() || !(0.0..=CRITIC_RATING_MAX).contains(&rating) {
                return Err(self.invalid("CriticRating", rating.to_string()));
            }
        }
        Ok(())
    }

    fn invalid(&self, field: &str, value: String) -> CatalogError {
        CatalogError::InvalidValue {
            item_id: self.id.clone(),
            field: field.to_string(),
            value,
        }
    }
}

fn fold_keys(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_keys_are_case_folded() {
        let item = ContentItem {
            genres: vec!["Action".to_string(), "action ".to_string(), "Drama".to_string()],
            ..ContentItem::new("1", "Heat")
        };

        let keys = item.genre_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("action"));
        assert!(keys.contains("drama"));
    }

    #[test]
    fn test_people_split_by_kind() {
        let item = ContentItem {
            people: vec![
                Person {
                    id: "a1".to_string(),
                    name: "Al Pacino".to_string(),
                    kind: PersonKind::Actor,
                },
                Person {
                    id: "d1".to_string(),
                    name: "Michael Mann".to_string(),
                    kind: PersonKind::Director,
                },
                Person {
                    id: "d1".to_string(),
                    name: "Michael Mann".to_string(),
                    kind: PersonKind::Writer,
                },
                Person {
                    id: "p1".to_string(),
                    name: "Art Linson".to_string(),
                    kind: PersonKind::Producer,
                },
            ],
            ..ContentItem::new("1", "Heat")
        };

        assert_eq!(item.actor_ids().len(), 1);
        assert_eq!(item.director_writer_ids().len(), 1);
        assert!(item.director_writer_ids().contains("d1"));
    }

    #[test]
    fn test_studio_key_falls_back_to_name() {
        let with_id = Studio { id: "s1".to_string(), name: "Warner Bros.".to_string() };
        let without_id = Studio { id: String::new(), name: " Warner Bros. ".to_string() };

        assert_eq!(with_id.key(), "s1");
        assert_eq!(without_id.key(), "warner bros.");
    }

    #[test]
    fn test_validate_rejects_out_of_range_rating() {
        let mut item = ContentItem::new("1", "Heat");
        item.community_rating = Some(8.3);
        assert!(item.validate().is_ok());

        item.community_rating = Some(f64::NAN);
        assert!(item.validate().is_err());

        item.community_rating = Some(11.0);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let item = ContentItem::new("  ", "Nameless");
        assert!(matches!(
            item.validate(),
            Err(CatalogError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_deserialize_server_item() {
        let json = r#"{
            "Id": "f3a1",
            "Name": "Blade Runner",
            "Genres": ["Science Fiction", "Drama"],
            "People": [{"Id": "p9", "Name": "Ridley Scott", "Type": "Director", "Role": ""}],
            "Studios": [{"Name": "Ladd Company", "Id": "s4"}],
            "CommunityRating": 7.9,
            "ProductionYear": 1982,
            "UserData": {"Played": true, "IsFavorite": false, "PlayCount": 2}
        }"#;

        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "f3a1");
        assert_eq!(item.people[0].kind, PersonKind::Director);
        assert_eq!(item.production_year, Some(1982));
        assert!(item.is_played());
        assert!(item.tags.is_empty());
        assert_eq!(item.critic_rating, None);
    }

    #[test]
    fn test_unknown_person_kind_maps_to_other() {
        let json = r#"{"Id": "p1", "Name": "Someone", "Type": "Lyricist"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.kind, PersonKind::Other);
    }
}
