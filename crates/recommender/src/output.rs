//! Output records for the two recommendation modes.
//!
//! Field names follow the media server's JSON conventions (PascalCase), with
//! the one historical exception of `similarityScore`.

use crate::assembler::{Recommendations, ScoredCandidate};
use crate::taste_mode::TasteRecommendations;
use catalog::ContentItem;
use serde::{Deserialize, Serialize};

/// Shown when no server address is known
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/200x280/808080/FFFFFF?text=No+Image";

/// Turns an item id into an image URL.
pub trait ImageUrlResolver: Send + Sync {
    fn image_url(&self, id: &str) -> String;
}

impl<F> ImageUrlResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn image_url(&self, id: &str) -> String {
        self(id)
    }
}

/// Primary images served by the media server at `base_url`.
#[derive(Debug, Clone)]
pub struct ServerImageUrls {
    base_url: String,
}

impl ServerImageUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl ImageUrlResolver for ServerImageUrls {
    fn image_url(&self, id: &str) -> String {
        format!("{}/Items/{}/Images/Primary", self.base_url, id)
    }
}

/// Same placeholder for every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderImages;

impl ImageUrlResolver for PlaceholderImages {
    fn image_url(&self, _id: &str) -> String {
        PLACEHOLDER_IMAGE_URL.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecommendedItem {
    pub name: String,
    pub id: String,
    pub genres: Vec<String>,
    pub community_rating: Option<f64>,
    pub production_year: Option<i32>,
    /// Rounded to an integer; 0-100
    #[serde(rename = "similarityScore")]
    pub similarity_score: i64,
    pub image_url: String,
}

impl RecommendedItem {
    /// `score` is on the 0-100 scale.
    pub fn new(item: &ContentItem, score: f64, images: &dyn ImageUrlResolver) -> Self {
        Self {
            name: item.name.clone(),
            id: item.id.clone(),
            genres: item.genres.clone(),
            community_rating: item.community_rating,
            production_year: item.production_year,
            similarity_score: score.round() as i64,
            image_url: images.image_url(&item.id),
        }
    }
}

/// One "because you watched" group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnchorRecommendations {
    pub name: String,
    pub id: String,
    pub recommendations: Vec<RecommendedItem>,
}

/// Shape anchor-mode results into output records.
pub fn anchor_records(
    recommendations: &Recommendations<'_>,
    images: &dyn ImageUrlResolver,
) -> Vec<AnchorRecommendations> {
    recommendations
        .groups
        .iter()
        .map(|group| AnchorRecommendations {
            name: group.anchor.name.clone(),
            id: group.anchor.id.clone(),
            recommendations: group
                .scored
                .iter()
                .map(|ScoredCandidate { item, score }| RecommendedItem::new(item, *score, images))
                .collect(),
        })
        .collect()
}

/// Shape taste-mode results; the [0, 1] taste score is reported as a percentage.
pub fn taste_records(
    recommendations: &TasteRecommendations<'_>,
    images: &dyn ImageUrlResolver,
) -> Vec<RecommendedItem> {
    recommendations
        .items
        .iter()
        .map(|m| RecommendedItem::new(m.item, m.score * 100.0, images))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::RecommendationGroup;
    use crate::taste_mode::TasteMatch;

    fn item(id: &str) -> ContentItem {
        ContentItem {
            genres: vec!["Action".to_string()],
            community_rating: Some(7.4),
            production_year: Some(1999),
            ..ContentItem::new(id, format!("Item {id}"))
        }
    }

    #[test]
    fn test_server_image_urls() {
        let images = ServerImageUrls::new("http://media.local:8096/");
        assert_eq!(images.image_url("abc"), "http://media.local:8096/Items/abc/Images/Primary");
        assert_eq!(PlaceholderImages.image_url("abc"), PLACEHOLDER_IMAGE_URL);

        let closure = |id: &str| format!("img://{id}");
        assert_eq!(closure.image_url("x"), "img://x");
    }

    #[test]
    fn test_anchor_records() {
        let anchor = item("a");
        let candidate = item("c");
        let recommendations = Recommendations {
            groups: vec![RecommendationGroup {
                anchor: &anchor,
                scored: vec![ScoredCandidate { item: &candidate, score: 66.6 }],
            }],
            empty_reason: None,
        };

        let records = anchor_records(&recommendations, &PlaceholderImages);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].recommendations[0].similarity_score, 67);

        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["Name"], "Item a");
        assert_eq!(json["Recommendations"][0]["similarityScore"], 67);
        assert_eq!(json["Recommendations"][0]["ProductionYear"], 1999);
        assert_eq!(json["Recommendations"][0]["ImageUrl"], PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn test_taste_records_use_percentages() {
        let candidate = item("c");
        let recommendations = TasteRecommendations {
            items: vec![TasteMatch { item: &candidate, score: 0.426 }],
            empty_reason: None,
        };

        let records = taste_records(&recommendations, &PlaceholderImages);
        assert_eq!(records[0].similarity_score, 43);
    }
}
