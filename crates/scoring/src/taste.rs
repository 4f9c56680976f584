//! Taste profile: what the user tends to watch, as a distribution.
//!
//! ## Algorithm
//! 1. Keep only items marked played
//! 2. Count case-folded genres and tags (once per item)
//! 3. Divide each count by the total of its mapping, so each mapping sums to 1
//!
//! [`TasteScorer`] then rates any item against the profile:
//!
//! ```text
//! genre_score = sum of the item's genre weights
//! tag_score   = sum of the item's tag weights * tag_boost
//! penalty     = dilution_factor ^ max(0, genre_count - threshold)
//! taste       = min(1, (genre_score * genre_share + tag_score * tag_share) * penalty)
//! ```

use crate::config::TasteConfig;
use crate::error::Result;
use crate::rarity::CategoricalAttribute;
use catalog::ContentItem;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Normalized genre and tag weights over the user's played items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteProfile {
    genres: HashMap<String, f64>,
    tags: HashMap<String, f64>,
}

impl TasteProfile {
    /// Build the profile from watch history. Unplayed items are ignored.
    pub fn build<'a>(items: impl IntoIterator<Item = &'a ContentItem>) -> Self {
        let mut genre_counts: HashMap<String, usize> = HashMap::new();
        let mut tag_counts: HashMap<String, usize> = HashMap::new();
        let mut played = 0;

        for item in items.into_iter().filter(|item| item.is_played()) {
            played += 1;
            for key in item.genre_keys() {
                *genre_counts.entry(key).or_insert(0) += 1;
            }
            for key in item.tag_keys() {
                *tag_counts.entry(key).or_insert(0) += 1;
            }
        }

        debug!(
            "Built taste profile from {} played items ({} genres, {} tags)",
            played,
            genre_counts.len(),
            tag_counts.len()
        );
        Self {
            genres: normalize_counts(genre_counts),
            tags: normalize_counts(tag_counts),
        }
    }

    /// Weight of an already case-folded key; unknown keys weigh 0.
    pub fn weight(&self, attribute: CategoricalAttribute, folded_key: &str) -> f64 {
        let map = match attribute {
            CategoricalAttribute::Genres => &self.genres,
            CategoricalAttribute::Tags => &self.tags,
        };
        map.get(folded_key).copied().unwrap_or(0.0)
    }

    pub fn genres(&self) -> &HashMap<String, f64> {
        &self.genres
    }

    pub fn tags(&self) -> &HashMap<String, f64> {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.tags.is_empty()
    }

    /// The `n` heaviest keys of an attribute, heaviest first (ties by name)
    pub fn top(&self, attribute: CategoricalAttribute, n: usize) -> Vec<(&str, f64)> {
        let map = match attribute {
            CategoricalAttribute::Genres => &self.genres,
            CategoricalAttribute::Tags => &self.tags,
        };
        let mut entries: Vec<(&str, f64)> = map.iter().map(|(k, w)| (k.as_str(), *w)).collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        entries.truncate(n);
        entries
    }
}

fn normalize_counts(counts: HashMap<String, usize>) -> HashMap<String, f64> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return HashMap::new();
    }
    counts
        .into_iter()
        .map(|(key, count)| (key, count as f64 / total as f64))
        .collect()
}

/// Rates items against a [`TasteProfile`].
#[derive(Debug, Clone)]
pub struct TasteScorer {
    config: TasteConfig,
}

impl TasteScorer {
    pub fn new(config: TasteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TasteConfig {
        &self.config
    }

    /// Taste affinity of `item`, in [0, 1].
    pub fn score(&self, profile: &TasteProfile, item: &ContentItem) -> f64 {
        let genres = item.genre_keys();
        let genre_score: f64 = genres
            .iter()
            .map(|g| profile.weight(CategoricalAttribute::Genres, g))
            .sum();
        let tag_score: f64 = item
            .tag_keys()
            .iter()
            .map(|t| profile.weight(CategoricalAttribute::Tags, t))
            .sum::<f64>()
            * self.config.tag_boost;

        let penalty = self.dilution_penalty(genres.len());
        let score = (genre_score * self.config.genre_share + tag_score * self.config.tag_share)
            * penalty;
        if !score.is_finite() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }

    /// `dilution_factor ^ (genre_count - threshold)` above the threshold, else 1
    fn dilution_penalty(&self, genre_count: usize) -> f64 {
        let excess = genre_count.saturating_sub(self.config.genre_dilution_threshold);
        self.config.dilution_factor.powi(excess as i32)
    }
}

impl Default for TasteScorer {
    fn default() -> Self {
        Self {
            config: TasteConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(id: &str, genres: &[&str], tags: &[&str]) -> ContentItem {
        let mut item = ContentItem {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..ContentItem::new(id, id)
        };
        item.user_data.played = true;
        item
    }

    fn unplayed(id: &str, genres: &[&str], tags: &[&str]) -> ContentItem {
        let mut item = played(id, genres, tags);
        item.user_data.played = false;
        item
    }

    #[test]
    fn test_profile_is_a_distribution() {
        let history = vec![
            played("1", &["Action", "Thriller"], &["heist"]),
            played("2", &["action"], &["heist", "car chase"]),
            played("3", &["Drama"], &[]),
        ];
        let profile = TasteProfile::build(&history);

        let genre_sum: f64 = profile.genres().values().sum();
        let tag_sum: f64 = profile.tags().values().sum();
        assert!((genre_sum - 1.0).abs() < 1e-12);
        assert!((tag_sum - 1.0).abs() < 1e-12);
        assert!((profile.weight(CategoricalAttribute::Genres, "action") - 0.5).abs() < 1e-12);
        assert_eq!(profile.top(CategoricalAttribute::Genres, 1)[0].0, "action");
    }

    #[test]
    fn test_unplayed_items_are_ignored() {
        let history = vec![
            played("1", &["Action"], &[]),
            unplayed("2", &["Horror"], &["gore"]),
        ];
        let profile = TasteProfile::build(&history);

        assert_eq!(profile.weight(CategoricalAttribute::Genres, "horror"), 0.0);
        assert!(profile.tags().is_empty());
    }

    #[test]
    fn test_empty_history_gives_empty_profile_and_zero_scores() {
        let history = vec![unplayed("1", &["Action"], &["heist"])];
        let profile = TasteProfile::build(&history);
        assert!(profile.is_empty());

        let scorer = TasteScorer::default();
        let candidate = unplayed("2", &["Action"], &["heist"]);
        assert_eq!(scorer.score(&profile, &candidate), 0.0);
    }

    #[test]
    fn test_score_formula() {
        let history = vec![
            played("1", &["Action"], &["heist"]),
            played("2", &["Drama"], &["heist"]),
        ];
        let profile = TasteProfile::build(&history);
        let scorer = TasteScorer::default();

        // genre 0.5, tag 1.0 * 1.25
        let candidate = unplayed("3", &["Action"], &["heist"]);
        let expected = 0.5 * 0.65 + 1.25 * 0.35;
        assert!((scorer.score(&profile, &candidate) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_genre_dilution_penalty() {
        let history = vec![played("1", &["Action"], &[])];
        let profile = TasteProfile::build(&history);
        let scorer = TasteScorer::default();

        let focused = unplayed("2", &["Action"], &[]);
        let diluted = unplayed("3", &["Action", "Comedy", "Drama", "Family", "Music", "War"], &[]);

        let focused_score = scorer.score(&profile, &focused);
        let diluted_score = scorer.score(&profile, &diluted);
        assert!((diluted_score - focused_score * 0.85_f64.powi(2)).abs() < 1e-12);
    }

    #[test]
    fn test_score_is_clamped_to_one() {
        let history = vec![played("1", &["Action"], &["heist"])];
        let profile = TasteProfile::build(&history);
        let scorer = TasteScorer::new(TasteConfig {
            tag_boost: 10.0,
            ..TasteConfig::default()
        })
        .unwrap();

        let candidate = unplayed("2", &["Action"], &["heist"]);
        assert_eq!(scorer.score(&profile, &candidate), 1.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let history = vec![
            played("1", &["Action", "Drama"], &["a", "b"]),
            played("2", &["Comedy"], &["b", "c"]),
        ];
        let profile = TasteProfile::build(&history);
        let scorer = TasteScorer::default();

        for candidate in [
            unplayed("3", &[], &[]),
            unplayed("4", &["Action", "Drama", "Comedy"], &["a", "b", "c"]),
            unplayed("5", &["Western"], &["z"]),
        ] {
            let score = scorer.score(&profile, &candidate);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TasteConfig {
            dilution_factor: 0.0,
            ..TasteConfig::default()
        };
        assert!(TasteScorer::new(config).is_err());
    }
}
