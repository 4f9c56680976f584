//! Rarity profile: inverse-document-frequency weights for genres and tags.
//!
//! ## Algorithm
//! For every case-folded key, `freq` is the number of items whose attribute
//! set contains it (an item counts once however often it lists the key).
//! With `N` the corpus size:
//!
//! ```text
//! rarity(key) = ln((N + 1) / (freq + 1))
//! ```
//!
//! The +1 smoothing keeps the log finite and pins a key present in every
//! item to exactly 0. Keys never observed are absent and read as 0.

use catalog::ContentItem;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Which categorical attribute a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalAttribute {
    Genres,
    Tags,
}

impl CategoricalAttribute {
    /// Case-folded keys of this attribute on `item`
    pub fn keys(self, item: &ContentItem) -> std::collections::HashSet<String> {
        match self {
            Self::Genres => item.genre_keys(),
            Self::Tags => item.tag_keys(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Genres => "genres",
            Self::Tags => "tags",
        }
    }
}

type Frequencies = HashMap<String, usize>;

/// Rarity weights derived from one corpus snapshot.
#[derive(Debug, Clone, Default)]
pub struct RarityProfile {
    genres: HashMap<String, f64>,
    tags: HashMap<String, f64>,
    corpus_size: usize,
}

impl RarityProfile {
    /// Build the profile over a corpus (typically watched plus unwatched).
    pub fn build(items: &[&ContentItem]) -> Self {
        let (genre_freq, tag_freq) = items
            .par_iter()
            .fold(
                || (Frequencies::new(), Frequencies::new()),
                |(mut genres, mut tags), item| {
                    for key in item.genre_keys() {
                        *genres.entry(key).or_insert(0) += 1;
                    }
                    for key in item.tag_keys() {
                        *tags.entry(key).or_insert(0) += 1;
                    }
                    (genres, tags)
                },
            )
            .reduce(
                || (Frequencies::new(), Frequencies::new()),
                |(mut genres, mut tags), (local_genres, local_tags)| {
                    merge_counts(&mut genres, local_genres);
                    merge_counts(&mut tags, local_tags);
                    (genres, tags)
                },
            );

        let corpus_size = items.len();
        let profile = Self {
            genres: to_weights(genre_freq, corpus_size),
            tags: to_weights(tag_freq, corpus_size),
            corpus_size,
        };
        debug!(
            "Built rarity profile over {} items ({} genres, {} tags)",
            corpus_size,
            profile.genres.len(),
            profile.tags.len()
        );
        profile
    }

    /// Convenience wrapper for an owned slice
    pub fn from_items(items: &[ContentItem]) -> Self {
        let refs: Vec<&ContentItem> = items.iter().collect();
        Self::build(&refs)
    }

    /// Weight of an already case-folded key; unknown keys weigh 0.
    pub fn weight(&self, attribute: CategoricalAttribute, folded_key: &str) -> f64 {
        let map = match attribute {
            CategoricalAttribute::Genres => &self.genres,
            CategoricalAttribute::Tags => &self.tags,
        };
        map.get(folded_key).copied().unwrap_or(0.0)
    }

    /// Weight of a genre, in any casing
    pub fn genre_weight(&self, genre: &str) -> f64 {
        self.weight(CategoricalAttribute::Genres, &genre.trim().to_lowercase())
    }

    /// Weight of a tag, in any casing
    pub fn tag_weight(&self, tag: &str) -> f64 {
        self.weight(CategoricalAttribute::Tags, &tag.trim().to_lowercase())
    }

    pub fn corpus_size(&self) -> usize {
        self.corpus_size
    }
}

/// `ln((N + 1) / (freq + 1))`
pub fn rarity_weight(corpus_size: usize, freq: usize) -> f64 {
    ((corpus_size as f64 + 1.0) / (freq as f64 + 1.0)).ln()
}

fn merge_counts(into: &mut Frequencies, from: Frequencies) {
    for (key, count) in from {
        *into.entry(key).or_insert(0) += count;
    }
}

fn to_weights(freq: Frequencies, corpus_size: usize) -> HashMap<String, f64> {
    freq.into_iter()
        .map(|(key, count)| (key, rarity_weight(corpus_size, count)))
        .collect()
}
