//! Similarity factor implementations.
//!
//! - [`WeightedOverlap`]: rarity-weighted Jaccard over genres or tags
//! - [`PlainOverlap`]: unweighted Jaccard over actors, directors/writers or studios
//! - [`NumericCloseness`]: linear decay over a rating or year difference
//! - [`NameTokenOverlap`]: shared title words
//! - [`TitlePrefixBonus`]: one title starts with the other
//! - [`FavoriteBonus`]: the candidate is a user favorite

use super::tokens::{normalize_title, title_tokens};
use super::{EPSILON, FactorScore, ScoringContext, SimilarityFactor};
use crate::config::EmptySetPolicy;
use crate::rarity::CategoricalAttribute;
use catalog::ContentItem;
use std::collections::HashSet;
use std::hash::Hash;

/// Score for a pair where neither side has the attribute
fn empty_sets_score(policy: EmptySetPolicy, weight: f64) -> Option<FactorScore> {
    match policy {
        EmptySetPolicy::NoEvidence => Some(FactorScore::weighted(0.0, weight)),
        EmptySetPolicy::PerfectMatch => Some(FactorScore::weighted(1.0, weight)),
        EmptySetPolicy::NotApplicable => None,
    }
}

/// Plain Jaccard with an epsilon-smoothed union; two empty sets give 1.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64 + EPSILON;
    intersection / union
}

// =============================================================================
// Categorical sets
// =============================================================================

/// Rarity-weighted Jaccard over genres or tags.
///
/// ## Algorithm
/// Over the union of both key sets, sum the rarity of every key
/// (`total`) and of the keys both sides share (`shared`). The similarity
/// is `shared / (total + EPSILON)`, or 0 when `total` is 0 (every key in
/// the union is universal or unknown).
pub struct WeightedOverlap {
    attribute: CategoricalAttribute,
    weight: f64,
    empty_sets: EmptySetPolicy,
}

impl WeightedOverlap {
    pub fn new(attribute: CategoricalAttribute, weight: f64, empty_sets: EmptySetPolicy) -> Self {
        Self {
            attribute,
            weight,
            empty_sets,
        }
    }
}

impl SimilarityFactor for WeightedOverlap {
    fn name(&self) -> &str {
        self.attribute.label()
    }

    fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        context: &ScoringContext<'_>,
    ) -> Option<FactorScore> {
        let a = self.attribute.keys(target);
        let b = self.attribute.keys(candidate);
        if a.is_empty() && b.is_empty() {
            return empty_sets_score(self.empty_sets, self.weight);
        }

        let mut shared = 0.0;
        let mut total = 0.0;
        for key in a.union(&b) {
            let rarity = context.rarity.weight(self.attribute, key);
            total += rarity;
            if a.contains(key) && b.contains(key) {
                shared += rarity;
            }
        }

        let similarity = if total > 0.0 {
            shared / (total + EPSILON)
        } else {
            0.0
        };
        Some(FactorScore::weighted(similarity, self.weight))
    }
}

// =============================================================================
// Relational sets
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalAttribute {
    Actors,
    DirectorsWriters,
    Studios,
}

/// Unweighted Jaccard over people or studios.
pub struct PlainOverlap {
    attribute: RelationalAttribute,
    weight: f64,
    empty_sets: EmptySetPolicy,
}

impl PlainOverlap {
    pub fn new(attribute: RelationalAttribute, weight: f64, empty_sets: EmptySetPolicy) -> Self {
        Self {
            attribute,
            weight,
            empty_sets,
        }
    }

    fn overlap<T: Eq + Hash>(&self, a: HashSet<T>, b: HashSet<T>) -> Option<FactorScore> {
        if a.is_empty() && b.is_empty() {
            return empty_sets_score(self.empty_sets, self.weight);
        }
        Some(FactorScore::weighted(jaccard(&a, &b), self.weight))
    }
}

impl SimilarityFactor for PlainOverlap {
    fn name(&self) -> &str {
        match self.attribute {
            RelationalAttribute::Actors => "actors",
            RelationalAttribute::DirectorsWriters => "directors_writers",
            RelationalAttribute::Studios => "studios",
        }
    }

    fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        _context: &ScoringContext<'_>,
    ) -> Option<FactorScore> {
        match self.attribute {
            RelationalAttribute::Actors => self.overlap(target.actor_ids(), candidate.actor_ids()),
            RelationalAttribute::DirectorsWriters => {
                self.overlap(target.director_writer_ids(), candidate.director_writer_ids())
            }
            RelationalAttribute::Studios => {
                self.overlap(target.studio_keys(), candidate.studio_keys())
            }
        }
    }
}

// =============================================================================
// Numeric closeness
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericAttribute {
    CommunityRating,
    CriticRating,
    ProductionYear,
}

impl NumericAttribute {
    fn value(self, item: &ContentItem) -> Option<f64> {
        match self {
            Self::CommunityRating => item.community_rating,
            Self::CriticRating => item.critic_rating,
            Self::ProductionYear => item.production_year.map(f64::from),
        }
    }
}

/// `max(0, 1 - |a - b| / scale)`, applicable only when both values exist.
pub struct NumericCloseness {
    attribute: NumericAttribute,
    weight: f64,
    scale: f64,
}

impl NumericCloseness {
    pub fn new(attribute: NumericAttribute, weight: f64, scale: f64) -> Self {
        Self {
            attribute,
            weight,
            scale,
        }
    }
}

impl SimilarityFactor for NumericCloseness {
    fn name(&self) -> &str {
        match self.attribute {
            NumericAttribute::CommunityRating => "community_rating",
            NumericAttribute::CriticRating => "critic_rating",
            NumericAttribute::ProductionYear => "production_year",
        }
    }

    fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        _context: &ScoringContext<'_>,
    ) -> Option<FactorScore> {
        let a = self.attribute.value(target)?;
        let b = self.attribute.value(candidate)?;
        let similarity = (1.0 - (a - b).abs() / self.scale).max(0.0);
        Some(FactorScore::weighted(similarity, self.weight))
    }
}

// =============================================================================
// Titles
// =============================================================================

/// Shared title words: `|A ∩ B| / max(|A|, |B|, 1)`. Always applicable.
pub struct NameTokenOverlap {
    weight: f64,
    stopwords: Vec<String>,
}

impl NameTokenOverlap {
    pub fn new(weight: f64, stopwords: Vec<String>) -> Self {
        Self { weight, stopwords }
    }
}

impl SimilarityFactor for NameTokenOverlap {
    fn name(&self) -> &str {
        "name_tokens"
    }

    fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        _context: &ScoringContext<'_>,
    ) -> Option<FactorScore> {
        let a = title_tokens(&target.name, &self.stopwords);
        let b = title_tokens(&candidate.name, &self.stopwords);
        let denominator = a.len().max(b.len()).max(1) as f64;
        let similarity = a.intersection(&b).count() as f64 / denominator;
        Some(FactorScore::weighted(similarity, self.weight))
    }
}

/// Full bonus when one normalized title is a prefix of the other.
///
/// The bonus is added to both the earned and the possible points, so it
/// lifts matching pairs without penalizing the rest.
pub struct TitlePrefixBonus {
    weight: f64,
}

impl TitlePrefixBonus {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl SimilarityFactor for TitlePrefixBonus {
    fn name(&self) -> &str {
        "title_prefix"
    }

    fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        _context: &ScoringContext<'_>,
    ) -> Option<FactorScore> {
        let a = normalize_title(&target.name);
        let b = normalize_title(&candidate.name);
        // An empty title is a prefix of everything
        if a.is_empty() || b.is_empty() {
            return None;
        }
        if a.starts_with(&b) || b.starts_with(&a) {
            Some(FactorScore::bonus(self.weight))
        } else {
            None
        }
    }
}

// =============================================================================
// Favorites
// =============================================================================

/// Full bonus when the candidate is marked favorite.
pub struct FavoriteBonus {
    weight: f64,
}

impl FavoriteBonus {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl SimilarityFactor for FavoriteBonus {
    fn name(&self) -> &str {
        "favorite_bonus"
    }

    fn score(
        &self,
        _target: &ContentItem,
        candidate: &ContentItem,
        _context: &ScoringContext<'_>,
    ) -> Option<FactorScore> {
        candidate
            .is_favorite()
            .then(|| FactorScore::bonus(self.weight))
    }
}
