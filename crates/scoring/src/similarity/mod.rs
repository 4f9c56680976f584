//! Pairwise similarity between two catalog items.
//!
//! A [`SimilarityScorer`] is a fixed list of [`SimilarityFactor`]s. Each
//! factor looks at one aspect of the pair and either reports that it does
//! not apply, or returns a [`FactorScore`]: the points it earned (`raw`)
//! and the points it could have earned (`max`). The aggregate is
//!
//! ```text
//! similarity = sum(raw) / sum(max) * 100      (0 when no factor applies)
//! ```
//!
//! so factors that could not be evaluated (a missing rating, say) neither
//! help nor hurt the pair.

pub mod factors;
pub mod tokens;

use crate::config::SimilarityConfig;
use crate::error::Result;
use crate::rarity::{CategoricalAttribute, RarityProfile};
use catalog::ContentItem;
use factors::{
    FavoriteBonus, NameTokenOverlap, NumericAttribute, NumericCloseness, PlainOverlap,
    RelationalAttribute, TitlePrefixBonus, WeightedOverlap,
};
use serde::Serialize;

/// Smoothing term added to set-union sizes and rarity totals
pub const EPSILON: f64 = 1e-6;

/// Points earned by one factor, out of the points it could earn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorScore {
    pub raw: f64,
    pub max: f64,
}

impl FactorScore {
    /// A ratio factor: `similarity` in [0, 1] scaled by `weight`
    pub fn weighted(similarity: f64, weight: f64) -> Self {
        let similarity = if similarity.is_finite() {
            similarity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            raw: similarity * weight,
            max: weight,
        }
    }

    /// A boolean bonus that was earned in full
    pub fn bonus(weight: f64) -> Self {
        Self {
            raw: weight,
            max: weight,
        }
    }
}

/// Corpus-level data the factors may consult.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub rarity: &'a RarityProfile,
}

impl<'a> ScoringContext<'a> {
    pub fn new(rarity: &'a RarityProfile) -> Self {
        Self { rarity }
    }
}

/// One interchangeable aspect of item similarity.
///
/// Implementations must be pure: the same pair and context always give the
/// same result, and `raw` never exceeds `max`.
pub trait SimilarityFactor: Send + Sync {
    /// Returns the name of this factor (for logging/explanations)
    fn name(&self) -> &str;

    /// Score `candidate` against `target`, or `None` when the factor does
    /// not apply to this pair.
    fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        context: &ScoringContext<'_>,
    ) -> Option<FactorScore>;
}

/// Per-factor view of a similarity computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub factor: String,
    /// `None` when the factor did not apply
    pub score: Option<FactorScore>,
}

/// Aggregates a fixed set of factors into a 0-100 similarity.
pub struct SimilarityScorer {
    factors: Vec<Box<dyn SimilarityFactor>>,
}

impl SimilarityScorer {
    /// Create a scorer with no factors (every pair scores 0)
    pub fn new() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// Add a factor (builder pattern)
    pub fn add_factor(mut self, factor: impl SimilarityFactor + 'static) -> Self {
        self.factors.push(Box::new(factor));
        self
    }

    /// The stock factor set with default weights.
    pub fn standard() -> Self {
        Self::build(&SimilarityConfig::default())
    }

    /// Build the factor set described by `config`, after validating it.
    pub fn from_config(config: &SimilarityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &SimilarityConfig) -> Self {
        let mut scorer = Self::new()
            .add_factor(WeightedOverlap::new(
                CategoricalAttribute::Genres,
                config.genre_weight,
                config.weighted_empty_sets,
            ))
            .add_factor(WeightedOverlap::new(
                CategoricalAttribute::Tags,
                config.tag_weight,
                config.weighted_empty_sets,
            ))
            .add_factor(NumericCloseness::new(
                NumericAttribute::CommunityRating,
                config.community_rating_weight,
                config.community_rating_scale,
            ));

        if let Some(weight) = config.critic_rating_weight {
            scorer = scorer.add_factor(NumericCloseness::new(
                NumericAttribute::CriticRating,
                weight,
                config.critic_rating_scale,
            ));
        }

        scorer = scorer.add_factor(NumericCloseness::new(
            NumericAttribute::ProductionYear,
            config.production_year_weight,
            config.max_year_diff,
        ));

        if let Some(weight) = config.name_token_weight {
            scorer = scorer.add_factor(NameTokenOverlap::new(weight, config.stopwords.clone()));
        }
        if let Some(weight) = config.prefix_bonus_weight {
            scorer = scorer.add_factor(TitlePrefixBonus::new(weight));
        }

        let relational = [
            (RelationalAttribute::Actors, config.actor_weight),
            (RelationalAttribute::DirectorsWriters, config.director_writer_weight),
            (RelationalAttribute::Studios, config.studio_weight),
        ];
        for (attribute, weight) in relational {
            if let Some(weight) = weight {
                scorer = scorer.add_factor(PlainOverlap::new(
                    attribute,
                    weight,
                    config.plain_empty_sets,
                ));
            }
        }

        if let Some(weight) = config.favorite_bonus_weight {
            scorer = scorer.add_factor(FavoriteBonus::new(weight));
        }
        scorer
    }

    /// Names of the configured factors, in evaluation order
    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.name()).collect()
    }

    /// Similarity of `candidate` to `target`, in [0, 100].
    pub fn score(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        context: &ScoringContext<'_>,
    ) -> f64 {
        let (raw, max) = self
            .factors
            .iter()
            .filter_map(|factor| factor.score(target, candidate, context))
            .fold((0.0, 0.0), |(raw, max), s| (raw + s.raw, max + s.max));
        normalize(raw, max)
    }

    /// Per-factor contributions, for diagnostics.
    pub fn explain(
        &self,
        target: &ContentItem,
        candidate: &ContentItem,
        context: &ScoringContext<'_>,
    ) -> Vec<FactorBreakdown> {
        self.factors
            .iter()
            .map(|factor| FactorBreakdown {
                factor: factor.name().to_string(),
                score: factor.score(target, candidate, context),
            })
            .collect()
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::standard()
    }
}

/// `raw / max * 100`, with 0 for an empty or degenerate denominator.
fn normalize(raw: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    let score = raw / max * 100.0;
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}
