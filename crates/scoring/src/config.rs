//! Tunable parameters for the scoring engine.
//!
//! Every struct here has a `Default` carrying the stock constants,
//! builder-style `with_*` setters, and a `validate()` that must pass before
//! the parameters are used. All of them deserialize from JSON with
//! `#[serde(default)]`, so a config file only needs to name what it changes.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// What a set-overlap factor reports when neither item has the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySetPolicy {
    /// Factor applies and scores 0: no shared evidence
    NoEvidence,
    /// Factor applies and scores 1: both sides agree on "nothing"
    PerfectMatch,
    /// Factor is skipped: neither its weight nor a score is counted
    NotApplicable,
}

// =============================================================================
// Similarity
// =============================================================================

/// Weights and scales for the pairwise similarity scorer.
///
/// The four core factors (genres, tags, community rating, production year)
/// are always present. Every other factor is `None` until a weight is set;
/// see [`SimilarityConfig::extended`] for the full set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimilarityConfig {
    pub genre_weight: f64,
    pub tag_weight: f64,
    pub community_rating_weight: f64,
    pub production_year_weight: f64,

    pub critic_rating_weight: Option<f64>,
    pub name_token_weight: Option<f64>,
    pub prefix_bonus_weight: Option<f64>,
    pub actor_weight: Option<f64>,
    pub director_writer_weight: Option<f64>,
    pub studio_weight: Option<f64>,
    pub favorite_bonus_weight: Option<f64>,

    /// Rating difference at which community-rating similarity hits 0
    pub community_rating_scale: f64,
    /// Rating difference at which critic-rating similarity hits 0
    pub critic_rating_scale: f64,
    /// Year difference at which production-year similarity hits 0
    pub max_year_diff: f64,

    /// Empty-set behaviour of the rarity-weighted genre/tag factors
    pub weighted_empty_sets: EmptySetPolicy,
    /// Empty-set behaviour of the plain actor/director/studio factors
    pub plain_empty_sets: EmptySetPolicy,

    /// Title tokens ignored by the name-token factor
    pub stopwords: Vec<String>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            genre_weight: 4.0,
            tag_weight: 4.0,
            community_rating_weight: 3.0,
            production_year_weight: 2.0,
            critic_rating_weight: None,
            name_token_weight: None,
            prefix_bonus_weight: None,
            actor_weight: None,
            director_writer_weight: None,
            studio_weight: None,
            favorite_bonus_weight: None,
            community_rating_scale: 10.0,
            critic_rating_scale: 100.0,
            max_year_diff: 80.0,
            weighted_empty_sets: EmptySetPolicy::NoEvidence,
            plain_empty_sets: EmptySetPolicy::NotApplicable,
            stopwords: ["the", "part", "season", "episode"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SimilarityConfig {
    /// Core factors plus title, cast/crew, studio and critic factors.
    pub fn extended() -> Self {
        Self::default().with_extended_factors()
    }

    /// Enable the extended factors that are still unset, keeping every
    /// weight and policy already configured.
    pub fn with_extended_factors(mut self) -> Self {
        self.critic_rating_weight.get_or_insert(2.0);
        self.name_token_weight.get_or_insert(3.0);
        self.prefix_bonus_weight.get_or_insert(6.0);
        self.actor_weight.get_or_insert(3.0);
        self.director_writer_weight.get_or_insert(5.0);
        self.studio_weight.get_or_insert(1.0);
        self
    }

    /// Configure the genre weight (default: 4.0)
    pub fn with_genre_weight(mut self, weight: f64) -> Self {
        self.genre_weight = weight;
        self
    }

    /// Configure the tag weight (default: 4.0)
    pub fn with_tag_weight(mut self, weight: f64) -> Self {
        self.tag_weight = weight;
        self
    }

    /// Enable the favorite bonus (default: disabled)
    pub fn with_favorite_bonus(mut self, weight: f64) -> Self {
        self.favorite_bonus_weight = Some(weight);
        self
    }

    /// Configure how weighted set factors treat two empty sets
    pub fn with_weighted_empty_sets(mut self, policy: EmptySetPolicy) -> Self {
        self.weighted_empty_sets = policy;
        self
    }

    /// Configure how plain set factors treat two empty sets
    pub fn with_plain_empty_sets(mut self, policy: EmptySetPolicy) -> Self {
        self.plain_empty_sets = policy;
        self
    }

    /// Reject weights and scales that would produce undefined contributions.
    pub fn validate(&self) -> Result<()> {
        let core = [
            ("genre_weight", self.genre_weight),
            ("tag_weight", self.tag_weight),
            ("community_rating_weight", self.community_rating_weight),
            ("production_year_weight", self.production_year_weight),
        ];
        for (name, value) in core {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        let optional = [
            ("critic_rating_weight", self.critic_rating_weight),
            ("name_token_weight", self.name_token_weight),
            ("prefix_bonus_weight", self.prefix_bonus_weight),
            ("actor_weight", self.actor_weight),
            ("director_writer_weight", self.director_writer_weight),
            ("studio_weight", self.studio_weight),
            ("favorite_bonus_weight", self.favorite_bonus_weight),
        ];
        for (name, weight) in optional {
            if let Some(value) = weight {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidOptionalWeight { name, value });
                }
            }
        }

        let scales = [
            ("community_rating_scale", self.community_rating_scale),
            ("critic_rating_scale", self.critic_rating_scale),
            ("max_year_diff", self.max_year_diff),
        ];
        for (name, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidScale { name, value });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Taste
// =============================================================================

/// Parameters of the taste-affinity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TasteConfig {
    /// Genre count above which the dilution penalty starts
    pub genre_dilution_threshold: usize,
    /// Multiplier applied once per genre above the threshold
    pub dilution_factor: f64,
    /// Multiplier on the summed tag weights
    pub tag_boost: f64,
    pub genre_share: f64,
    pub tag_share: f64,
}

impl Default for TasteConfig {
    fn default() -> Self {
        Self {
            genre_dilution_threshold: 4,
            dilution_factor: 0.85,
            tag_boost: 1.25,
            genre_share: 0.65,
            tag_share: 0.35,
        }
    }
}

impl TasteConfig {
    /// Configure the dilution threshold (default: 4)
    pub fn with_genre_dilution_threshold(mut self, threshold: usize) -> Self {
        self.genre_dilution_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dilution_factor.is_finite()
            || self.dilution_factor <= 0.0
            || self.dilution_factor > 1.0
        {
            return Err(ConfigError::OutOfRange {
                name: "dilution_factor",
                reason: format!("{} is not in (0, 1]", self.dilution_factor),
            });
        }
        let weights = [
            ("tag_boost", self.tag_boost),
            ("genre_share", self.genre_share),
            ("tag_share", self.tag_share),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Query profile
// =============================================================================

/// Widest accepted production-year half-window
pub const MAX_YEAR_WINDOW: i32 = 500;

/// Parameters of the query-profile extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryProfileConfig {
    pub top_genres: usize,
    pub top_tags: usize,
    /// Half-width of the production-year window, in years
    pub year_window: i32,
    /// Subtracted from the mean community rating
    pub rating_margin: f64,
    /// The minimum-rating clause never goes below this
    pub rating_floor: f64,
    /// Emit a studio clause (off by default: tends to over-narrow)
    pub include_studios: bool,
    /// Emit director/writer/actor clauses (off by default)
    pub include_people: bool,
    pub top_studios: usize,
    pub top_people: usize,
}

impl Default for QueryProfileConfig {
    fn default() -> Self {
        Self {
            top_genres: 5,
            top_tags: 5,
            year_window: 5,
            rating_margin: 0.5,
            rating_floor: 6.0,
            include_studios: false,
            include_people: false,
            top_studios: 3,
            top_people: 3,
        }
    }
}

impl QueryProfileConfig {
    /// Configure how many top genres and tags are kept (default: 5 each)
    pub fn with_top_k(mut self, genres: usize, tags: usize) -> Self {
        self.top_genres = genres;
        self.top_tags = tags;
        self
    }

    /// Emit studio and people clauses as well
    pub fn with_people_and_studios(mut self) -> Self {
        self.include_studios = true;
        self.include_people = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_YEAR_WINDOW).contains(&self.year_window) {
            return Err(ConfigError::OutOfRange {
                name: "year_window",
                reason: format!("{} is not in [0, {MAX_YEAR_WINDOW}]", self.year_window),
            });
        }
        if !self.rating_margin.is_finite() || self.rating_margin < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "rating_margin",
                reason: format!("{} is not a non-negative number", self.rating_margin),
            });
        }
        if !self.rating_floor.is_finite() || !(0.0..=10.0).contains(&self.rating_floor) {
            return Err(ConfigError::OutOfRange {
                name: "rating_floor",
                reason: format!("{} is not in [0, 10]", self.rating_floor),
            });
        }
        Ok(())
    }
}
