//! # Scoring Crate
//!
//! Pure scoring functions over catalog items: how similar two items are, how
//! well an item matches the user's taste, and how a watch history reads as a
//! structured query.
//!
//! ## Main Components
//!
//! - **rarity**: Inverse-frequency weights for genres and tags across a corpus
//! - **similarity**: Pluggable weighted factors combined into a 0-100 score
//! - **taste**: Genre/tag distribution over watch history and the taste score
//! - **query_profile**: History statistics turned into ordered filter clauses
//! - **config**: Weights, scales and thresholds, all with defaults
//!
//! ## Example Usage
//!
//! ```ignore
//! use scoring::{RarityProfile, ScoringContext, SimilarityConfig, SimilarityScorer};
//!
//! let rarity = RarityProfile::from_items(&corpus);
//! let scorer = SimilarityScorer::from_config(&SimilarityConfig::extended())?;
//!
//! let score = scorer.score(&anchor, &candidate, &ScoringContext::new(&rarity));
//! println!("{} -> {}: {:.1}", anchor.name, candidate.name, score);
//! ```

pub mod config;
pub mod error;
pub mod query_profile;
pub mod rarity;
pub mod similarity;
pub mod taste;

pub use config::{EmptySetPolicy, QueryProfileConfig, SimilarityConfig, TasteConfig};
pub use error::{ConfigError, Result};
pub use query_profile::{
    HistoryStats, QueryClause, QueryOperator, QueryProfile, QueryProfileExtractor, QueryValue,
};
pub use rarity::{CategoricalAttribute, RarityProfile, rarity_weight};
pub use similarity::{
    FactorBreakdown, FactorScore, ScoringContext, SimilarityFactor, SimilarityScorer,
};
pub use taste::{TasteProfile, TasteScorer};
