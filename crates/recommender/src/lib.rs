//! Recommendation engine: anchor-based and taste-based passes over a catalog.
//!
//! This crate provides:
//! - Filter trait and FilterPipeline for narrowing candidate pools
//! - SelectionSession, the caller-owned state of one recommendation pass
//! - RecommendationAssembler for "because you watched X" groups
//! - TasteRecommender for ranking by overall taste, optionally narrowed by
//!   an external QueryEvaluator
//! - Output records and the ImageUrlResolver collaborator
//! - EngineConfig, loaded from a JSON file
//!
//! ## Architecture
//! A pass runs in stages:
//! 1. Setup filters drop unwatched items already marked played
//! 2. A rarity profile is built over the whole corpus
//! 3. Anchors are sampled through an AnchorPicker; each gets its own pool
//! 4. Candidates are scored in parallel, thresholded, sorted and truncated
//!
//! ## Example Usage
//! ```ignore
//! use recommender::{AssemblerConfig, RandomAnchorPicker, RecommendationAssembler};
//! use scoring::SimilarityScorer;
//!
//! let assembler =
//!     RecommendationAssembler::new(SimilarityScorer::standard(), AssemblerConfig::default())?;
//! let mut picker = RandomAnchorPicker::seeded(42);
//!
//! let recommendations = assembler.recommend(&snapshot.watched, &snapshot.unwatched, &mut picker);
//! for group in &recommendations.groups {
//!     println!("Because you watched {}:", group.anchor.name);
//! }
//! ```

pub mod anchors;
pub mod assembler;
pub mod config;
pub mod filter_pipeline;
pub mod filters;
pub mod output;
pub mod session;
pub mod taste_mode;
pub mod traits;

// Re-export main types
pub use anchors::{AnchorPicker, InOrderAnchorPicker, RandomAnchorPicker};
pub use assembler::{
    EmptyReason, RecommendationAssembler, RecommendationGroup, Recommendations, ScoredCandidate,
};
pub use config::{AssemblerConfig, EngineConfig, TasteModeConfig};
pub use filter_pipeline::FilterPipeline;
pub use output::{
    AnchorRecommendations, ImageUrlResolver, PlaceholderImages, RecommendedItem, ServerImageUrls,
    anchor_records, taste_records,
};
pub use session::SelectionSession;
pub use taste_mode::{
    QueryEvaluator, SortDirection, SortSpec, TasteMatch, TasteRecommendations, TasteRecommender,
};
pub use traits::{Filter, PoolContext};
