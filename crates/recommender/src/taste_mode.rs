//! General-taste recommendations (no anchors).
//!
//! Two modes share the same ranking:
//! - **lenient**: rank every truly unwatched item by taste score and keep the
//!   top N with a score above 0
//! - **strict**: first narrow the truly unwatched items with the external
//!   [`QueryEvaluator`] using the query profile, then rank what is left
//!
//! In strict mode the evaluator's own order survives for equal scores, and
//! items scoring 0 are kept: the evaluator already decided they match.

use crate::assembler::EmptyReason;
use crate::config::TasteModeConfig;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::AlreadyPlayedFilter;
use crate::traits::PoolContext;
use anyhow::{Context, Result};
use catalog::ContentItem;
use scoring::query_profile::{FIELD_COMMUNITY_RATING, FIELD_PRODUCTION_YEAR};
use scoring::{
    QueryProfile, QueryProfileConfig, QueryProfileExtractor, TasteConfig, TasteProfile, TasteScorer,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// One sort key handed to the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub fields: Vec<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn descending(field: &str) -> Self {
        Self {
            fields: vec![field.to_string()],
            direction: SortDirection::Descending,
        }
    }

    pub fn ascending(field: &str) -> Self {
        Self {
            fields: vec![field.to_string()],
            direction: SortDirection::Ascending,
        }
    }
}

/// Best rated first, then newest first
pub fn default_sort() -> Vec<SortSpec> {
    vec![
        SortSpec::descending(FIELD_COMMUNITY_RATING),
        SortSpec::descending(FIELD_PRODUCTION_YEAR),
    ]
}

/// External structured-query component that executes a [`QueryProfile`].
///
/// How strictly each operator applies (for instance whether `all` demands
/// every listed value) is up to the implementation.
pub trait QueryEvaluator: Send + Sync {
    /// Returns the matching subset of `corpus`, ordered by `sort`.
    fn evaluate<'a>(
        &self,
        corpus: &[&'a ContentItem],
        profile: &QueryProfile,
        sort: &[SortSpec],
    ) -> Result<Vec<&'a ContentItem>>;
}

/// An item and its taste score in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct TasteMatch<'a> {
    pub item: &'a ContentItem,
    pub score: f64,
}

/// Flat ranked result; `empty_reason` is set exactly when `items` is empty.
#[derive(Debug, Clone, Default)]
pub struct TasteRecommendations<'a> {
    pub items: Vec<TasteMatch<'a>>,
    pub empty_reason: Option<EmptyReason>,
}

impl<'a> TasteRecommendations<'a> {
    pub fn empty(reason: EmptyReason) -> Self {
        Self {
            items: Vec::new(),
            empty_reason: Some(reason),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.items.iter().map(|m| m.item.id.as_str()).collect()
    }
}

/// Ranks unwatched items against the user's overall taste.
pub struct TasteRecommender {
    scorer: TasteScorer,
    extractor: QueryProfileExtractor,
    config: TasteModeConfig,
    sort: Vec<SortSpec>,
    filters: FilterPipeline,
    evaluator: Option<Box<dyn QueryEvaluator>>,
}

impl TasteRecommender {
    pub fn new(
        taste: TasteConfig,
        query_profile: QueryProfileConfig,
        config: TasteModeConfig,
    ) -> scoring::Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: TasteScorer::new(taste)?,
            extractor: QueryProfileExtractor::new(query_profile)?,
            config,
            sort: default_sort(),
            filters: FilterPipeline::new().add_filter(AlreadyPlayedFilter),
            evaluator: None,
        })
    }

    /// Evaluator used in strict mode.
    pub fn with_evaluator(mut self, evaluator: impl QueryEvaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn config(&self) -> &TasteModeConfig {
        &self.config
    }

    /// Query profile of a watch history, as strict mode would send it.
    pub fn query_profile(&self, watched: &[ContentItem]) -> QueryProfile {
        self.extractor.extract(watched)
    }

    pub fn recommend<'a>(
        &self,
        watched: &'a [ContentItem],
        unwatched: &'a [ContentItem],
    ) -> TasteRecommendations<'a> {
        match self.try_recommend(watched, unwatched) {
            Ok(recommendations) => recommendations,
            Err(err) => {
                error!("Taste recommendation failed: {:#}", err);
                TasteRecommendations::empty(EmptyReason::InternalError)
            }
        }
    }

    #[instrument(skip_all, fields(strict = self.config.strict))]
    pub fn try_recommend<'a>(
        &self,
        watched: &'a [ContentItem],
        unwatched: &'a [ContentItem],
    ) -> Result<TasteRecommendations<'a>> {
        if watched.is_empty() {
            warn!("No watched items found for taste-based recommendations");
            return Ok(TasteRecommendations::empty(EmptyReason::NoWatchedItems));
        }
        if unwatched.is_empty() {
            warn!("No unwatched items found for taste-based recommendations");
            return Ok(TasteRecommendations::empty(EmptyReason::NoUnwatchedItems));
        }

        let candidates = self
            .filters
            .apply(unwatched.iter().collect(), &PoolContext::stateless())?;
        if candidates.is_empty() {
            warn!("No truly unwatched items available after filtering");
            return Ok(TasteRecommendations::empty(EmptyReason::NoTrulyUnwatchedItems));
        }

        let profile = TasteProfile::build(watched);
        let ranked = if self.config.strict {
            let Some(narrowed) = self.narrow(watched, &candidates) else {
                return Ok(TasteRecommendations::empty(EmptyReason::InternalError));
            };
            self.rank(&profile, narrowed, true)
        } else {
            self.rank(&profile, candidates, false)
        };

        info!("Ranked {} taste matches", ranked.len());
        if ranked.is_empty() {
            return Ok(TasteRecommendations::empty(EmptyReason::NoMatches));
        }
        Ok(TasteRecommendations {
            items: ranked,
            empty_reason: None,
        })
    }

    /// Run the evaluator; `None` (with a warning) when it fails or is missing.
    fn narrow<'a>(
        &self,
        watched: &[ContentItem],
        candidates: &[&'a ContentItem],
    ) -> Option<Vec<&'a ContentItem>> {
        let result = self
            .evaluator
            .as_ref()
            .context("strict taste mode needs a query evaluator")
            .and_then(|evaluator| {
                let query = self.extractor.extract(watched);
                debug!("Evaluating query profile with {} clauses", query.len());
                evaluator.evaluate(candidates, &query, &self.sort)
            });
        match result {
            Ok(narrowed) => Some(narrowed),
            Err(err) => {
                warn!("Query evaluator failed, returning no taste matches: {:#}", err);
                None
            }
        }
    }

    /// Score, drop malformed items (logged), sort descending and truncate.
    fn rank<'a>(
        &self,
        profile: &TasteProfile,
        items: Vec<&'a ContentItem>,
        keep_zero: bool,
    ) -> Vec<TasteMatch<'a>> {
        let mut ranked: Vec<TasteMatch<'a>> = items
            .into_iter()
            .filter(|item| match item.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!("Skipping malformed candidate {}: {}", item.id, err);
                    false
                }
            })
            .map(|item| TasteMatch {
                item,
                score: self.scorer.score(profile, item),
            })
            .filter(|m| keep_zero || m.score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.limit);
        ranked
    }
}

impl Default for TasteRecommender {
    fn default() -> Self {
        Self {
            scorer: TasteScorer::default(),
            extractor: QueryProfileExtractor::default(),
            config: TasteModeConfig::default(),
            sort: default_sort(),
            filters: FilterPipeline::new().add_filter(AlreadyPlayedFilter),
            evaluator: None,
        }
    }
}
