//! Anchor-based recommendation pass ("because you watched X").
//!
//! ## Algorithm
//! 1. Keep the unwatched items that are not marked played and that pass
//!    item validation (the "truly unwatched" pool)
//! 2. Build the rarity profile over watched ∪ truly unwatched
//! 3. Until K groups exist, anchors run out or the attempt/time budget is
//!    spent:
//!    a. Pick an unused watched item at random as the anchor
//!    b. Narrow the pool (drop the anchor, drop already recommended items
//!       in single-appearance mode)
//!    c. Score every candidate against the anchor in parallel
//!    d. Keep scores above the relevance floor, stable-sort descending,
//!       take the top M
//!    e. Record the group and mark its candidates as recommended
//!
//! Failures never escape [`RecommendationAssembler::recommend`]: they are
//! logged and turned into an empty result carrying an [`EmptyReason`].

use crate::anchors::AnchorPicker;
use crate::config::AssemblerConfig;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AlreadyPlayedFilter, AlreadyRecommendedFilter, ExcludeAnchorFilter};
use crate::session::SelectionSession;
use crate::traits::PoolContext;
use anyhow::{Context, Result};
use catalog::ContentItem;
use rayon::prelude::*;
use scoring::{RarityProfile, ScoringContext, SimilarityScorer};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Why a pass produced no groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmptyReason {
    NoWatchedItems,
    NoUnwatchedItems,
    NoTrulyUnwatchedItems,
    NoMatches,
    BudgetExhausted,
    InternalError,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoWatchedItems => "no watched items",
            Self::NoUnwatchedItems => "no unwatched items",
            Self::NoTrulyUnwatchedItems => "every unwatched item is already marked played",
            Self::NoMatches => "no candidate scored above the relevance floor",
            Self::BudgetExhausted => "attempt or time budget ran out before any match",
            Self::InternalError => "internal error, see logs",
        };
        f.write_str(text)
    }
}

/// A candidate and its similarity to the group's anchor, in [0, 100].
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub item: &'a ContentItem,
    pub score: f64,
}

/// Recommendations derived from one anchor, best first.
#[derive(Debug, Clone)]
pub struct RecommendationGroup<'a> {
    pub anchor: &'a ContentItem,
    pub scored: Vec<ScoredCandidate<'a>>,
}

/// Result of one pass; `empty_reason` is set exactly when `groups` is empty.
#[derive(Debug, Clone, Default)]
pub struct Recommendations<'a> {
    pub groups: Vec<RecommendationGroup<'a>>,
    pub empty_reason: Option<EmptyReason>,
}

impl<'a> Recommendations<'a> {
    pub fn empty(reason: EmptyReason) -> Self {
        Self {
            groups: Vec::new(),
            empty_reason: Some(reason),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every recommended candidate id, in group order
    pub fn candidate_ids(&self) -> Vec<&'a str> {
        self.groups
            .iter()
            .flat_map(|group| group.scored.iter().map(|c| c.item.id.as_str()))
            .collect()
    }

    pub fn anchor_ids(&self) -> Vec<&'a str> {
        self.groups.iter().map(|group| group.anchor.id.as_str()).collect()
    }
}

/// Orchestrates anchor selection, scoring and deduplication.
pub struct RecommendationAssembler {
    scorer: SimilarityScorer,
    config: AssemblerConfig,
    setup_filters: FilterPipeline,
    pool_filters: FilterPipeline,
}

impl RecommendationAssembler {
    /// # Arguments
    /// * `scorer` - Similarity scorer used for every anchor/candidate pair
    /// * `config` - Group counts, relevance floor and budgets (validated here)
    pub fn new(scorer: SimilarityScorer, config: AssemblerConfig) -> scoring::Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer,
            config,
            setup_filters: FilterPipeline::new().add_filter(AlreadyPlayedFilter),
            pool_filters: FilterPipeline::new()
                .add_filter(ExcludeAnchorFilter)
                .add_filter(AlreadyRecommendedFilter),
        })
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Run one pass with a fresh session.
    pub fn recommend<'a>(
        &self,
        watched: &'a [ContentItem],
        unwatched: &'a [ContentItem],
        picker: &mut dyn AnchorPicker,
    ) -> Recommendations<'a> {
        let mut session = SelectionSession::new();
        self.recommend_with_session(watched, unwatched, &mut session, picker)
    }

    /// Run one pass with a caller-owned session.
    ///
    /// Anchors and candidates already recorded in `session` are skipped, so
    /// calling this again with the same session continues where the last
    /// pass stopped. Call [`SelectionSession::clear`] to start over.
    pub fn recommend_with_session<'a>(
        &self,
        watched: &'a [ContentItem],
        unwatched: &'a [ContentItem],
        session: &mut SelectionSession,
        picker: &mut dyn AnchorPicker,
    ) -> Recommendations<'a> {
        match self.try_recommend(watched, unwatched, session, picker) {
            Ok(recommendations) => recommendations,
            Err(err) => {
                error!("Recommendation pass failed: {:#}", err);
                Recommendations::empty(EmptyReason::InternalError)
            }
        }
    }

    /// Fallible form of [`Self::recommend_with_session`].
    #[instrument(skip_all, fields(watched = watched.len(), unwatched = unwatched.len()))]
    pub fn try_recommend<'a>(
        &self,
        watched: &'a [ContentItem],
        unwatched: &'a [ContentItem],
        session: &mut SelectionSession,
        picker: &mut dyn AnchorPicker,
    ) -> Result<Recommendations<'a>> {
        if watched.is_empty() {
            warn!("No watched items; nothing to anchor recommendations on");
            return Ok(Recommendations::empty(EmptyReason::NoWatchedItems));
        }
        if unwatched.is_empty() {
            warn!("No unwatched items to recommend from");
            return Ok(Recommendations::empty(EmptyReason::NoUnwatchedItems));
        }

        let truly_unwatched = self.truly_unwatched(unwatched, session)?;
        if truly_unwatched.is_empty() {
            warn!("No truly unwatched items available after filtering");
            return Ok(Recommendations::empty(EmptyReason::NoTrulyUnwatchedItems));
        }

        let corpus: Vec<&ContentItem> = watched
            .iter()
            .chain(truly_unwatched.iter().copied())
            .collect();
        let rarity = RarityProfile::build(&corpus);
        let context = ScoringContext::new(&rarity);

        let started = Instant::now();
        let deadline = self.config.time_budget_ms.map(Duration::from_millis);
        let max_attempts = self.config.max_attempts.unwrap_or(2 * watched.len());
        let mut attempts = 0;
        let mut budget_exhausted = false;
        let mut groups = Vec::new();

        while groups.len() < self.config.anchor_count {
            if attempts >= max_attempts {
                budget_exhausted = self.config.max_attempts.is_some();
                break;
            }
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    budget_exhausted = true;
                    break;
                }
            }

            let anchors: Vec<&ContentItem> = watched
                .iter()
                .filter(|item| !session.is_anchor_used(&item.id))
                .collect();
            let Some(index) = picker.pick(anchors.len()) else {
                debug!("Anchor pool exhausted after {} attempts", attempts);
                break;
            };
            let anchor = anchors
                .get(index)
                .copied()
                .with_context(|| {
                    format!(
                        "anchor picker returned index {} for a pool of {}",
                        index,
                        anchors.len()
                    )
                })?;
            session.mark_anchor_used(&anchor.id);
            attempts += 1;

            if let Err(err) = anchor.validate() {
                warn!("Skipping malformed anchor {}: {}", anchor.id, err);
                continue;
            }

            let pool_context =
                PoolContext::new(session, self.config.single_appearance).with_anchor(anchor);
            let pool = self.pool_filters.apply(truly_unwatched.clone(), &pool_context)?;
            let scored = self.rank_candidates(anchor, &pool, &context);
            if scored.is_empty() {
                debug!("No similar items found for \"{}\", trying another anchor", anchor.name);
                continue;
            }

            if self.config.single_appearance {
                for candidate in &scored {
                    session.mark_recommended(&candidate.item.id);
                }
            }
            groups.push(RecommendationGroup { anchor, scored });
        }

        info!(
            "Assembled {} recommendation groups in {} attempts ({:?})",
            groups.len(),
            attempts,
            started.elapsed()
        );

        if groups.is_empty() {
            let reason = if budget_exhausted {
                EmptyReason::BudgetExhausted
            } else {
                EmptyReason::NoMatches
            };
            return Ok(Recommendations::empty(reason));
        }
        Ok(Recommendations {
            groups,
            empty_reason: None,
        })
    }

    /// Unplayed items that pass validation; malformed ones are logged and skipped.
    fn truly_unwatched<'a>(
        &self,
        unwatched: &'a [ContentItem],
        session: &SelectionSession,
    ) -> Result<Vec<&'a ContentItem>> {
        let context = PoolContext::new(session, self.config.single_appearance);
        let unplayed = self.setup_filters.apply(unwatched.iter().collect(), &context)?;
        Ok(unplayed
            .into_iter()
            .filter(|item| match item.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!("Skipping malformed candidate {}: {}", item.id, err);
                    false
                }
            })
            .collect())
    }

    /// Score the pool against one anchor and keep the best `per_anchor`.
    ///
    /// Scoring runs in parallel; the collect keeps pool order, so the stable
    /// sort leaves equal scores in catalog order.
    fn rank_candidates<'a>(
        &self,
        anchor: &ContentItem,
        pool: &[&'a ContentItem],
        context: &ScoringContext<'_>,
    ) -> Vec<ScoredCandidate<'a>> {
        let floor = self.config.relevance_floor;
        let mut scored: Vec<ScoredCandidate<'a>> = pool
            .par_iter()
            .map(|&item| ScoredCandidate {
                item,
                score: self.scorer.score(anchor, item, context),
            })
            .filter(|candidate| candidate.score > floor)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(self.config.per_anchor);
        scored
    }
}
