//! The FilterPipeline chains candidate filters.

use crate::traits::{Filter, PoolContext};
use anyhow::{Context, Result};
use catalog::ContentItem;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(ExcludeAnchorFilter)
///     .add_filter(AlreadyRecommendedFilter);
///
/// let pool = pipeline.apply(unwatched.iter().collect(), &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence.
    ///
    /// # Arguments
    /// * `candidates` - The pool to narrow
    /// * `context` - Anchor and selection state for filtering decisions
    ///
    /// # Returns
    /// * `Ok(Vec<&ContentItem>)` - The pool after all filters
    /// * `Err` - If any filter fails; the error names the filter
    pub fn apply<'a>(
        &self,
        candidates: Vec<&'a ContentItem>,
        context: &PoolContext<'_>,
    ) -> Result<Vec<&'a ContentItem>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter
                .apply(current, context)
                .with_context(|| format!("filter {} failed", filter.name()))?;
            tracing::trace!(
                "Filter {}: {} -> {} candidates",
                filter.name(),
                before,
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
