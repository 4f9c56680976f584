//! Filter to keep a candidate from appearing under more than one anchor.

use crate::traits::{Filter, PoolContext};
use anyhow::Result;
use catalog::ContentItem;

/// Removes candidates already recommended in this session.
///
/// Only active in single-appearance mode with a session attached; otherwise
/// the pool passes through.
pub struct AlreadyRecommendedFilter;

impl Filter for AlreadyRecommendedFilter {
    fn name(&self) -> &str {
        "AlreadyRecommendedFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a ContentItem>,
        context: &PoolContext<'_>,
    ) -> Result<Vec<&'a ContentItem>> {
        let Some(session) = context.session.filter(|_| context.single_appearance) else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|item| !session.is_recommended(&item.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SelectionSession;

    #[test]
    fn test_drops_recommended_only_in_single_appearance_mode() {
        let items = vec![ContentItem::new("1", "One"), ContentItem::new("2", "Two")];
        let mut session = SelectionSession::new();
        session.mark_recommended("1");

        let strict = PoolContext::new(&session, true);
        let filtered = AlreadyRecommendedFilter.apply(items.iter().collect(), &strict).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");

        let relaxed = PoolContext::new(&session, false);
        let filtered = AlreadyRecommendedFilter.apply(items.iter().collect(), &relaxed).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_stateless_context_passes_everything() {
        let items = vec![ContentItem::new("1", "One"), ContentItem::new("2", "Two")];
        let context = PoolContext {
            single_appearance: true,
            ..PoolContext::stateless()
        };
        let filtered = AlreadyRecommendedFilter.apply(items.iter().collect(), &context).unwrap();
        assert_eq!(filtered.len(), 2);
    }
}
