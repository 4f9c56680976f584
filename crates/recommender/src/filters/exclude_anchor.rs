//! Filter to keep an anchor out of its own candidate pool.

use crate::traits::{Filter, PoolContext};
use anyhow::Result;
use catalog::ContentItem;

/// Removes the item sharing the current anchor's id, if any.
pub struct ExcludeAnchorFilter;

impl Filter for ExcludeAnchorFilter {
    fn name(&self) -> &str {
        "ExcludeAnchorFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a ContentItem>,
        context: &PoolContext<'_>,
    ) -> Result<Vec<&'a ContentItem>> {
        let Some(anchor) = context.anchor else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|item| item.id != anchor.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SelectionSession;

    #[test]
    fn test_exclude_anchor_filter() {
        let items = vec![ContentItem::new("a", "Anchor"), ContentItem::new("b", "Other")];
        let session = SelectionSession::new();

        let without_anchor = PoolContext::new(&session, true);
        let filtered = ExcludeAnchorFilter.apply(items.iter().collect(), &without_anchor).unwrap();
        assert_eq!(filtered.len(), 2);

        let context = without_anchor.with_anchor(&items[0]);
        let filtered = ExcludeAnchorFilter.apply(items.iter().collect(), &context).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }
}
