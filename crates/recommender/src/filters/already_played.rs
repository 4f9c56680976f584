//! Filter to remove items the user has already played.
//!
//! The unwatched collection can still contain items whose `UserData.Played`
//! flag is set; only the rest are "truly unwatched".

use crate::traits::{Filter, PoolContext};
use anyhow::Result;
use catalog::ContentItem;

/// Removes candidates whose played flag is set.
pub struct AlreadyPlayedFilter;

impl Filter for AlreadyPlayedFilter {
    fn name(&self) -> &str {
        "AlreadyPlayedFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a ContentItem>,
        _context: &PoolContext<'_>,
    ) -> Result<Vec<&'a ContentItem>> {
        Ok(candidates
            .into_iter()
            .filter(|item| !item.is_played())
            .collect())
    }
}
