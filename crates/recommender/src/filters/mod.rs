//! Candidate pool filters used by the assemblers.

pub mod already_played;
pub mod already_recommended;
pub mod exclude_anchor;

pub use already_played::AlreadyPlayedFilter;
pub use already_recommended::AlreadyRecommendedFilter;
pub use exclude_anchor::ExcludeAnchorFilter;
