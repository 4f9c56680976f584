//! Core traits for narrowing a candidate pool.
//!
//! This module defines the Filter trait that lets the assembler compose the
//! per-anchor candidate pool from small, independent rules.

use crate::session::SelectionSession;
use anyhow::Result;
use catalog::ContentItem;

/// What a filter may consult while narrowing a pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolContext<'s> {
    /// Anchor the pool is being built for; `None` during setup
    pub anchor: Option<&'s ContentItem>,
    /// Selection state of the running session; `None` outside anchor mode
    pub session: Option<&'s SelectionSession>,
    pub single_appearance: bool,
}

impl<'s> PoolContext<'s> {
    pub fn new(session: &'s SelectionSession, single_appearance: bool) -> Self {
        Self {
            anchor: None,
            session: Some(session),
            single_appearance,
        }
    }

    /// Context with no anchor and no session state
    pub fn stateless() -> Self {
        Self {
            anchor: None,
            session: None,
            single_appearance: false,
        }
    }

    pub fn with_anchor(mut self, anchor: &'s ContentItem) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// Core trait for filtering candidate items.
///
/// ## Design Note
/// - `Send + Sync` allows one pipeline to be shared by parallel sessions
/// - Filters borrow items from the catalog; nothing is cloned
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a pool of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The pool to narrow (takes ownership of the Vec)
    /// * `context` - Current anchor and selection state
    ///
    /// # Returns
    /// * `Ok(Vec<&ContentItem>)` - The remaining candidates, in input order
    /// * `Err` - If filtering fails
    fn apply<'a>(
        &self,
        candidates: Vec<&'a ContentItem>,
        context: &PoolContext<'_>,
    ) -> Result<Vec<&'a ContentItem>>;
}
