//! Selection state for one recommendation pass.
//!
//! The session is owned by the caller and passed in explicitly. Nothing is
//! kept in process-wide state, so independent passes never drain each
//! other's anchor or candidate pools and can run in parallel.

use catalog::ItemId;
use std::collections::HashSet;

/// Anchors already tried and candidates already recommended.
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    used_anchors: HashSet<ItemId>,
    recommended: HashSet<ItemId>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; call before starting a new pass with this session.
    pub fn clear(&mut self) {
        self.used_anchors.clear();
        self.recommended.clear();
    }

    /// Returns false if the anchor had already been used.
    pub fn mark_anchor_used(&mut self, id: &str) -> bool {
        self.used_anchors.insert(id.to_string())
    }

    pub fn is_anchor_used(&self, id: &str) -> bool {
        self.used_anchors.contains(id)
    }

    /// Returns false if the candidate had already been recommended.
    pub fn mark_recommended(&mut self, id: &str) -> bool {
        self.recommended.insert(id.to_string())
    }

    pub fn is_recommended(&self, id: &str) -> bool {
        self.recommended.contains(id)
    }

    pub fn used_anchor_count(&self) -> usize {
        self.used_anchors.len()
    }

    pub fn recommended_count(&self) -> usize {
        self.recommended.len()
    }
}
