//! Anchor selection.
//!
//! Randomness only enters the engine here, behind [`AnchorPicker`], so tests
//! and benchmarks can pin it with a seed or replace it outright.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses one index out of a non-empty pool of anchor candidates.
pub trait AnchorPicker: Send {
    /// Returns an index in `0..pool_len`, or `None` for an empty pool.
    fn pick(&mut self, pool_len: usize) -> Option<usize>;
}

/// Uniform random pick backed by a `StdRng`.
#[derive(Debug, Clone)]
pub struct RandomAnchorPicker {
    rng: StdRng,
}

impl RandomAnchorPicker {
    /// Reproducible picker; the same seed yields the same anchor sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Picker seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, OS-seeded otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os(),
        }
    }
}

impl AnchorPicker for RandomAnchorPicker {
    fn pick(&mut self, pool_len: usize) -> Option<usize> {
        if pool_len == 0 {
            return None;
        }
        Some(self.rng.random_range(0..pool_len))
    }
}

/// Always takes the first candidate: anchors come out in catalog order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InOrderAnchorPicker;

impl AnchorPicker for InOrderAnchorPicker {
    fn pick(&mut self, pool_len: usize) -> Option<usize> {
        (pool_len > 0).then_some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let mut a = RandomAnchorPicker::seeded(7);
        let mut b = RandomAnchorPicker::seeded(7);
        let first: Vec<Option<usize>> = (0..20).map(|_| a.pick(10)).collect();
        let second: Vec<Option<usize>> = (0..20).map(|_| b.pick(10)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_stays_in_range() {
        let mut picker = RandomAnchorPicker::from_os();
        for len in 1..50 {
            let index = picker.pick(len).unwrap();
            assert!(index < len);
        }
        assert_eq!(picker.pick(0), None);
    }

    #[test]
    fn test_in_order_picker() {
        let mut picker = InOrderAnchorPicker;
        assert_eq!(picker.pick(3), Some(0));
        assert_eq!(picker.pick(0), None);
    }
}
