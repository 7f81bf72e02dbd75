//! The ranks at which truncated reconstructions are evaluated.
//!
//! Error improvements are steep at low rank and flatten out quickly, so the
//! default schedule is dense at first (every rank from 1 to 5) and coarse
//! afterwards (every multiple of 10 up to 100).

use itertools::Itertools;
use std::ops::RangeInclusive;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankSchedule {
    fine: RangeInclusive<usize>,
    coarse: RangeInclusive<usize>,
    coarse_step: usize,
}

impl RankSchedule {
    /// Every rank in `fine` followed by every `coarse_step`-th rank of `coarse`.
    pub fn new(fine: RangeInclusive<usize>, coarse: RangeInclusive<usize>, coarse_step: usize) -> Self {
        assert!(coarse_step > 0, "`coarse_step` must be positive");
        RankSchedule {
            fine,
            coarse,
            coarse_step,
        }
    }

    /// Increasing, duplicate free ranks in `1..=max_rank`.
    ///
    /// Candidates above `max_rank` are dropped, not clamped.
    pub fn ranks(&self, max_rank: usize) -> Vec<usize> {
        self.fine
            .clone()
            .chain(self.coarse.clone().step_by(self.coarse_step))
            .filter(|&rank| rank >= 1 && rank <= max_rank)
            .sorted()
            .dedup()
            .collect()
    }
}

impl Default for RankSchedule {
    fn default() -> Self {
        RankSchedule::new(1..=5, 10..=100, 10)
    }
}
