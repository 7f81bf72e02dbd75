//! Parameters of the rank analysis.
//!
//! The defaults evaluate ranks 1 to 5 and every multiple of 10 up to 100, and
//! look for the onset of negative compression among ranks 0 to 99.

use crate::rank_schedule::RankSchedule;
use crate::threshold::ThresholdFinder;
use std::ops::{Range, RangeInclusive};

#[derive(Clone, Debug)]
pub struct AnalysisParams {
    /// Ranks evaluated one by one.
    pub fine_ranks: RangeInclusive<usize>,
    /// Ranks evaluated every `coarse_step`.
    pub coarse_ranks: RangeInclusive<usize>,
    pub coarse_step: usize,
    /// Ranks scanned for negative compression, independent of the image size.
    pub onset_scan: Range<usize>,
}

impl AnalysisParams {
    pub fn rank_schedule(&self) -> RankSchedule {
        RankSchedule::new(
            self.fine_ranks.clone(),
            self.coarse_ranks.clone(),
            self.coarse_step,
        )
    }

    pub fn threshold_finder(&self) -> ThresholdFinder {
        ThresholdFinder::new(self.onset_scan.clone())
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            fine_ranks: 1..=5,
            coarse_ranks: 10..=100,
            coarse_step: 10,
            onset_scan: 0..100,
        }
    }
}
