//! Locate the smallest rank at which truncated storage exceeds the raw image.
//!
//! The scan range is configured on its own and is not clamped to the image
//! dimensions: only the storage formula is evaluated, no reconstruction.

use crate::metrics::is_negative_compression;
use crate::pgm::Image;
use log::debug;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdFinder {
    scan: Range<usize>,
}

impl ThresholdFinder {
    pub fn new(scan: Range<usize>) -> Self {
        ThresholdFinder { scan }
    }

    /// The first scanned rank with a negative compression ratio, if any.
    pub fn find_negative_compression_onset(&self, image: &Image) -> Option<usize> {
        self.onset_for_shape(image.height(), image.width())
    }

    /// As [`find_negative_compression_onset`](Self::find_negative_compression_onset)
    /// for a `(height, width)` image.
    pub fn onset_for_shape(&self, height: usize, width: usize) -> Option<usize> {
        let onset = self
            .scan
            .clone()
            .find(|&rank| is_negative_compression(rank, height, width));

        match onset {
            Some(rank) => debug!(
                "Negative compression for {}x{} image from rank {}",
                height, width, rank
            ),
            None => debug!(
                "No negative compression for {}x{} image in ranks {:?}",
                height, width, self.scan
            ),
        }

        onset
    }
}

impl Default for ThresholdFinder {
    fn default() -> Self {
        ThresholdFinder::new(0..100)
    }
}
