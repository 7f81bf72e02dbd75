//! Run the full rank analysis of an image.
//!
//! The pipeline decomposes the pixel matrix once, reconstructs it at every
//! rank of the schedule, scores each reconstruction against the original and
//! independently scans for the onset of negative compression.
//!
//! ```no_run
//! use rusty_image_compression::prelude::*;
//!
//! # fn example(bytes: &[u8]) -> rusty_image_compression::types::Result<()> {
//! let image = decode(bytes)?;
//! let analysis = Pipeline::default().run(&image)?;
//! for record in &analysis.metrics {
//!     println!("{} {:.3} {:?}", record.rank, record.mean_absolute_error, record.compression_ratio);
//! }
//! # Ok(())
//! # }
//! ```

use crate::compute_svd::{ComputeSVD, DivideAndConquer, SvdBackend};
use crate::metrics::{self, MetricsRecord};
use crate::params::AnalysisParams;
use crate::pgm::Image;
use crate::svd::SVD;
use crate::types::Result;
use log::debug;
use ndarray::Array2;

/// Result of a single pipeline run.
pub struct Analysis {
    /// The full decomposition of the pixel matrix
    pub svd: SVD,
    /// One record per evaluated rank, in schedule order
    pub metrics: Vec<MetricsRecord>,
    /// Smallest scanned rank with negative compression
    pub onset_rank: Option<usize>,
}

impl Analysis {
    /// The evaluated ranks in order.
    pub fn ranks(&self) -> impl Iterator<Item = usize> + '_ {
        self.metrics.iter().map(|record| record.rank)
    }

    /// Rank `rank` reconstruction of the analysed image.
    pub fn reconstruct(&self, rank: usize) -> Result<Array2<f64>> {
        self.svd.reconstruct(rank)
    }

    /// Score a single, possibly unscheduled, rank of the analysed image.
    pub fn evaluate(&self, image: &Image, rank: usize) -> Result<MetricsRecord> {
        let reconstruction = self.svd.reconstruct(rank)?;
        Ok(metrics::compute(image, reconstruction.view(), rank))
    }
}

pub struct Pipeline<B: SvdBackend = DivideAndConquer> {
    params: AnalysisParams,
    backend: B,
}

impl Pipeline {
    pub fn new(params: AnalysisParams) -> Self {
        Pipeline::with_backend(params, DivideAndConquer)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(AnalysisParams::default())
    }
}

impl<B: SvdBackend> Pipeline<B> {
    pub fn with_backend(params: AnalysisParams, backend: B) -> Self {
        Pipeline { params, backend }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Decompose `image` and evaluate every scheduled rank.
    ///
    /// Any failure aborts the whole run.
    pub fn run(&self, image: &Image) -> Result<Analysis> {
        let svd = image.compute_svd_with(&self.backend)?;
        let ranks = self.params.rank_schedule().ranks(svd.max_rank());

        debug!(
            "Evaluating ranks {:?} of a {}x{} image",
            ranks,
            image.height(),
            image.width()
        );

        let mut records = Vec::with_capacity(ranks.len());
        for item in svd.progressive(ranks) {
            let (rank, reconstruction) = item?;
            let record = metrics::compute(image, reconstruction.view(), rank);

            debug!(
                "Rank {}: max error {:.3}, mean error {:.3}, compression {:?}",
                record.rank,
                record.max_absolute_error,
                record.mean_absolute_error,
                record.compression_ratio
            );

            records.push(record);
        }

        let onset_rank = self
            .params
            .threshold_finder()
            .find_negative_compression_onset(image);

        Ok(Analysis {
            svd,
            metrics: records,
            onset_rank,
        })
    }
}
