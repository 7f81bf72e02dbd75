//! Collect all traits and other exports here.

pub use crate::compute_svd::{
    decompose, decompose_with, ComputeSVD, DivideAndConquer, QrIteration, RawFactors, SvdBackend,
    ThinDivideAndConquer,
};
pub use crate::helpers::*;
pub use crate::metrics::{compression_ratio, CompressionRatio, MetricsRecord};
pub use crate::params::AnalysisParams;
pub use crate::pgm::{decode, decode_file, encode, Image};
pub use crate::pipeline::{Analysis, Pipeline};
pub use crate::rank_schedule::RankSchedule;
pub use crate::svd::{ProgressiveReconstruction, SVD};
pub use crate::threshold::ThresholdFinder;
pub use crate::types::ImageCompressionError;
