//! Low-rank approximation analysis of grayscale images.
//!
//! An image is read from a raw PGM buffer, its pixel matrix is decomposed by a full
//! singular value decomposition and truncated reconstructions are scored against the
//! original: maximum and mean absolute pixel error, relative Frobenius error and the
//! storage saved by keeping only the leading singular triplets.

pub mod compute_svd;
pub mod helpers;
pub mod metrics;
pub mod params;
pub mod pgm;
pub mod pipeline;
pub mod prelude;
pub mod rank_schedule;
pub mod svd;
pub mod synthetic;
pub mod threshold;
pub mod types;

pub use compute_svd::{ComputeSVD, DivideAndConquer, QrIteration, SvdBackend, ThinDivideAndConquer};
pub use helpers::RelDiff;
pub use metrics::{CompressionRatio, MetricsRecord};
pub use params::AnalysisParams;
pub use pgm::Image;
pub use pipeline::{Analysis, Pipeline};
pub use rank_schedule::RankSchedule;
pub use svd::SVD;
pub use threshold::ThresholdFinder;
pub use types::{ImageCompressionError, Result};
