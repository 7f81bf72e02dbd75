//! Error and storage statistics of a rank-k reconstruction.
//!
//! Storing a rank-k approximation of an $m\times n$ image takes $km$ numbers for the
//! columns of $U$, $k$ singular values and $kn$ numbers for the rows of $V^T$. The
//! compression ratio compares this against the $mn$ raw pixels,
//! $1 - k(m + n + 1) / (mn)$. A negative ratio is not a saving at all and is
//! reported as [`CompressionRatio::NotApplicable`].

use crate::helpers::RelDiff;
use crate::pgm::Image;
use ndarray::ArrayView2;

/// Storage saving of a truncated representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompressionRatio {
    /// Fraction of storage saved, in `[0, 1]`
    Ratio(f64),
    /// The truncated factors take more space than the raw pixels
    NotApplicable,
}

impl CompressionRatio {
    /// Compression ratio of a rank `rank` approximation of a `(height, width)` image.
    pub fn for_rank(rank: usize, height: usize, width: usize) -> Self {
        if is_negative_compression(rank, height, width) {
            CompressionRatio::NotApplicable
        } else {
            CompressionRatio::Ratio(compression_ratio(rank, height, width))
        }
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            CompressionRatio::Ratio(ratio) => Some(ratio),
            CompressionRatio::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        self.value().is_some()
    }
}

/// Number of values needed to store a rank `rank` approximation.
pub fn storage_cost(rank: usize, height: usize, width: usize) -> usize {
    rank * height + rank + rank * width
}

/// The signed compression ratio $1 - k(m + n + 1) / (mn)$.
pub fn compression_ratio(rank: usize, height: usize, width: usize) -> f64 {
    1.0 - storage_cost(rank, height, width) as f64 / (height * width) as f64
}

/// Whether the rank `rank` factors cost more than the raw image.
///
/// Evaluated in integers so the sign never depends on rounding.
pub fn is_negative_compression(rank: usize, height: usize, width: usize) -> bool {
    storage_cost(rank, height, width) > height * width
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricsRecord {
    /// Number of retained singular components
    pub rank: usize,
    /// Largest absolute pixel error
    pub max_absolute_error: f64,
    /// Mean absolute pixel error
    pub mean_absolute_error: f64,
    /// Relative Frobenius norm error
    pub relative_error: f64,
    pub compression_ratio: CompressionRatio,
}

/// Score `reconstruction` against the pixels of `image`.
///
/// # Panics
///
/// If the reconstruction does not have the shape of the image.
pub fn compute(image: &Image, reconstruction: ArrayView2<f64>, rank: usize) -> MetricsRecord {
    assert_eq!(
        reconstruction.dim(),
        image.pixels().dim(),
        "Reconstruction must have the shape of the image"
    );

    let (max_err, sum_err) = image
        .pixels()
        .iter()
        .zip(reconstruction.iter())
        .map(|(&pixel, &approx)| (f64::from(pixel) - approx).abs())
        .fold((0.0f64, 0.0f64), |(max, sum), err| (max.max(err), sum + err));

    let original = image.to_matrix();

    MetricsRecord {
        rank,
        max_absolute_error: max_err,
        mean_absolute_error: sum_err / reconstruction.len() as f64,
        relative_error: f64::rel_diff_fro(reconstruction, original.view()),
        compression_ratio: CompressionRatio::for_rank(rank, image.height(), image.width()),
    }
}
