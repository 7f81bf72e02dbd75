//! Generation of synthetic grayscale images.

use crate::helpers::rescale_to_range;
use crate::pgm::Image;
use crate::types::{ImageCompressionError, Result};
use ndarray::{Array, Array2};
use ndarray_linalg::{JobSvd, SVDDCInto};
use rand::Rng;
use rand_distr::StandardNormal;

/// Generate a random Gaussian matrix.
///
/// # Arguments
///
/// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
/// * `rng`: The random number generator to use.
pub fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<f64> {
    let mut mat = Array2::<f64>::zeros(dimension);
    mat.map_inplace(|item| *item = rng.sample(StandardNormal));
    mat
}

/// Generate a random matrix with orthonormal columns or rows.
///
/// If m > n the returned matrix has orthonormal columns. If n > m
/// the returned matrix has orthonormal rows.
pub fn random_orthogonal_matrix<R: Rng>(
    dimension: (usize, usize),
    rng: &mut R,
) -> Result<Array2<f64>> {
    let (mut m, mut n) = dimension;

    // Always orthogonalize a long and skinny matrix
    if n > m {
        std::mem::swap(&mut m, &mut n);
    }

    let (u, _, _) = random_gaussian((m, n), rng)
        .svddc_into(JobSvd::Some)
        .map_err(|err| ImageCompressionError::NumericalError(err.to_string()))?;
    let u = u.ok_or_else(|| {
        ImageCompressionError::NumericalError("SVD did not return `u`".to_string())
    })?;

    if dimension.1 > dimension.0 {
        Ok(u.reversed_axes())
    } else {
        Ok(u)
    }
}

/// Generate an image whose pixel matrix is close to a given rank.
///
/// A rank `rank` matrix with singular values logarithmically distributed in
/// `[1E-2, 1]` is rescaled onto `[0, max_value]` and quantized. Rescaling adds
/// a constant offset, so the exact rank of the result is at most `rank + 1`
/// before quantization.
pub fn random_low_rank_image<R: Rng>(
    dimension: (usize, usize),
    rank: usize,
    max_value: u16,
    rng: &mut R,
) -> Result<Image> {
    let (m, n) = dimension;
    assert!(
        rank >= 1 && rank <= m.min(n),
        "`rank` must be between 1 and min(rows, cols)"
    );

    let u = random_orthogonal_matrix((m, rank), rng)?;
    let vt = random_orthogonal_matrix((rank, n), rng)?;
    let singvals = Array::geomspace(1E-2, 1.0, rank)
        .ok_or_else(|| ImageCompressionError::NumericalError("invalid spectrum".to_string()))?;
    let sigma = Array2::from_diag(&singvals);

    let mat = u.dot(&sigma.dot(&vt));
    Image::from_matrix(
        rescale_to_range(mat.view(), f64::from(max_value)).view(),
        max_value,
    )
}

/// Generate an image of uniformly distributed noise.
pub fn random_noise_image<R: Rng>(
    dimension: (usize, usize),
    max_value: u16,
    rng: &mut R,
) -> Result<Image> {
    let pixels = Array2::from_shape_simple_fn(dimension, || rng.gen_range(0..=max_value));
    Image::new(pixels, max_value)
}

/// Generate an image made of constant square blocks along the diagonal.
///
/// Block `i` has side `block` and intensity `levels[i]`; everything else is zero.
/// With distinct levels the singular vectors are the block indicators, so the
/// rank-k reconstruction recovers exactly the k brightest blocks.
pub fn diagonal_blocks_image(block: usize, levels: &[u16], max_value: u16) -> Result<Image> {
    let side = block * levels.len();
    let pixels = Array2::from_shape_fn((side, side), |(i, j)| {
        if i / block == j / block {
            levels[i / block]
        } else {
            0
        }
    });
    Image::new(pixels, max_value)
}
