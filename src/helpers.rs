//! Small numerical helpers shared by the other modules.

use itertools::{Itertools, MinMaxResult};
use ndarray::{Array2, ArrayView2};
use ndarray_linalg::Norm;

pub trait RelDiff {
    type A;

    /// Return the relative Frobenius norm difference of `first` and `second`.
    ///
    /// If `second` is zero the absolute Frobenius norm of `first` is returned.
    fn rel_diff_fro(first: ArrayView2<Self::A>, second: ArrayView2<Self::A>) -> Self::A;
}

macro_rules! rel_diff_impl {
    ($scalar:ty) => {
        impl RelDiff for $scalar {
            type A = $scalar;
            fn rel_diff_fro(first: ArrayView2<Self::A>, second: ArrayView2<Self::A>) -> Self::A {
                let diff = first.to_owned() - &second;
                let reference = second.norm_l2();

                if reference == 0.0 {
                    diff.norm_l2()
                } else {
                    diff.norm_l2() / reference
                }
            }
        }
    };
}

rel_diff_impl!(f32);
rel_diff_impl!(f64);

/// Linearly map the entries of `mat` onto `[0, upper]`.
///
/// A constant matrix maps to all zeros.
pub fn rescale_to_range(mat: ArrayView2<f64>, upper: f64) -> Array2<f64> {
    match mat.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::MinMax(min, max) if max > min => {
            mat.mapv(|item| upper * ((item - min) / (max - min)))
        }
        _ => Array2::zeros(mat.dim()),
    }
}

/// Scale a factor matrix to 8-bit gray levels for display.
pub fn rescale_to_gray(mat: ArrayView2<f64>) -> Array2<f64> {
    rescale_to_range(mat, 255.0)
}
