//! Wrap the SVD computation and normalize its output.
//!
//! The numerical work is delegated to a [`SvdBackend`]. Backends may return thin or full
//! factors in any singular value order; [`decompose_with`] turns them into a full
//! decomposition with non-increasing singular values, square orthogonal `u` and `vt`.

use crate::pgm::Image;
use crate::svd::SVD;
use crate::types::{ImageCompressionError, Result};
use log::debug;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use ndarray_linalg::{JobSvd, SVDDCInto, QR, SVD as LapackSVD};

/// Factors as returned by a backend, possibly thin and unsorted.
pub struct RawFactors {
    pub u: Array2<f64>,
    pub s: Array1<f64>,
    pub vt: Array2<f64>,
}

/// A numerical routine computing $A = U\Sigma V^T$.
pub trait SvdBackend {
    fn factorize(&self, mat: ArrayView2<f64>) -> Result<RawFactors>;
}

/// LAPACK divide and conquer (`gesdd`) computing the full factors.
#[derive(Clone, Copy, Debug, Default)]
pub struct DivideAndConquer;

/// LAPACK QR iteration (`gesvd`) computing the full factors.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrIteration;

/// LAPACK divide and conquer computing only the thin factors.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThinDivideAndConquer;

fn lapack_error(err: ndarray_linalg::error::LinalgError) -> ImageCompressionError {
    ImageCompressionError::NumericalError(err.to_string())
}

fn unpack(
    (u, s, vt): (Option<Array2<f64>>, Array1<f64>, Option<Array2<f64>>),
) -> Result<RawFactors> {
    match (u, vt) {
        (Some(u), Some(vt)) => Ok(RawFactors { u, s, vt }),
        _ => Err(ImageCompressionError::NumericalError(
            "backend did not return singular vectors".to_string(),
        )),
    }
}

impl SvdBackend for DivideAndConquer {
    fn factorize(&self, mat: ArrayView2<f64>) -> Result<RawFactors> {
        unpack(mat.to_owned().svddc_into(JobSvd::All).map_err(lapack_error)?)
    }
}

impl SvdBackend for QrIteration {
    fn factorize(&self, mat: ArrayView2<f64>) -> Result<RawFactors> {
        unpack(mat.svd(true, true).map_err(lapack_error)?)
    }
}

impl SvdBackend for ThinDivideAndConquer {
    fn factorize(&self, mat: ArrayView2<f64>) -> Result<RawFactors> {
        unpack(mat.to_owned().svddc_into(JobSvd::Some).map_err(lapack_error)?)
    }
}

pub trait ComputeSVD {
    /// Compute the full SVD with the default backend.
    fn compute_svd(&self) -> Result<SVD> {
        self.compute_svd_with(&DivideAndConquer)
    }

    /// Compute the full SVD with the given backend.
    fn compute_svd_with<B: SvdBackend>(&self, backend: &B) -> Result<SVD>;
}

impl<S> ComputeSVD for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn compute_svd_with<B: SvdBackend>(&self, backend: &B) -> Result<SVD> {
        decompose_with(self.view(), backend)
    }
}

impl ComputeSVD for Image {
    fn compute_svd_with<B: SvdBackend>(&self, backend: &B) -> Result<SVD> {
        decompose_with(self.to_matrix().view(), backend)
    }
}

/// Decompose the pixel matrix of an image with the default backend.
pub fn decompose(image: &Image) -> Result<SVD> {
    image.compute_svd()
}

/// Run `backend` on `mat` and normalize the result to a full, sorted decomposition.
pub fn decompose_with<B: SvdBackend>(mat: ArrayView2<f64>, backend: &B) -> Result<SVD> {
    if let Some(index) = mat.iter().position(|item| !item.is_finite()) {
        return Err(ImageCompressionError::NumericalError(format!(
            "non-finite input value at position {}",
            index
        )));
    }

    let (m, n) = mat.dim();
    let RawFactors { u, s, vt } = backend.factorize(mat)?;

    check_factors(&u, &s, &vt, m, n)?;
    let (u, s, vt) = sort_descending(u, s, vt);
    let u = complete_orthonormal_columns(u)?;
    let vt = complete_orthonormal_columns(vt.reversed_axes())?.reversed_axes();

    debug!(
        "SVD of {}x{} matrix, leading singular value {:e}",
        m,
        n,
        s.get(0).copied().unwrap_or(0.0)
    );

    Ok(SVD { u, s, vt })
}

fn check_factors(
    u: &Array2<f64>,
    s: &Array1<f64>,
    vt: &Array2<f64>,
    m: usize,
    n: usize,
) -> Result<()> {
    let k = m.min(n);

    let shapes_ok = s.len() == k
        && u.nrows() == m
        && (u.ncols() == k || u.ncols() == m)
        && vt.ncols() == n
        && (vt.nrows() == k || vt.nrows() == n);

    if !shapes_ok {
        return Err(ImageCompressionError::NumericalError(format!(
            "factor shapes {:?}, {}, {:?} do not match a {}x{} matrix",
            u.dim(),
            s.len(),
            vt.dim(),
            m,
            n
        )));
    }

    let finite = u.iter().chain(s.iter()).chain(vt.iter()).all(|item| item.is_finite());
    if !finite || s.iter().any(|&sigma| sigma < 0.0) {
        return Err(ImageCompressionError::NumericalError(
            "backend returned invalid factors".to_string(),
        ));
    }

    Ok(())
}

/// Reorder the singular triplets so that the singular values are non-increasing.
fn sort_descending(
    u: Array2<f64>,
    s: Array1<f64>,
    vt: Array2<f64>,
) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
    if s.windows(2).into_iter().all(|pair| pair[0] >= pair[1]) {
        return (u, s, vt);
    }

    let k = s.len();
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&first, &second| s[second].total_cmp(&s[first]));

    let u_order: Vec<usize> = order.iter().copied().chain(k..u.ncols()).collect();
    let vt_order: Vec<usize> = order.iter().copied().chain(k..vt.nrows()).collect();

    (
        u.select(Axis(1), &u_order),
        s.select(Axis(0), &order),
        vt.select(Axis(0), &vt_order),
    )
}

/// Extend a matrix with orthonormal columns to a square orthogonal matrix.
///
/// The Householder QR decomposition of `[Q | I]` spans the full space and its
/// first columns agree with those of `Q` up to sign, so the trailing columns form
/// an orthonormal basis of the complement.
fn complete_orthonormal_columns(q: Array2<f64>) -> Result<Array2<f64>> {
    let (m, r) = q.dim();
    if r == m {
        return Ok(q);
    }

    let identity = Array2::<f64>::eye(m);
    let stacked = ndarray::concatenate(Axis(1), &[q.view(), identity.view()])
        .map_err(|err| ImageCompressionError::NumericalError(err.to_string()))?;

    let (mut basis, _) = stacked.qr().map_err(lapack_error)?;
    basis.slice_mut(s![.., 0..r]).assign(&q);

    Ok(basis)
}
