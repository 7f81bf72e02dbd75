//! The full singular value decomposition of an image and its rank-k truncations.
//!
//! For a matrix $A\in\mathbb{R}^{m\times n}$ the decomposition is $A = U\Sigma V^T$ with
//! $U\in\mathbb{R}^{m\times m}$ and $V^T\in\mathbb{R}^{n\times n}$ orthogonal and $\Sigma$ holding the
//! $\min(m, n)$ singular values $\sigma_1\geq\sigma_2\geq\dots\geq 0$ on its leading diagonal.
//! The rank-k reconstruction keeps the first k columns of $U$, the first k singular values
//! and the first k rows of $V^T$.

use crate::types::{ImageCompressionError, Result};
use ndarray::{s, Array1, Array2, Axis, Zip};
use std::ops::Range;

pub struct SVD {
    /// The U matrix, (height, height)
    pub u: Array2<f64>,
    /// The array of singular values, non-increasing
    pub s: Array1<f64>,
    /// The vt matrix, (width, width)
    pub vt: Array2<f64>,
}

impl SVD {
    /// Number of rows of the decomposed matrix
    pub fn nrows(&self) -> usize {
        self.u.nrows()
    }

    /// Number of columns of the decomposed matrix
    pub fn ncols(&self) -> usize {
        self.vt.ncols()
    }

    /// Largest admissible truncation rank
    pub fn max_rank(&self) -> usize {
        self.s.len()
    }

    /// Compute $U_k\Sigma_k V_k^T$.
    ///
    /// Fails with `InvalidRankError` unless `1 <= rank <= max_rank()`.
    pub fn reconstruct(&self, rank: usize) -> Result<Array2<f64>> {
        self.check_rank(rank)?;
        Ok(self.partial_product(0..rank))
    }

    /// Convert the full decomposition back to a matrix
    pub fn to_mat(&self) -> Array2<f64> {
        self.partial_product(0..self.max_rank())
    }

    /// Reconstruct at each rank of `ranks` in turn.
    ///
    /// While the ranks increase only the additional singular components are
    /// multiplied out and added to the previous reconstruction.
    pub fn progressive<I>(&self, ranks: I) -> ProgressiveReconstruction<'_, I::IntoIter>
    where
        I: IntoIterator<Item = usize>,
    {
        ProgressiveReconstruction {
            svd: self,
            ranks: ranks.into_iter(),
            current: None,
            failed: false,
        }
    }

    pub(crate) fn check_rank(&self, rank: usize) -> Result<()> {
        if rank == 0 || rank > self.max_rank() {
            Err(ImageCompressionError::InvalidRankError {
                rank,
                max_rank: self.max_rank(),
            })
        } else {
            Ok(())
        }
    }

    fn partial_product(&self, components: Range<usize>) -> Array2<f64> {
        let u = self.u.slice(s![.., components.clone()]);
        let sigma = self.s.slice(s![components.clone()]);
        let mut vt = self.vt.slice(s![components, ..]).to_owned();

        Zip::from(vt.axis_iter_mut(Axis(0)))
            .and(sigma)
            .for_each(|mut row, &sigma_elem| row.map_inplace(|item| *item *= sigma_elem));

        u.dot(&vt)
    }
}

/// Iterator over `(rank, reconstruction)` pairs, see [`SVD::progressive`].
pub struct ProgressiveReconstruction<'a, I> {
    svd: &'a SVD,
    ranks: I,
    current: Option<(usize, Array2<f64>)>,
    failed: bool,
}

impl<'a, I> Iterator for ProgressiveReconstruction<'a, I>
where
    I: Iterator<Item = usize>,
{
    type Item = Result<(usize, Array2<f64>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let rank = self.ranks.next()?;
        if let Err(err) = self.svd.check_rank(rank) {
            self.failed = true;
            return Some(Err(err));
        }

        let mat = match self.current.take() {
            Some((previous, mut mat)) if previous <= rank => {
                if previous < rank {
                    mat += &self.svd.partial_product(previous..rank);
                }
                mat
            }
            _ => self.svd.partial_product(0..rank),
        };

        self.current = Some((rank, mat.clone()));
        Some(Ok((rank, mat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_svd::ComputeSVD;
    use crate::helpers::RelDiff;
    use crate::synthetic::random_gaussian;
    use ndarray::array;

    macro_rules! full_rank_reconstruction_tests {

        ($($name:ident: $dim:expr, $tol:expr,)*) => {

            $(

        #[test]
        fn $name() {
            let mut rng = rand::thread_rng();
            let mat = random_gaussian($dim, &mut rng);

            let svd = mat.compute_svd().unwrap();
            let actual = svd.reconstruct(svd.max_rank()).unwrap();

            assert!(f64::rel_diff_fro(actual.view(), mat.view()) < $tol);
            assert!(f64::rel_diff_fro(svd.to_mat().view(), mat.view()) < $tol);
        }

            )*

        }
    }

    full_rank_reconstruction_tests! {
        test_full_rank_reconstruction_square: (40, 40), 1E-12,
        test_full_rank_reconstruction_thin: (60, 25), 1E-12,
        test_full_rank_reconstruction_thick: (25, 60), 1E-12,
    }

    #[test]
    fn test_rank_one_matrix_is_recovered_at_rank_one() {
        let col = array![1.0, 2.0, 3.0];
        let row = array![4.0, 5.0];
        let mat = Array2::from_shape_fn((3, 2), |(i, j)| col[i] * row[j]);

        let svd = mat.compute_svd().unwrap();
        let actual = svd.reconstruct(1).unwrap();

        assert!(f64::rel_diff_fro(actual.view(), mat.view()) < 1E-13);
        assert!(svd.s[1].abs() < 1E-12);
    }

    #[test]
    fn test_reconstruction_shape() {
        let mut rng = rand::thread_rng();
        let mat = random_gaussian((12, 7), &mut rng);
        let svd = mat.compute_svd().unwrap();

        for rank in 1..=7 {
            assert_eq!(svd.reconstruct(rank).unwrap().dim(), (12, 7));
        }
    }

    #[test]
    fn test_invalid_ranks() {
        let mut rng = rand::thread_rng();
        let svd = random_gaussian((5, 3), &mut rng).compute_svd().unwrap();

        for &rank in &[0, 4, 100] {
            match svd.reconstruct(rank) {
                Err(ImageCompressionError::InvalidRankError { rank: actual, max_rank }) => {
                    assert_eq!(actual, rank);
                    assert_eq!(max_rank, 3);
                }
                _ => panic!("rank {} should have been rejected", rank),
            }
        }
    }

    #[test]
    fn test_progressive_matches_direct() {
        let mut rng = rand::thread_rng();
        let mat = random_gaussian((30, 20), &mut rng);
        let svd = mat.compute_svd().unwrap();

        // Includes a repeated and a decreasing rank.
        let ranks = vec![1, 2, 5, 5, 10, 3, 20];
        let mut seen = Vec::new();

        for item in svd.progressive(ranks.clone()) {
            let (rank, actual) = item.unwrap();
            let expected = svd.reconstruct(rank).unwrap();
            assert!(f64::rel_diff_fro(actual.view(), expected.view()) < 1E-12);
            seen.push(rank);
        }

        assert_eq!(seen, ranks);
    }

    #[test]
    fn test_progressive_stops_at_invalid_rank() {
        let mut rng = rand::thread_rng();
        let svd = random_gaussian((4, 4), &mut rng).compute_svd().unwrap();

        let results: Vec<_> = svd.progressive(vec![1, 9, 2]).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(ImageCompressionError::InvalidRankError { rank: 9, max_rank: 4 })
        ));
    }
}
