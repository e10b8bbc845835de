// Cholesky factorization for symmetric positive definite systems.
//
// The input's upper triangle is taken as the definition of the matrix,
// permuted symmetrically by the fill-reducing ordering, and analyzed
// once with the elimination tree to size every column of L exactly.
// The numeric phase is up-looking: row k of L is produced by a sparse
// triangular solve whose pattern is the tree reach of column k.

use crate::algebra::*;
use crate::factor::triangular::{invperm, ipvec, lsolve, ltsolve, pvec};
use crate::factor::{amd_order, symbolic, ColumnOrdering, FactorizationError};
use derive_builder::Builder;

/// Settings for [`CholeskyFactorization`]
#[derive(Builder, Debug, Clone)]
pub struct CholeskySettings {
    /// fill-reducing ordering, applied symmetrically
    #[builder(default = "ColumnOrdering::MinimumDegreeAtPlusA")]
    pub ordering: ColumnOrdering,
}

impl Default for CholeskySettings {
    fn default() -> CholeskySettings {
        CholeskySettingsBuilder::default().build().unwrap()
    }
}

/// Cholesky factorization `PAP' = LL'` of a sparse symmetric positive
/// definite matrix.
///
/// Only the upper triangle of the input is referenced; entries below
/// the diagonal are ignored rather than checked for symmetry.  Solves
/// take `&self` and allocate their own scratch.
pub struct CholeskyFactorization<T = f64> {
    L: CscMatrix<T>,
    iperm: Option<Vec<usize>>,
    n: usize,
}

impl<T> CholeskyFactorization<T>
where
    T: FloatT,
{
    /// Factor a symmetric positive definite matrix.
    ///
    /// Returns [`FactorizationError::NotPositiveDefinite`] if any
    /// pivot fails to be strictly positive and finite, and
    /// [`FactorizationError::DimensionMismatch`] if the matrix is
    /// not square.
    pub fn new(
        A: &CscMatrix<T>,
        settings: &CholeskySettings,
    ) -> Result<Self, FactorizationError> {
        if !A.is_square() {
            return Err(FactorizationError::DimensionMismatch);
        }
        let n = A.n;

        let triu = A.to_triu();
        let (C, iperm) = match amd_order(A, settings.ordering) {
            Some(p) => {
                let iperm = invperm(&p)?;
                (triu.symperm(&iperm), Some(iperm))
            }
            None => (triu, None),
        };

        // symbolic pass: exact column counts, so L never reallocates
        let (parent, Lnz) = symbolic::etree_counts(&C);
        let lnz = n + Lnz.iter().sum::<usize>();
        let mut L = CscMatrix::spalloc(n, n, lnz);
        L.colptr[0] = 0;
        for k in 0..n {
            L.colptr[k + 1] = L.colptr[k] + Lnz[k] + 1;
        }

        // next free slot in each column of L
        let mut head: Vec<usize> = L.colptr[0..n].to_vec();
        let mut x = vec![T::zero(); n];
        let mut s = vec![0usize; n];
        let mut w = vec![0usize; n];

        for k in 0..n {
            // pattern of row k of L, as the tree reach of column k
            let top = symbolic::ereach(&C, k, &parent, &mut s, &mut w);

            x[k] = T::zero();
            for p in C.colptr[k]..C.colptr[k + 1] {
                x[C.rowval[p]] = C.nzval[p];
            }
            let mut d = x[k];
            x[k] = T::zero();

            for &i in &s[top..n] {
                let lki = x[i] / L.nzval[L.colptr[i]];
                x[i] = T::zero();
                for p in (L.colptr[i] + 1)..head[i] {
                    x[L.rowval[p]] -= L.nzval[p] * lki;
                }
                d -= lki * lki;
                L.rowval[head[i]] = k;
                L.nzval[head[i]] = lki;
                head[i] += 1;
            }
            if !(d > T::zero() && d.is_finite()) {
                return Err(FactorizationError::NotPositiveDefinite);
            }
            L.rowval[head[k]] = k;
            L.nzval[head[k]] = T::sqrt(d);
            head[k] += 1;
        }

        Ok(Self { L, iperm, n })
    }

    /// Solve `Ax = b`, returning the solution.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, FactorizationError> {
        if b.len() != self.n {
            return Err(FactorizationError::DimensionMismatch);
        }
        match &self.iperm {
            Some(iperm) => {
                let mut x = vec![T::zero(); self.n];
                ipvec(iperm, b, &mut x);
                lsolve(&self.L, &mut x);
                ltsolve(&self.L, &mut x);
                let mut out = vec![T::zero(); self.n];
                pvec(iperm, &x, &mut out);
                Ok(out)
            }
            None => {
                let mut x = b.to_vec();
                lsolve(&self.L, &mut x);
                ltsolve(&self.L, &mut x);
                Ok(x)
            }
        }
    }

    /// Solve `A'x = b`.  The matrix is symmetric, so this is
    /// [`solve`](CholeskyFactorization::solve).
    pub fn solve_transpose(&self, b: &[T]) -> Result<Vec<T>, FactorizationError> {
        self.solve(b)
    }

    /// Entry count of the factor `L`.
    pub fn nnz(&self) -> usize {
        self.L.nnz()
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn residual_inf<T: FloatT>(A: &CscMatrix<T>, x: &[T], b: &[T]) -> T {
        let mut r = b.to_vec();
        A.gemv(&mut r, x, T::one(), -T::one());
        r.norm_inf()
    }

    // diagonally dominant, so positive definite
    fn spd_matrix() -> CscMatrix<f64> {
        CscMatrix::from_dense(&vec![
            vec![10., 1., 0., 2.],
            vec![1., 8., 3., 0.],
            vec![0., 3., 9., 1.],
            vec![2., 0., 1., 7.],
        ])
    }

    #[test]
    fn test_cholesky_solve() {
        let A = spd_matrix();
        let b = vec![1., -2., 4., 0.];

        let chol = CholeskyFactorization::new(&A, &CholeskySettings::default()).unwrap();
        let x = chol.solve(&b).unwrap();
        assert!(residual_inf(&A, &x, &b) < 1e-12);

        // symmetric, so the transposed solve is the same solution
        let xt = chol.solve_transpose(&b).unwrap();
        assert!(x.norm_inf_diff(&xt) < 1e-15);
    }

    #[test]
    fn test_cholesky_orderings_agree() {
        let A = spd_matrix();
        let b = vec![3., 1., 4., 1.];

        let natural = CholeskySettingsBuilder::default()
            .ordering(ColumnOrdering::Natural)
            .build()
            .unwrap();

        let x1 = CholeskyFactorization::new(&A, &CholeskySettings::default())
            .unwrap()
            .solve(&b)
            .unwrap();
        let x2 = CholeskyFactorization::new(&A, &natural)
            .unwrap()
            .solve(&b)
            .unwrap();
        assert!(x1.norm_inf_diff(&x2) < 1e-12);
    }

    #[test]
    fn test_cholesky_tridiagonal_nnz() {
        // no fill in natural order: L keeps the tridiagonal profile
        let n = 6;
        let mut rows = vec![0];
        let mut cols = vec![0];
        let mut vals = vec![2.];
        for j in 1..n {
            rows.extend([j - 1, j, j]);
            cols.extend([j, j - 1, j]);
            vals.extend([-1., -1., 2.]);
        }
        let A = CscMatrix::from_triplets(n, n, &rows, &cols, &vals);

        let natural = CholeskySettingsBuilder::default()
            .ordering(ColumnOrdering::Natural)
            .build()
            .unwrap();
        let chol = CholeskyFactorization::new(&A, &natural).unwrap();
        assert_eq!(chol.nnz(), 2 * n - 1);
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let A = CscMatrix::from_dense(&vec![vec![1., 2.], vec![2., 1.]]);
        assert!(matches!(
            CholeskyFactorization::new(&A, &CholeskySettings::default()),
            Err(FactorizationError::NotPositiveDefinite)
        ));

        // zero diagonal entry
        let A = CscMatrix::from_dense(&vec![vec![1., 0.], vec![0., 0.]]);
        assert!(matches!(
            CholeskyFactorization::new(&A, &CholeskySettings::default()),
            Err(FactorizationError::NotPositiveDefinite)
        ));
    }

    #[test]
    fn test_cholesky_shape_errors() {
        let A = CscMatrix::<f64>::spalloc(2, 3, 0);
        assert!(matches!(
            CholeskyFactorization::new(&A, &CholeskySettings::default()),
            Err(FactorizationError::DimensionMismatch)
        ));

        let A = CscMatrix::<f64>::identity(3);
        let chol = CholeskyFactorization::new(&A, &CholeskySettings::default()).unwrap();
        assert!(matches!(
            chol.solve(&[1.]),
            Err(FactorizationError::DimensionMismatch)
        ));
    }

    #[test]
    fn test_cholesky_empty() {
        let A = CscMatrix::<f64>::spalloc(0, 0, 0);
        let chol = CholeskyFactorization::new(&A, &CholeskySettings::default()).unwrap();
        assert_eq!(chol.solve(&[]).unwrap(), Vec::<f64>::new());
        assert_eq!(chol.nnz(), 0);
    }
}
