// Dense-RHS triangular substitution kernels and permutation helpers
// shared by the factorization engines.
//
// Storage conventions here are fixed by the factorization routines:
// lower triangular factors carry their diagonal entry first in each
// column, upper triangular factors carry it last.  All kernels modify
// the right hand side in place.

use crate::algebra::*;
use crate::factor::FactorizationError;

/// Solve `Lx = b` where `b` is overwritten by the solution.
pub(crate) fn lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for j in 0..L.n {
        x[j] /= L.nzval[L.colptr[j]];
        for p in (L.colptr[j] + 1)..L.colptr[j + 1] {
            x[L.rowval[p]] -= L.nzval[p] * x[j];
        }
    }
}

/// Solve `L'x = b` in place, conjugating the factor entries.
pub(crate) fn ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for j in (0..L.n).rev() {
        for p in (L.colptr[j] + 1)..L.colptr[j + 1] {
            x[j] -= L.nzval[p].conj() * x[L.rowval[p]];
        }
        x[j] /= L.nzval[L.colptr[j]].conj();
    }
}

/// Solve `Ux = b` in place.
pub(crate) fn usolve<T: FloatT>(U: &CscMatrix<T>, x: &mut [T]) {
    for j in (0..U.n).rev() {
        x[j] /= U.nzval[U.colptr[j + 1] - 1];
        for p in U.colptr[j]..(U.colptr[j + 1] - 1) {
            x[U.rowval[p]] -= U.nzval[p] * x[j];
        }
    }
}

/// Solve `U'x = b` in place, conjugating the factor entries.
pub(crate) fn utsolve<T: FloatT>(U: &CscMatrix<T>, x: &mut [T]) {
    for j in 0..U.n {
        for p in U.colptr[j]..(U.colptr[j + 1] - 1) {
            x[j] -= U.nzval[p].conj() * x[U.rowval[p]];
        }
        x[j] /= U.nzval[U.colptr[j + 1] - 1].conj();
    }
}

/// Permute `x = b(p)`, i.e. `x[k] = b[p[k]]`.
pub(crate) fn pvec<T: FloatT>(p: &[usize], b: &[T], x: &mut [T]) {
    for k in 0..p.len() {
        x[k] = b[p[k]];
    }
}

/// Inverse-permute `x(p) = b`, i.e. `x[p[k]] = b[k]`.
pub(crate) fn ipvec<T: FloatT>(p: &[usize], b: &[T], x: &mut [T]) {
    for k in 0..p.len() {
        x[p[k]] = b[k];
    }
}

/// Invert a permutation vector, verifying that it is a bijection
/// on `0..p.len()`.
pub(crate) fn invperm(p: &[usize]) -> Result<Vec<usize>, FactorizationError> {
    let mut out = vec![usize::MAX; p.len()];
    for (i, &j) in p.iter().enumerate() {
        if j >= p.len() || out[j] != usize::MAX {
            return Err(FactorizationError::InvalidPermutation);
        }
        out[j] = i;
    }
    Ok(out)
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::*;

    // L =
    //[ 2.0   ⋅    ⋅ ]
    //[ 1.0  4.0   ⋅ ]
    //[  ⋅   3.0  5.0]
    fn test_L() -> CscMatrix<f64> {
        CscMatrix::new(
            3,
            3,
            vec![0, 2, 4, 5],
            vec![0, 1, 1, 2, 2],
            vec![2., 1., 4., 3., 5.],
        )
    }

    #[test]
    fn test_lsolve_ltsolve() {
        let L = test_L();

        // b chosen so Lx = b has x = [1, 2, 3]
        let mut x = vec![2., 9., 21.];
        lsolve(&L, &mut x);
        assert!(x.norm_inf_diff(&[1., 2., 3.]) < 1e-14);

        // L'x = b with x = [1, 2, 3]
        let mut x = vec![4., 17., 15.];
        ltsolve(&L, &mut x);
        assert!(x.norm_inf_diff(&[1., 2., 3.]) < 1e-14);
    }

    #[test]
    fn test_usolve_utsolve() {
        // U = L' explicitly, with diagonals last in each column
        let U = CscMatrix::new(
            3,
            3,
            vec![0, 1, 3, 5],
            vec![0, 0, 1, 1, 2],
            vec![2., 1., 4., 3., 5.],
        );

        let mut x = vec![4., 17., 15.];
        usolve(&U, &mut x);
        assert!(x.norm_inf_diff(&[1., 2., 3.]) < 1e-14);

        let mut x = vec![2., 9., 21.];
        utsolve(&U, &mut x);
        assert!(x.norm_inf_diff(&[1., 2., 3.]) < 1e-14);
    }

    #[test]
    fn test_pvec_ipvec() {
        let p = vec![2, 0, 1];
        let b = vec![10., 20., 30.];

        let mut x = vec![0.; 3];
        pvec(&p, &b, &mut x);
        assert_eq!(x, [30., 10., 20.]);

        let mut y = vec![0.; 3];
        ipvec(&p, &x, &mut y);
        assert_eq!(y, b);
    }

    #[test]
    fn test_invperm() {
        let p = vec![2, 0, 1];
        assert_eq!(invperm(&p).unwrap(), vec![1, 2, 0]);

        assert!(invperm(&[0, 0, 1]).is_err());
        assert!(invperm(&[0, 1, 3]).is_err());
    }
}
