// Householder QR for rectangular systems.
//
// The factored matrix satisfies `A(p,q) = QR` with Q held implicitly as
// sparse Householder vectors V and coefficients beta.  Tall systems
// solve in the least-squares sense; wide systems are handled by
// factoring the transpose, which turns the solve into a minimum-norm
// one.  The row permutation from the symbolic analysis makes V lower
// trapezoidal, padding structurally empty columns with fictitious rows
// so the factorization never fails.

use crate::algebra::*;
use crate::factor::symbolic;
use crate::factor::triangular::{ipvec, pvec, usolve, utsolve};
use crate::factor::{amd_order, ColumnOrdering, FactorizationError};
use derive_builder::Builder;

/// Settings for [`QrFactorization`]
#[derive(Builder, Debug, Clone)]
pub struct QrSettings {
    /// fill-reducing column ordering, minimizing fill in the pattern
    /// of `A'A` and hence in `R`
    #[builder(default = "ColumnOrdering::MinimumDegreeAtA")]
    pub ordering: ColumnOrdering,
}

impl Default for QrSettings {
    fn default() -> QrSettings {
        QrSettingsBuilder::default().build().unwrap()
    }
}

/// Householder QR factorization of a sparse rectangular matrix.
///
/// For a tall (or square) matrix [`solve`](QrFactorization::solve)
/// returns the least-squares solution; for a wide matrix the transpose
/// is factored instead and the same call returns the minimum-norm
/// solution of the underdetermined system.
/// [`solve_transpose`](QrFactorization::solve_transpose) exchanges the
/// two roles.  Solves take `&self` and allocate their own scratch.
pub struct QrFactorization<T = f64> {
    factors: HouseholderFactors<T>,
    m: usize,
    n: usize,
    transposed: bool,
}

impl<T> QrFactorization<T>
where
    T: FloatT,
{
    /// Factor a rectangular matrix.
    ///
    /// Rank deficiency does not fail the factorization; it surfaces as
    /// zeros on the diagonal of `R` and hence non-finite values in the
    /// corresponding solve.
    pub fn new(A: &CscMatrix<T>, settings: &QrSettings) -> Result<Self, FactorizationError> {
        let (m, n) = A.size();
        let transposed = m < n;
        let factors = if transposed {
            HouseholderFactors::factor(&A.transpose(), settings.ordering)
        } else {
            HouseholderFactors::factor(A, settings.ordering)
        };
        Ok(Self {
            factors,
            m,
            n,
            transposed,
        })
    }

    /// Solve `Ax = b` in the least-squares sense (`m >= n`) or as the
    /// minimum-norm solution of the underdetermined system (`m < n`).
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, FactorizationError> {
        if b.len() != self.m {
            return Err(FactorizationError::DimensionMismatch);
        }
        if self.transposed {
            Ok(self.factors.solve_minnorm(b))
        } else {
            Ok(self.factors.solve_leastsq(b))
        }
    }

    /// Solve `A'x = b`, least-squares for `m < n` and minimum-norm
    /// for `m >= n`.
    pub fn solve_transpose(&self, b: &[T]) -> Result<Vec<T>, FactorizationError> {
        if b.len() != self.n {
            return Err(FactorizationError::DimensionMismatch);
        }
        if self.transposed {
            Ok(self.factors.solve_leastsq(b))
        } else {
            Ok(self.factors.solve_minnorm(b))
        }
    }

    /// Total entry count of the `V` and `R` factors.
    pub fn nnz(&self) -> usize {
        self.factors.V.nnz() + self.factors.R.nnz()
    }
}

// The numeric factorization of a tall matrix: V, beta, R, the pivotal
// row order pinv and the column ordering q.  Dimensions follow the
// matrix actually factored, which is the transpose of the user's when
// that one is wide.
struct HouseholderFactors<T> {
    V: CscMatrix<T>,
    beta: Vec<T>,
    R: CscMatrix<T>,
    pinv: Vec<usize>,
    q: Option<Vec<usize>>,
    m: usize,
    n: usize,
    m2: usize,
}

impl<T> HouseholderFactors<T>
where
    T: FloatT,
{
    fn factor(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Self {
        let (m, n) = A.size();
        let q = amd_order(A, ordering);
        let permuted;
        let C = match &q {
            Some(q) => {
                permuted = A.permute(None, Some(q));
                &permuted
            }
            None => A,
        };

        // symbolic pass on the permuted matrix: column elimination
        // tree, then exact entry counts and the pivotal row order of V
        let parent = symbolic::column_etree(C);
        let vc = symbolic::vcount(C, &parent);
        let (m2, leftmost) = (vc.m2, vc.leftmost);
        let mut pinv = vc.pinv;

        let mut V = CscMatrix::spalloc(m2, n, vc.vnz);
        let mut R = CscMatrix::spalloc(m2, n, 0);
        R.reserve_nnz(C.nnz() + n);
        let mut beta = vec![T::zero(); n];

        let mut x = vec![T::zero(); m2];
        let mut w = vec![0usize; m2];
        let mut s = vec![0usize; n];

        let mut rnz = 0;
        let mut vnz = 0;
        for k in 0..n {
            R.colptr[k] = rnz;
            R.reserve_nnz(rnz + k + 1);
            V.colptr[k] = vnz;
            let p1 = vnz;
            let stamp = k + 1;

            w[k] = stamp;
            V.rowval[vnz] = k; // V(k,k) always enters the pattern
            vnz += 1;

            // pattern of R(:,k): tree paths from each entry's leftmost
            // column up to k, collected in topological order in s[top..]
            let mut top = n;
            for p in C.colptr[k]..C.colptr[k + 1] {
                let mut i = leftmost[C.rowval[p]];
                let mut len = 0;
                while w[i] != stamp {
                    s[len] = i;
                    len += 1;
                    w[i] = stamp;
                    i = parent[i];
                }
                while len > 0 {
                    top -= 1;
                    len -= 1;
                    s[top] = s[len];
                }
                let i = pinv[C.rowval[p]];
                x[i] = C.nzval[p];
                if i > k && w[i] != stamp {
                    V.rowval[vnz] = i; // pattern of V(:,k)
                    vnz += 1;
                    w[i] = stamp;
                }
            }

            for p in top..n {
                let i = s[p];
                // apply the i-th reflector, then R(i,k) is finished
                happly(&V, i, beta[i], &mut x);
                R.rowval[rnz] = i;
                R.nzval[rnz] = x[i];
                rnz += 1;
                x[i] = T::zero();
                if parent[i] == k {
                    // V(:,k) inherits the pattern of its tree child
                    for pp in V.colptr[i]..V.colptr[i + 1] {
                        let row = V.rowval[pp];
                        if w[row] != stamp {
                            w[row] = stamp;
                            V.rowval[vnz] = row;
                            vnz += 1;
                        }
                    }
                }
            }
            for p in p1..vnz {
                V.nzval[p] = x[V.rowval[p]];
                x[V.rowval[p]] = T::zero();
            }

            R.rowval[rnz] = k;
            let (betak, rkk) = house(&mut V.nzval[p1..vnz]);
            beta[k] = betak;
            R.nzval[rnz] = rkk; // R(k,k) = ||x||
            rnz += 1;
        }
        debug_assert_eq!(vnz, vc.vnz);
        R.colptr[n] = rnz;
        V.colptr[n] = vnz;
        R.trim_to_nnz();
        V.trim_to_nnz();
        pinv.truncate(m);

        Self {
            V,
            beta,
            R,
            pinv,
            q,
            m,
            n,
            m2,
        }
    }

    // least-squares solve through Q'b: takes length m, returns length n
    fn solve_leastsq(&self, b: &[T]) -> Vec<T> {
        let mut x = vec![T::zero(); self.m2];
        ipvec(&self.pinv, b, &mut x);
        for k in 0..self.n {
            happly(&self.V, k, self.beta[k], &mut x);
        }
        usolve(&self.R, &mut x);

        match &self.q {
            Some(q) => {
                let mut out = vec![T::zero(); self.n];
                ipvec(q, &x[..self.n], &mut out);
                out
            }
            None => x[..self.n].to_vec(),
        }
    }

    // minimum-norm solve of the transposed system: takes length n,
    // returns length m
    fn solve_minnorm(&self, b: &[T]) -> Vec<T> {
        let mut x = vec![T::zero(); self.m2];
        match &self.q {
            Some(q) => pvec(q, b, &mut x[..self.n]),
            None => {
                x[..self.n].copy_from(b);
            }
        }
        utsolve(&self.R, &mut x);
        for k in (0..self.n).rev() {
            happly(&self.V, k, self.beta[k], &mut x);
        }

        let mut out = vec![T::zero(); self.m];
        pvec(&self.pinv, &x, &mut out);
        out
    }
}

/// Apply the elementary reflector `(V(:,i), beta)` to a dense vector,
/// `x -= beta * V(:,i) * (V(:,i)' x)`.
fn happly<T: FloatT>(V: &CscMatrix<T>, i: usize, beta: T, x: &mut [T]) {
    let mut tau = T::zero();
    for p in V.colptr[i]..V.colptr[i + 1] {
        tau += V.nzval[p].conj() * x[V.rowval[p]];
    }
    tau *= beta;
    for p in V.colptr[i]..V.colptr[i + 1] {
        x[V.rowval[p]] -= tau * V.nzval[p];
    }
}

/// Build an elementary reflector in place from the dense column held in
/// `x`, normalized so its leading entry is implicitly reconstructible.
/// Returns `(beta, s)` where `s = ||x||` becomes the diagonal of `R`,
/// with the sign convention that keeps the computation cancellation
/// free.
fn house<T: FloatT>(x: &mut [T]) -> (T, T) {
    let mut sigma = T::zero();
    for &xi in &x[1..] {
        sigma += xi * xi;
    }
    let x0 = x[0];
    if sigma == T::zero() {
        // already a multiple of e1; reflect only to fix the sign
        let s = T::abs(x0);
        let beta = if x0 <= T::zero() { (2.0).as_T() } else { T::zero() };
        x[0] = T::one();
        (beta, s)
    } else {
        let s = T::sqrt(x0 * x0 + sigma);
        x[0] = if x0 <= T::zero() {
            x0 - s
        } else {
            -sigma / (x0 + s)
        };
        let beta = -T::one() / (s * x[0]);
        (beta, s)
    }
}

// ---------------------------------------------------------------------
