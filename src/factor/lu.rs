// LU factorization with partial pivoting for square systems.
//
// Left-looking over columns: each column of the factors comes from a
// sparse triangular solve against the L built so far, with the nonzero
// pattern found by depth-first search from the column's entries and the
// numeric update applied in topological order.  The pivot is the entry
// of largest magnitude among the rows not yet pivotal, with the
// diagonal preferred when it is within `pivot_tolerance` of that bound.

use crate::algebra::*;
use crate::factor::symbolic::NONE;
use crate::factor::triangular::{ipvec, lsolve, ltsolve, pvec, usolve, utsolve};
use crate::factor::{amd_order, ColumnOrdering, FactorizationError};
use derive_builder::Builder;

/// Settings for [`LuFactorization`]
#[derive(Builder, Debug, Clone)]
pub struct LuSettings<T: FloatT> {
    /// fill-reducing column ordering
    #[builder(default = "ColumnOrdering::MinimumDegreeAtPlusA")]
    pub ordering: ColumnOrdering,

    /// partial pivoting threshold in (0, 1].  The column diagonal is
    /// kept as the pivot whenever its magnitude is at least
    /// `pivot_tolerance` times the best magnitude in the column; at the
    /// default of one this is strict partial pivoting with a diagonal
    /// preference on ties.
    #[builder(default = "T::one()")]
    pub pivot_tolerance: T,
}

impl<T: FloatT> Default for LuSettings<T> {
    fn default() -> LuSettings<T> {
        LuSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// LU factorization `PAQ = LU` of a square sparse matrix.
///
/// `L` is unit lower triangular and `U` upper triangular.  `P` is the
/// row permutation chosen by partial pivoting and `Q` the fill-reducing
/// column ordering.  Solves take `&self` and allocate their own
/// scratch, so a factorization may serve several threads at once.
pub struct LuFactorization<T = f64> {
    L: CscMatrix<T>,
    U: CscMatrix<T>,
    pinv: Vec<usize>,
    q: Option<Vec<usize>>,
    n: usize,
}

impl<T> LuFactorization<T>
where
    T: FloatT,
{
    /// Factor a square matrix.
    ///
    /// Returns [`FactorizationError::SingularMatrix`] if no usable
    /// pivot exists in some column, and
    /// [`FactorizationError::DimensionMismatch`] if the matrix is
    /// not square.
    pub fn new(A: &CscMatrix<T>, settings: &LuSettings<T>) -> Result<Self, FactorizationError> {
        if !A.is_square() {
            return Err(FactorizationError::DimensionMismatch);
        }
        let n = A.n;
        let q = amd_order(A, settings.ordering);

        let mut L = CscMatrix::spalloc(n, n, 0);
        let mut U = CscMatrix::spalloc(n, n, 0);
        L.reserve_nnz(4 * A.nnz() + n);
        U.reserve_nnz(4 * A.nnz() + n);

        let mut x = vec![T::zero(); n];
        let mut xi = vec![0usize; n];
        let mut pstack = vec![0usize; n];
        let mut marked = vec![false; n];
        let mut pinv = vec![NONE; n];

        let mut lnz = 0;
        let mut unz = 0;
        for k in 0..n {
            L.colptr[k] = lnz;
            U.colptr[k] = unz;
            L.reserve_nnz(lnz + n + 1);
            U.reserve_nnz(unz + n + 1);

            let col = q.as_ref().map_or(k, |q| q[k]);
            let top = spsolve(&L, A, col, &mut xi, &mut pstack, &mut marked, &mut x, &pinv);

            // pivot search over the rows not yet pivotal; already
            // pivotal rows belong to U
            let mut ipiv = NONE;
            let mut a = -T::one();
            for &i in &xi[top..n] {
                if pinv[i] == NONE {
                    let t = T::abs(x[i]);
                    if t > a {
                        a = t;
                        ipiv = i;
                    }
                } else {
                    U.rowval[unz] = pinv[i];
                    U.nzval[unz] = x[i];
                    unz += 1;
                }
            }
            if ipiv == NONE || a <= T::zero() || !a.is_finite() {
                return Err(FactorizationError::SingularMatrix);
            }
            if pinv[col] == NONE && T::abs(x[col]) >= a * settings.pivot_tolerance {
                ipiv = col;
            }

            let pivot = x[ipiv];
            U.rowval[unz] = k;
            U.nzval[unz] = pivot;
            unz += 1;
            pinv[ipiv] = k;
            L.rowval[lnz] = ipiv;
            L.nzval[lnz] = T::one();
            lnz += 1;
            for &i in &xi[top..n] {
                if pinv[i] == NONE {
                    L.rowval[lnz] = i;
                    L.nzval[lnz] = x[i] / pivot;
                    lnz += 1;
                }
                x[i] = T::zero();
                marked[i] = false;
            }
        }
        L.colptr[n] = lnz;
        U.colptr[n] = unz;
        L.trim_to_nnz();
        U.trim_to_nnz();

        // L was built with original row indices; map them to pivotal order
        for r in &mut L.rowval {
            *r = pinv[*r];
        }

        Ok(Self { L, U, pinv, q, n })
    }

    /// Solve `Ax = b`, returning the solution.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, FactorizationError> {
        if b.len() != self.n {
            return Err(FactorizationError::DimensionMismatch);
        }
        let mut x = vec![T::zero(); self.n];
        ipvec(&self.pinv, b, &mut x);
        lsolve(&self.L, &mut x);
        usolve(&self.U, &mut x);

        match &self.q {
            Some(q) => {
                let mut out = vec![T::zero(); self.n];
                ipvec(q, &x, &mut out);
                Ok(out)
            }
            None => Ok(x),
        }
    }

    /// Solve `A'x = b`, returning the solution.
    pub fn solve_transpose(&self, b: &[T]) -> Result<Vec<T>, FactorizationError> {
        if b.len() != self.n {
            return Err(FactorizationError::DimensionMismatch);
        }
        let mut x = vec![T::zero(); self.n];
        match &self.q {
            Some(q) => pvec(q, b, &mut x),
            None => {
                x.copy_from(b);
            }
        }
        utsolve(&self.U, &mut x);
        ltsolve(&self.L, &mut x);

        let mut out = vec![T::zero(); self.n];
        pvec(&self.pinv, &x, &mut out);
        Ok(out)
    }

    /// Total entry count of the `L` and `U` factors.
    pub fn nnz(&self) -> usize {
        self.L.nnz() + self.U.nnz()
    }
}

/// Sparse lower triangular solve `x = L \ A(:,col)`, where the rows of
/// the partially built `L` are addressed through `pinv` and rows not
/// yet pivotal pass through untouched.  The solution's nonzero pattern
/// lands in `xi[top..n]` in topological order; `marked` is left set on
/// exactly those positions for the caller to clear.
#[allow(clippy::too_many_arguments)]
fn spsolve<T: FloatT>(
    L: &CscMatrix<T>,
    A: &CscMatrix<T>,
    col: usize,
    xi: &mut [usize],
    pstack: &mut [usize],
    marked: &mut [bool],
    x: &mut [T],
    pinv: &[usize],
) -> usize {
    let n = L.n;

    // nonzero pattern = nodes reachable from the entries of A(:,col)
    let mut top = n;
    for p in A.colptr[col]..A.colptr[col + 1] {
        if !marked[A.rowval[p]] {
            top = dfs(A.rowval[p], L, top, xi, pstack, marked, pinv);
        }
    }

    for &i in &xi[top..n] {
        x[i] = T::zero();
    }
    for p in A.colptr[col]..A.colptr[col + 1] {
        x[A.rowval[p]] = A.nzval[p];
    }
    for px in top..n {
        let j = xi[px];
        let jnew = pinv[j];
        if jnew == NONE {
            continue; // row j not pivotal yet
        }
        x[j] /= L.nzval[L.colptr[jnew]];
        for p in (L.colptr[jnew] + 1)..L.colptr[jnew + 1] {
            x[L.rowval[p]] -= L.nzval[p] * x[j];
        }
    }
    top
}

// Depth-first search from node j over the column graph of L, pushing
// finished nodes onto xi[top..] so that xi ends up topologically
// sorted.  Iterative, with xi doubling as the node stack and pstack
// holding each level's resume position.
fn dfs<T: FloatT>(
    j: usize,
    L: &CscMatrix<T>,
    mut top: usize,
    xi: &mut [usize],
    pstack: &mut [usize],
    marked: &mut [bool],
    pinv: &[usize],
) -> usize {
    let mut head = 0;
    xi[0] = j;
    loop {
        let j = xi[head];
        let jnew = pinv[j];
        if !marked[j] {
            marked[j] = true;
            pstack[head] = if jnew == NONE { 0 } else { L.colptr[jnew] };
        }
        let p2 = if jnew == NONE { 0 } else { L.colptr[jnew + 1] };
        let mut done = true;
        for p in pstack[head]..p2 {
            let i = L.rowval[p];
            if marked[i] {
                continue;
            }
            pstack[head] = p;
            head += 1;
            xi[head] = i;
            done = false;
            break;
        }
        if done {
            top -= 1;
            xi[top] = j;
            if head == 0 {
                break;
            }
            head -= 1;
        }
    }
    top
}

// ---------------------------------------------------------------------
