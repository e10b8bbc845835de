//---------------------------------------------------------
// sparse-sparse algebraic operations: scatter/gather based
// sums and products, transposition, permutation and
// duplicate consolidation.
//---------------------------------------------------------

use crate::algebra::*;
use core::cmp::{max, min};
use std::iter::zip;

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Conjugate transpose.  For the real scalar types this is the
    /// ordinary transpose.  Columns of the result are sorted.
    pub fn transpose(&self) -> Self {
        let mut At = CscMatrix::spalloc(self.n, self.m, self.nnz());

        // entries per row of self become column counts of At
        for &i in &self.rowval {
            At.colptr[i] += 1;
        }
        At.colcount_to_colptr();

        for j in 0..self.n {
            for p in self.colptr[j]..self.colptr[j + 1] {
                let dest = At.colptr[self.rowval[p]];
                At.rowval[dest] = j;
                At.nzval[dest] = self.nzval[p].conj();
                At.colptr[self.rowval[p]] += 1;
            }
        }
        At.backshift_colptrs();
        At
    }

    /// Matrix sum `C = a*self + b*B`.
    ///
    /// Columns of the result are sorted and contain no duplicates.
    ///
    /// # Panics
    /// Panics if matrix dimensions are incompatible.
    pub fn add_scaled(&self, a: T, B: &Self, b: T) -> Self {
        assert_eq!(self.m, B.m);
        assert_eq!(self.n, B.n);

        let (m, n) = (self.m, self.n);
        let mut C = CscMatrix::spalloc(m, n, self.nnz() + B.nnz());

        // scatter/gather workspace
        let mut w = vec![0usize; m];
        let mut x = vec![T::zero(); m];

        let mut nz = 0;
        for j in 0..n {
            C.colptr[j] = nz;
            nz = self.scatter(j, a, &mut w, &mut x, j + 1, &mut C, nz);
            nz = B.scatter(j, b, &mut w, &mut x, j + 1, &mut C, nz);

            for p in C.colptr[j]..nz {
                C.nzval[p] = x[C.rowval[p]];
            }
        }
        C.colptr[n] = nz;
        C.trim_to_nnz();
        C.sort_indices();
        C
    }

    /// Matrix product `C = self * B` by Gustavson's algorithm.
    ///
    /// Result capacity grows by doubling as columns are produced, so the
    /// cost is O(flops) amortized.  Columns of the result are sorted.
    ///
    /// # Panics
    /// Panics if the inner dimensions disagree.
    pub fn multiply(&self, B: &Self) -> Self {
        assert_eq!(self.n, B.m);

        let (m, n) = (self.m, B.n);
        let mut C = CscMatrix::spalloc(m, n, 0);
        C.reserve_nnz(self.nnz() + B.nnz());

        let mut w = vec![0usize; m];
        let mut x = vec![T::zero(); m];

        let mut nz = 0;
        for j in 0..n {
            // every row could enter this column of C
            C.reserve_nnz(nz + m);
            C.colptr[j] = nz;
            for p in B.colptr[j]..B.colptr[j + 1] {
                nz = self.scatter(B.rowval[p], B.nzval[p], &mut w, &mut x, j + 1, &mut C, nz);
            }
            for p in C.colptr[j]..nz {
                C.nzval[p] = x[C.rowval[p]];
            }
        }
        C.colptr[n] = nz;
        C.trim_to_nnz();
        C.sort_indices();
        C
    }

    /// Consolidate duplicate entries by summation, leaving each column
    /// sorted by row index.
    pub fn cleanup(&mut self) {
        let mut nnz = 0;
        let mut marker = vec![usize::MAX; self.m];

        for i in 0..self.n {
            let q = nnz; // column i will start at q
            for p in self.colptr[i]..self.colptr[i + 1] {
                let j = self.rowval[p];
                if marker[j] != usize::MAX && marker[j] >= q {
                    // (j,i) is a duplicate: fold it into the retained entry
                    let dest = marker[j];
                    let v = self.nzval[p];
                    self.nzval[dest] += v;
                } else {
                    marker[j] = nnz;
                    self.rowval[nnz] = j;
                    self.nzval[nnz] = self.nzval[p];
                    nnz += 1;
                }
            }
            self.colptr[i] = q;
        }
        self.colptr[self.n] = nnz;
        self.trim_to_nnz();
        self.sort_indices();
    }

    /// Sort the entries within each column by row index.
    pub fn sort_indices(&mut self) {
        for j in 0..self.n {
            let rng = self.colptr[j]..self.colptr[j + 1];
            let mut pairs: Vec<(usize, T)> = zip(&self.rowval[rng.clone()], &self.nzval[rng.clone()])
                .map(|(&r, &v)| (r, v))
                .collect();
            pairs.sort_unstable_by_key(|&(r, _)| r);
            for (p, (r, v)) in zip(rng, pairs) {
                self.rowval[p] = r;
                self.nzval[p] = v;
            }
        }
    }

    /// True if `other` has identical shape and nonzero pattern, and all
    /// values agree elementwise to within `tolerance`.
    pub fn is_equal_within(&self, other: &Self, tolerance: T) -> bool {
        if self.m != other.m || self.n != other.n || self.nnz() != other.nnz() {
            return false;
        }
        if self.colptr != other.colptr || self.rowval != other.rowval {
            return false;
        }
        zip(&self.nzval, &other.nzval).all(|(&a, &b)| (a - b).modulus() <= tolerance)
    }

    /// Permuted copy `C = A(p,q)`, with the row permutation supplied in
    /// inverse form (`pinv[i]` is the new position of row `i`).  `None`
    /// selects the identity on either side.
    pub(crate) fn permute(&self, pinv: Option<&[usize]>, q: Option<&[usize]>) -> Self {
        let (m, n) = (self.m, self.n);
        let mut C = CscMatrix::spalloc(m, n, self.nnz());

        let mut nz = 0;
        for k in 0..n {
            C.colptr[k] = nz;
            let j = q.map_or(k, |q| q[k]);
            for p in self.colptr[j]..self.colptr[j + 1] {
                C.rowval[nz] = pinv.map_or(self.rowval[p], |pinv| pinv[self.rowval[p]]);
                C.nzval[nz] = self.nzval[p];
                nz += 1;
            }
        }
        C.colptr[n] = nz;
        C
    }

    /// Symmetric permutation of an upper triangular matrix: returns the
    /// upper triangular part of `PAP'` given the inverse permutation
    /// `iperm`.  Entries of the input below the diagonal are ignored.
    pub(crate) fn symperm(&self, iperm: &[usize]) -> Self {
        assert!(self.is_square());
        let n = self.n;
        let mut P = CscMatrix::spalloc(n, n, self.nnz());

        // 1. count the number of upper-triangle entries in each column
        // of P, keeping in mind the row permutation
        let mut num_entries = vec![0usize; n];
        for col in 0..n {
            let colP = iperm[col];
            for &row in &self.rowval[self.colptr[col]..self.colptr[col + 1]] {
                if row > col {
                    continue;
                }
                let rowP = iperm[row];
                num_entries[max(rowP, colP)] += 1;
            }
        }

        // 2. cumsum the counts into the column pointer of P
        P.colptr[0] = 0;
        let mut acc = 0;
        for (Pckp1, ne) in zip(&mut P.colptr[1..], &num_entries) {
            *Pckp1 = acc + ne;
            acc = *Pckp1;
        }
        // reuse this memory to track the next free slot in each column
        num_entries.copy_from_slice(&P.colptr[0..n]);
        let mut next_free = num_entries;

        // 3. place the permuted entries (columns end up unsorted)
        for col in 0..n {
            let colP = iperm[col];
            for p in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[p];
                if row > col {
                    continue;
                }
                let rowP = iperm[row];
                let dest = next_free[max(colP, rowP)];
                P.rowval[dest] = min(colP, rowP);
                P.nzval[dest] = self.nzval[p];
                next_free[max(colP, rowP)] += 1;
            }
        }
        P
    }

    /// Scatters and sums a sparse column into a dense workspace,
    /// `x += beta * self(:,j)`, recording the nonzero pattern of the
    /// accumulated column in `C.rowval` starting at position `nz`.
    ///
    /// Rows already marked with `mark` in `w` accumulate in place;
    /// unmarked rows are added to the pattern.  Returns the new `nz`.
    pub(crate) fn scatter(
        &self,
        j: usize,
        beta: T,
        w: &mut [usize],
        x: &mut [T],
        mark: usize,
        C: &mut CscMatrix<T>,
        mut nz: usize,
    ) -> usize {
        for p in self.colptr[j]..self.colptr[j + 1] {
            let i = self.rowval[p];
            if w[i] < mark {
                w[i] = mark; // i is a new entry in column j
                C.reserve_nnz(nz + 1);
                C.rowval[nz] = i;
                nz += 1;
                x[i] = beta * self.nzval[p];
            } else {
                x[i] += beta * self.nzval[p]; // i exists in C(:,j) already
            }
        }
        nz
    }
}
