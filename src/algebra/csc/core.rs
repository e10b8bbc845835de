#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, MatrixShape, ShapedMatrix, SparseFormatError};
use itertools::izip;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use sparsedirect::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
/// Row indices within a column are allowed to be unsorted and may contain
/// duplicate entries until a [`cleanup`](CscMatrix::cleanup) pass merges
/// duplicates by summation and leaves each column sorted.

#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// This field should have length `n+1`. The last entry corresponds
    /// to the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that row indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Use [`check_format`](CscMatrix::check_format) to verify
    /// those conditions.

    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    ///
    /// To make an m x n matrix of zeros, use
    /// ```no_run
    /// use sparsedirect::algebra::CscMatrix;
    /// let m = 3;
    /// let n = 4;
    /// let A : CscMatrix<f64> = CscMatrix::spalloc(m,n,0);
    /// ```

    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// Assemble from triplet (row, column, value) data.
    ///
    /// Entries are compressed column by column in the order supplied;
    /// duplicates are kept and can be consolidated afterwards with
    /// [`cleanup`](CscMatrix::cleanup).
    ///
    /// # Panics
    /// Panics if the index slices have mismatched lengths or contain
    /// out of bounds entries.
    pub fn from_triplets(m: usize, n: usize, rows: &[usize], cols: &[usize], vals: &[T]) -> Self {
        assert_eq!(rows.len(), cols.len());
        assert_eq!(rows.len(), vals.len());
        assert!(rows.iter().all(|&i| i < m));
        assert!(cols.iter().all(|&j| j < n));

        let mut A = CscMatrix::spalloc(m, n, vals.len());

        // count entries per column, then cumsum into colptr
        for &j in cols {
            A.colptr[j] += 1;
        }
        A.colcount_to_colptr();

        for (&i, &j, &v) in izip!(rows, cols, vals) {
            let dest = A.colptr[j];
            A.rowval[dest] = i;
            A.nzval[dest] = v;
            A.colptr[j] += 1;
        }
        A.backshift_colptrs();
        A
    }

    /// Assemble from a dense row-major array of rows.
    ///
    /// Zero entries are not stored, so the conversion is exact for any
    /// binary representable input.
    pub fn from_dense(rows: &[Vec<T>]) -> Self {
        let m = rows.len();
        let n = if m == 0 { 0 } else { rows[0].len() };
        assert!(rows.iter().all(|r| r.len() == n));

        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for j in 0..n {
            for (i, row) in rows.iter().enumerate() {
                if row[j] != T::zero() {
                    rowval.push(i);
                    nzval.push(row[j]);
                }
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Expand to a dense row-major array of rows, summing any
    /// duplicate entries.
    pub fn to_dense(&self) -> Vec<Vec<T>> {
        let mut out = vec![vec![T::zero(); self.n]; self.m];
        for col in 0..self.n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                out[self.rowval[p]][col] += self.nzval[p];
            }
        }
        out
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// Entries within a column are scanned linearly, so the column is
    /// not required to be sorted.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.nrows() && col < self.ncols());

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        let rows_in_this_column = &self.rowval[first..last];
        rows_in_this_column
            .iter()
            .position(|&r| r == row)
            .map(|idx| self.nzval[first + idx])
    }

    /// Keep entries for which `f(row, col, value)` returns true,
    /// compacting the storage in place.  Returns the number of
    /// entries retained.
    pub fn keep(&mut self, f: impl Fn(usize, usize, T) -> bool) -> usize {
        let mut nz = 0;
        for j in 0..self.n {
            //column j starts at nz after compaction
            let (first, last) = (self.colptr[j], self.colptr[j + 1]);
            self.colptr[j] = nz;
            for p in first..last {
                if f(self.rowval[p], j, self.nzval[p]) {
                    self.rowval[nz] = self.rowval[p];
                    self.nzval[nz] = self.nzval[p];
                    nz += 1;
                }
            }
        }
        self.colptr[self.n] = nz;
        self.trim_to_nnz();
        nz
    }

    /// Drop entries with magnitude at or below `tolerance`, compacting
    /// the storage in place.  Returns the number of entries retained.
    pub fn drop_zeros(&mut self, tolerance: T) -> usize {
        self.keep(|_i, _j, v| T::abs(v) > tolerance)
    }

    /// Allocates a new matrix containing only entries from the upper
    /// triangular part.  Columns need not be sorted.
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let n = self.n;

        let mut nnz = 0;
        for col in 0..n {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            nnz += rows.iter().filter(|&&row| row <= col).count();
        }

        let mut triu = CscMatrix::spalloc(n, n, nnz);
        let mut dest = 0;
        for col in 0..n {
            triu.colptr[col] = dest;
            for p in self.colptr[col]..self.colptr[col + 1] {
                if self.rowval[p] <= col {
                    triu.rowval[dest] = self.rowval[p];
                    triu.nzval[dest] = self.nzval[p];
                    dest += 1;
                }
            }
        }
        triu.colptr[n] = dest;
        triu
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        for col in 0..self.ncols() {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            let rows = &self.rowval[first..last];

            if rows.iter().any(|&row| row > col) {
                return false;
            }
        }
        true
    }

    // ---------------------------------------------
    // internal storage manipulation

    // convert per-column counts held in colptr[0..n] into a
    // cumulative column pointer, leaving colptr[j] at the start
    // of column j's fill region
    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    // after filling, each colptr[j] has advanced to the start of
    // column j+1.  Shift right to restore the invariant.
    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }

    // grow index/value capacity to at least `cap` entries, doubling
    // to keep appends amortized O(1)
    pub(crate) fn reserve_nnz(&mut self, cap: usize) {
        if cap <= self.rowval.len() {
            return;
        }
        let newcap = std::cmp::max(cap, 2 * self.rowval.len());
        self.rowval.resize(newcap, 0);
        self.nzval.resize(newcap, T::zero());
    }

    // shrink index/value storage back to the final entry count
    pub(crate) fn trim_to_nnz(&mut self) {
        let nnz = self.colptr[self.n];
        self.rowval.truncate(nnz);
        self.nzval.truncate(nnz);
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
    fn is_square(&self) -> bool {
        self.m == self.n
    }
}

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = CscMatrix::new(
        6,                                                                 // m
        5,                                                                 // n
        vec![0, 3, 9, 11, 11, 14],                                         // colptr
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
    );

    assert_eq!(A.get_entry((1, 0)).unwrap(), 1.);
    assert_eq!(A.get_entry((5, 0)).unwrap(), 3.);
    assert_eq!(A.get_entry((0, 1)).unwrap(), 4.);
    assert_eq!(A.get_entry((3, 1)).unwrap(), 7.);
    assert_eq!(A.get_entry((5, 1)).unwrap(), 9.);
    assert_eq!(A.get_entry((3, 2)).unwrap(), 10.);
    assert_eq!(A.get_entry((4, 2)).unwrap(), 11.);
    assert_eq!(A.get_entry((4, 4)).unwrap(), 14.);

    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((4, 0)).is_none());
    assert!(A.get_entry((2, 2)).is_none());
    assert!(A.get_entry((1, 3)).is_none());
    assert!(A.get_entry((2, 3)).is_none());
    assert!(A.get_entry((4, 3)).is_none());
    assert!(A.get_entry((3, 4)).is_none());
}

#[test]
fn test_csc_from_triplets() {
    let rows = vec![0, 2, 1, 0, 2];
    let cols = vec![0, 0, 1, 2, 2];
    let vals = vec![1., 2., 3., 4., 5.];
    let A = CscMatrix::from_triplets(3, 3, &rows, &cols, &vals);

    assert_eq!(A.colptr, vec![0, 2, 3, 5]);
    assert_eq!(A.rowval, vec![0, 2, 1, 0, 2]);
    assert_eq!(A.nzval, vec![1., 2., 3., 4., 5.]);
    assert!(A.check_format().is_ok());
}

#[test]
fn test_csc_keep() {
    let mut A = CscMatrix::new(
        3,
        3,
        vec![0, 2, 3, 5],
        vec![0, 2, 1, 0, 2],
        vec![1., 0., 3., 0., 5.],
    );
    let nz = A.drop_zeros(0.);
    assert_eq!(nz, 3);
    assert_eq!(A.colptr, vec![0, 1, 2, 3]);
    assert_eq!(A.rowval, vec![0, 1, 2]);
    assert_eq!(A.nzval, vec![1., 3., 5.]);

    //keep the diagonal only
    let mut B = CscMatrix::<f64>::identity(3);
    B.keep(|i, j, _v| i == j);
    assert_eq!(B.nnz(), 3);
}
