// Symbolic analysis shared by the factorization engines: elimination
// trees, nonzero counts and reachability on the tree.  All tree arrays
// use usize::MAX as the "no parent" sentinel.

use crate::algebra::*;

pub(crate) const NONE: usize = usize::MAX;

/// Elimination tree and per-column subdiagonal nonzero counts for the
/// Cholesky factor of a matrix given by its upper triangle.
///
/// For each column j, every row index i < j in that column starts a walk
/// up the partially built tree.  Each node passed before reaching one
/// already visited in this column gains a nonzero in its factor column,
/// and an unset parent pointer along the way is grafted to j.
pub(crate) fn etree_counts<T: FloatT>(A: &CscMatrix<T>) -> (Vec<usize>, Vec<usize>) {
    let n = A.n;
    let mut parent = vec![NONE; n];
    let mut Lnz = vec![0usize; n];
    let mut work = vec![NONE; n];

    for j in 0..n {
        work[j] = j;
        for p in A.colptr[j]..A.colptr[j + 1] {
            let mut i = A.rowval[p];
            debug_assert!(i <= j);
            while work[i] != j {
                if parent[i] == NONE {
                    parent[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = parent[i];
            }
        }
    }
    (parent, Lnz)
}

/// Elimination tree of `A'A`, computed without forming the product.
///
/// Rows of `A` are threaded through a `prev` chain so that each row
/// contributes the path between its consecutive column appearances,
/// which is exactly the edge set of `A'A`.
pub(crate) fn column_etree<T: FloatT>(A: &CscMatrix<T>) -> Vec<usize> {
    let (m, n) = A.size();
    let mut parent = vec![NONE; n];
    let mut ancestor = vec![NONE; n];
    let mut prev = vec![NONE; m];

    for k in 0..n {
        for p in A.colptr[k]..A.colptr[k + 1] {
            let mut i = prev[A.rowval[p]];
            // traverse from i toward the root, with path compression
            while i != NONE && i < k {
                let inext = ancestor[i];
                ancestor[i] = k;
                if inext == NONE {
                    parent[i] = k;
                }
                i = inext;
            }
            prev[A.rowval[p]] = k;
        }
    }
    parent
}

/// Nonzero pattern of row k of the Cholesky factor, found by walking
/// from each entry of `A(0:k,k)` up the elimination tree until hitting
/// a node already seen for this column.
///
/// The pattern lands in `s[top..n]` in topological order and excludes
/// the diagonal.  `w` is a stamp array, stamped with `k + 1` so that no
/// clearing between columns is needed.  Returns `top`.
pub(crate) fn ereach<T: FloatT>(
    A: &CscMatrix<T>,
    k: usize,
    parent: &[usize],
    s: &mut [usize],
    w: &mut [usize],
) -> usize {
    let n = A.n;
    let mut top = n;
    let stamp = k + 1;
    w[k] = stamp;

    for p in A.colptr[k]..A.colptr[k + 1] {
        let mut i = A.rowval[p];
        if i > k {
            continue;
        }
        // collect the unvisited part of the path from i to the root
        let mut len = 0;
        while w[i] != stamp {
            s[len] = i;
            len += 1;
            w[i] = stamp;
            i = parent[i];
        }
        // push the path onto the output stack in reverse
        while len > 0 {
            top -= 1;
            len -= 1;
            s[top] = s[len];
        }
    }
    top
}

/// Depth-first postorder of the subtree rooted at `j`, appending node
/// indices to `post` starting at position `k`.  `head` and `next` hold
/// the child lists and are consumed.  Returns the updated `k`.
pub(crate) fn tdfs(
    j: usize,
    mut k: usize,
    head: &mut [usize],
    next: &[usize],
    post: &mut [usize],
    stack: &mut [usize],
) -> usize {
    let mut top = 0;
    stack[0] = j;
    loop {
        let p = stack[top];
        let i = head[p];
        if i == NONE {
            // leaf of the remaining subtree: emit it
            post[k] = p;
            k += 1;
            if top == 0 {
                break;
            }
            top -= 1;
        } else {
            head[p] = next[i];
            top += 1;
            stack[top] = i;
        }
    }
    k
}

/// Symbolic row counts for the Householder factor V.
pub(crate) struct VCount {
    /// row permutation mapping original (and fictitious) rows to the
    /// order in which they become pivotal, length `m + n`
    pub pinv: Vec<usize>,
    /// leftmost nonzero column of each row, `NONE` for empty rows
    pub leftmost: Vec<usize>,
    /// row count of V after padding with fictitious rows, `>= m`
    pub m2: usize,
    /// nonzero count of V
    pub vnz: usize,
}

/// Count the entries of each Householder vector and build the row
/// permutation that makes V lower trapezoidal.
///
/// Rows are queued on their leftmost column.  Column k takes the head
/// of its queue as the pivotal row of V(:,k), padding with a fictitious
/// row when the queue is empty (a structurally rank-deficient column),
/// and hands the remaining queued rows to its tree parent.
pub(crate) fn vcount<T: FloatT>(A: &CscMatrix<T>, parent: &[usize]) -> VCount {
    let (m, n) = A.size();
    let mut pinv = vec![NONE; m + n];
    let mut leftmost = vec![NONE; m];
    let mut next = vec![NONE; m];
    let mut head = vec![NONE; n];
    let mut tail = vec![NONE; n];
    let mut nque = vec![0usize; n];

    for k in (0..n).rev() {
        for p in A.colptr[k]..A.colptr[k + 1] {
            leftmost[A.rowval[p]] = k;
        }
    }
    for i in (0..m).rev() {
        let k = leftmost[i];
        if k == NONE {
            continue; // row i is empty
        }
        if nque[k] == 0 {
            tail[k] = i;
        }
        nque[k] += 1;
        next[i] = head[k];
        head[k] = i;
    }

    let mut vnz = 0;
    let mut m2 = m;
    for k in 0..n {
        let mut i = head[k];
        vnz += 1; // V(k,k)
        if i == NONE {
            i = m2; // fictitious row for a column with no queued rows
            m2 += 1;
        }
        pinv[i] = k;
        if nque[k] == 0 {
            continue;
        }
        nque[k] -= 1;
        if nque[k] == 0 {
            continue;
        }
        vnz += nque[k];
        // pass the remaining rows up to the parent column
        let pa = parent[k];
        if pa != NONE {
            if nque[pa] == 0 {
                tail[pa] = tail[k];
            }
            next[tail[k]] = head[pa];
            head[pa] = next[head[k]];
            nque[pa] += nque[k];
        }
    }
    // remaining rows become pivotal after all the columns
    let mut k = n;
    for pi in pinv.iter_mut().take(m) {
        if *pi == NONE {
            *pi = k;
            k += 1;
        }
    }

    VCount {
        pinv,
        leftmost,
        m2,
        vnz,
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::*;

    // arrowhead matrix, upper triangle: dense last row/column plus diagonal
    fn arrowhead_triu(n: usize) -> CscMatrix<f64> {
        let mut rows = vec![];
        let mut cols = vec![];
        let mut vals = vec![];
        for j in 0..n {
            rows.push(j);
            cols.push(j);
            vals.push(10.);
            if j < n - 1 {
                rows.push(j);
                cols.push(n - 1);
                vals.push(1.);
            }
        }
        let mut A = CscMatrix::from_triplets(n, n, &rows, &cols, &vals);
        A.cleanup();
        A
    }

    #[test]
    fn test_etree_counts_arrowhead() {
        // every node hangs off the last column and L fills only there
        let A = arrowhead_triu(5);
        let (parent, Lnz) = etree_counts(&A);
        assert_eq!(parent, vec![4, 4, 4, 4, NONE]);
        assert_eq!(Lnz, vec![1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_etree_counts_tridiagonal() {
        // triu of a tridiagonal matrix: the tree is a path, no fill
        let n = 6;
        let mut rows = vec![0];
        let mut cols = vec![0];
        let mut vals = vec![2.];
        for j in 1..n {
            rows.extend([j - 1, j]);
            cols.extend([j, j]);
            vals.extend([-1., 2.]);
        }
        let A = CscMatrix::from_triplets(n, n, &rows, &cols, &vals);

        let (parent, Lnz) = etree_counts(&A);
        let expected: Vec<usize> = (1..n).chain([NONE]).collect();
        assert_eq!(parent, expected);
        assert_eq!(Lnz, vec![1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_ereach() {
        let A = arrowhead_triu(4);
        let (parent, _) = etree_counts(&A);

        let mut s = vec![0; 4];
        let mut w = vec![0; 4];
        let top = ereach(&A, 3, &parent, &mut s, &mut w);

        // row 3 of L touches all earlier columns
        assert_eq!(&s[top..], &[2, 1, 0]);
    }

    #[test]
    fn test_column_etree() {
        // A'A for this matrix is dense tridiagonal-ish: rows couple
        // consecutive columns, so the column tree is a path
        let A = CscMatrix::from_dense(&vec![
            vec![1., 1., 0.],
            vec![0., 1., 1.],
            vec![1., 0., 0.],
        ]);
        let parent = column_etree(&A);
        assert_eq!(parent, vec![1, 2, NONE]);
    }

    #[test]
    fn test_vcount_full_rank() {
        let A = CscMatrix::from_dense(&vec![
            vec![1., 1., 0.],
            vec![0., 1., 1.],
            vec![1., 0., 1.],
            vec![0., 0., 1.],
        ]);
        let parent = column_etree(&A);
        let vc = vcount(&A, &parent);

        assert_eq!(vc.m2, 4); // no fictitious rows
        assert_eq!(vc.leftmost, vec![0, 1, 0, 2]);

        // pinv restricted to the real rows is a permutation of 0..m
        let mut seen = vec![false; 4];
        for &pi in vc.pinv.iter().take(4) {
            assert!(pi < 4 && !seen[pi]);
            seen[pi] = true;
        }
        assert!(vc.vnz >= 4);
    }

    #[test]
    fn test_vcount_zero_column() {
        // middle column empty: a fictitious row must be padded in
        let A = CscMatrix::from_dense(&vec![vec![1., 0., 1.], vec![0., 0., 1.]]);
        let parent = column_etree(&A);
        let vc = vcount(&A, &parent);
        assert_eq!(vc.m2, 3);
    }
}
