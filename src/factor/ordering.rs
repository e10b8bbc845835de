// Fill-reducing column orderings via approximate minimum degree on a
// quotient graph.
//
// The graph seed is the off-diagonal pattern of A + A' (symmetric
// problems) or A'A with dense rows of A dropped (rectangular problems).
// Eliminated nodes become elements, adjacent elements are absorbed into
// the new one, external degrees are approximated by set-difference
// counts, indistinguishable nodes are merged after hashing, and nodes
// over the density threshold are deferred to the end.  The node and
// element adjacency lists share one arena that is compacted when space
// runs out.  The returned permutation is a postordering of the
// resulting assembly tree.

use crate::algebra::*;
use crate::factor::symbolic::{tdfs, NONE};

/// Column ordering strategies for the factorization engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrdering {
    /// factor in the given column order
    Natural,
    /// minimum degree on the pattern of `A + A'`; requires a square matrix
    MinimumDegreeAtPlusA,
    /// minimum degree on the pattern of `A'A`, formed without its dense rows
    MinimumDegreeAtA,
}

/// Fill-reducing permutation for the requested strategy, or `None` for
/// the natural ordering.
pub(crate) fn amd_order<T: FloatT>(
    A: &CscMatrix<T>,
    ordering: ColumnOrdering,
) -> Option<Vec<usize>> {
    match ordering {
        ColumnOrdering::Natural => None,
        _ => Some(amd(A, ordering)),
    }
}

// node/element states are multiplexed through sign flips in the shared
// arena, with flip self-inverse and flip(i) < -1 for all i >= 0
const fn flip(i: isize) -> isize {
    -i - 2
}

// stamp reset for the set-difference workspace
fn wclear(mut mark: isize, lemax: isize, w: &mut [isize]) -> isize {
    if mark < 2 || mark + lemax < 0 {
        for wk in w.iter_mut() {
            if *wk != 0 {
                *wk = 1;
            }
        }
        mark = 2;
    }
    mark
}

#[allow(clippy::needless_range_loop)]
fn amd<T: FloatT>(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Vec<usize> {
    let n = A.n;
    if n == 0 {
        return vec![];
    }

    // nodes adjacent to more than this many others are deferred
    let dense_cut = 10. * (n as f64).sqrt();
    let dense = isize::min(n as isize - 2, isize::max(16, dense_cut as isize));

    // seed pattern, with the diagonal dropped
    let mut C = match ordering {
        ColumnOrdering::MinimumDegreeAtPlusA => {
            assert!(A.is_square());
            A.add_scaled(T::one(), &A.transpose(), T::one())
        }
        ColumnOrdering::MinimumDegreeAtA => {
            let mut AT = A.transpose();
            let counts: Vec<usize> = (0..AT.n)
                .map(|j| AT.colptr[j + 1] - AT.colptr[j])
                .collect();
            AT.keep(|_, j, _| counts[j] as isize <= dense);
            let A2 = AT.transpose();
            AT.multiply(&A2)
        }
        ColumnOrdering::Natural => unreachable!(),
    };
    C.keep(|i, j, _| i != j);

    // the pattern arena, with elbow room for new elements
    let mut cnz = C.nnz();
    let nzmax = cnz + cnz / 5 + 2 * n;
    let mut Cp: Vec<isize> = C.colptr.iter().map(|&p| p as isize).collect();
    let mut Ci: Vec<isize> = C.rowval.iter().map(|&i| i as isize).collect();
    Ci.resize(nzmax, 0);

    // quotient graph state, one slot per node plus the sentinel element n
    let mut len = vec![0isize; n + 1];
    let mut nv = vec![1isize; n + 1];
    let mut next = vec![-1isize; n + 1];
    let mut head = vec![-1isize; n + 1];
    let mut last = vec![-1isize; n + 1];
    let mut elen = vec![0isize; n + 1];
    let mut degree = vec![0isize; n + 1];
    let mut w = vec![1isize; n + 1];
    let mut hhead = vec![-1isize; n + 1];

    for k in 0..n {
        len[k] = Cp[k + 1] - Cp[k];
        degree[k] = len[k];
    }
    let mut mark = wclear(0, 0, &mut w[..n]);

    // the sentinel is a dead element that roots the assembly tree and
    // collects the deferred dense nodes
    elen[n] = -2;
    Cp[n] = -1; // slot n of Cp now holds the sentinel's tree position
    w[n] = 0;

    let mut nel = 0usize;
    for i in 0..n {
        let d = degree[i];
        if d == 0 {
            // empty node: eliminate immediately as a tree root
            elen[i] = -2;
            nel += 1;
            Cp[i] = -1;
            w[i] = 0;
        } else if d > dense {
            nv[i] = 0; // defer i by absorbing it into the sentinel
            elen[i] = -1;
            nel += 1;
            Cp[i] = flip(n as isize);
            nv[n] += 1;
        } else {
            if head[d as usize] != -1 {
                last[head[d as usize] as usize] = i as isize;
            }
            next[i] = head[d as usize];
            head[d as usize] = i as isize;
        }
    }

    let mut mindeg = 0usize;
    let mut lemax = 0isize;

    while nel < n {
        // pick a node of minimum approximate degree
        let mut kk = -1isize;
        while mindeg < n && {
            kk = head[mindeg];
            kk == -1
        } {
            mindeg += 1;
        }
        let k = kk as usize;
        if next[k] != -1 {
            last[next[k] as usize] = -1;
        }
        head[mindeg] = next[k];

        let elenk = elen[k];
        let mut nvk = nv[k];
        nel += nvk as usize;

        // compact the arena if the new element might not fit
        if elenk > 0 && cnz + mindeg >= nzmax {
            for j in 0..n {
                let p = Cp[j];
                if p >= 0 {
                    // stash the first entry and tag the object with its index
                    Cp[j] = Ci[p as usize];
                    Ci[p as usize] = flip(j as isize);
                }
            }
            let mut q = 0usize;
            let mut p = 0usize;
            while p < cnz {
                let j = flip(Ci[p]);
                p += 1;
                if j >= 0 {
                    Ci[q] = Cp[j as usize];
                    Cp[j as usize] = q as isize;
                    q += 1;
                    for _ in 0..isize::max(len[j as usize] - 1, 0) {
                        Ci[q] = Ci[p];
                        q += 1;
                        p += 1;
                    }
                }
            }
            cnz = q;
        }

        // build element k by merging the pivot's elements and live nodes
        let mut dk = 0isize;
        nv[k] = -nvk; // tag k as belonging to the new element
        let mut p = Cp[k] as usize;
        let pk1 = if elenk == 0 { p } else { cnz };
        let mut pk2 = pk1;
        for k1 in 1..=(elenk + 1) {
            let (e, mut pj, ln);
            if k1 > elenk {
                e = k as isize; // remaining list is the pivot's own nodes
                pj = p;
                ln = len[k] - elenk;
            } else {
                e = Ci[p];
                p += 1;
                pj = Cp[e as usize] as usize;
                ln = len[e as usize];
            }
            for _ in 1..=ln {
                let i = Ci[pj] as usize;
                pj += 1;
                let nvi = nv[i];
                if nvi <= 0 {
                    continue; // node i is dead or already merged
                }
                dk += nvi;
                nv[i] = -nvi;
                Ci[pk2] = i as isize;
                pk2 += 1;
                // unlink i from its degree list
                if next[i] != -1 {
                    last[next[i] as usize] = last[i];
                }
                if last[i] != -1 {
                    next[last[i] as usize] = next[i];
                } else {
                    head[degree[i] as usize] = next[i];
                }
            }
            if e != k as isize {
                Cp[e as usize] = flip(k as isize); // absorb e into k
                w[e as usize] = 0;
            }
        }
        if elenk != 0 {
            cnz = pk2;
        }
        degree[k] = dk;
        Cp[k] = pk1 as isize;
        len[k] = (pk2 - pk1) as isize;
        elen[k] = -2; // k is now an element

        // stamp |Le \ Lk| into w for every element adjacent to Lk
        mark = wclear(mark, lemax, &mut w[..n]);
        for pk in pk1..pk2 {
            let i = Ci[pk] as usize;
            let eln = elen[i];
            if eln <= 0 {
                continue;
            }
            let nvi = -nv[i]; // nv[i] was negated above
            let wnvi = mark - nvi;
            let cp_i = Cp[i] as usize;
            for p in cp_i..(cp_i + eln as usize) {
                let e = Ci[p] as usize;
                if w[e] >= mark {
                    w[e] -= nvi;
                } else if w[e] != 0 {
                    w[e] = degree[e] + wnvi; // first contact with live e
                }
            }
        }

        // approximate the external degree of each node in Lk
        for pk in pk1..pk2 {
            let i = Ci[pk] as usize;
            let p1 = Cp[i] as usize;
            let elen_i = elen[i] as usize;
            let mut pn = p1;
            let mut h = 0isize;
            let mut d = 0isize;
            for p in p1..(p1 + elen_i) {
                let e = Ci[p] as usize;
                if w[e] != 0 {
                    let dext = w[e] - mark;
                    if dext > 0 {
                        d += dext;
                        Ci[pn] = e as isize;
                        pn += 1;
                        h += e as isize;
                    } else {
                        // e is a subset of the new element: absorb it
                        Cp[e] = flip(k as isize);
                        w[e] = 0;
                    }
                }
            }
            elen[i] = (pn - p1 + 1) as isize;
            let p3 = pn;
            let p4 = p1 + len[i] as usize;
            for p in (p1 + elen_i)..p4 {
                let j = Ci[p] as usize;
                let nvj = nv[j];
                if nvj <= 0 {
                    continue;
                }
                d += nvj;
                Ci[pn] = j as isize;
                pn += 1;
                h += j as isize;
            }
            if d == 0 {
                // i is indistinguishable from the pivot: mass elimination
                Cp[i] = flip(k as isize);
                let nvi = -nv[i];
                dk -= nvi;
                nvk += nvi;
                nel += nvi as usize;
                nv[i] = 0;
                elen[i] = -1;
            } else {
                degree[i] = isize::min(degree[i], d);
                // rotate so element k leads the list, nodes trail it
                Ci[pn] = Ci[p3];
                Ci[p3] = Ci[p1];
                Ci[p1] = k as isize;
                len[i] = (pn - p1 + 1) as isize;
                // queue i in its hash bucket for supernode detection
                let h = (h % n as isize) as usize;
                next[i] = hhead[h];
                hhead[h] = i as isize;
                last[i] = h as isize;
            }
        }
        degree[k] = dk;
        lemax = isize::max(lemax, dk);
        mark = wclear(mark + lemax, lemax, &mut w[..n]);

        // merge nodes with identical adjacency lists
        for pk in pk1..pk2 {
            let i = Ci[pk] as usize;
            if nv[i] >= 0 {
                continue; // already merged away
            }
            let h = last[i] as usize;
            let mut i = hhead[h];
            hhead[h] = -1;
            while i != -1 && next[i as usize] != -1 {
                let iu = i as usize;
                let ln = len[iu];
                let eln = elen[iu];
                let cp_i = Cp[iu] as usize;
                for p in (cp_i + 1)..(cp_i + ln as usize) {
                    w[Ci[p] as usize] = mark;
                }
                let mut jlast = iu;
                let mut j = next[iu];
                while j != -1 {
                    let ju = j as usize;
                    let mut ok = len[ju] == ln && elen[ju] == eln;
                    let cp_j = Cp[ju] as usize;
                    let mut p = cp_j + 1;
                    while ok && p < cp_j + ln as usize {
                        if w[Ci[p] as usize] != mark {
                            ok = false;
                        }
                        p += 1;
                    }
                    if ok {
                        // j duplicates i: fold it in
                        Cp[ju] = flip(i);
                        nv[iu] += nv[ju];
                        nv[ju] = 0;
                        elen[ju] = -1;
                        j = next[ju];
                        next[jlast] = j;
                    } else {
                        jlast = ju;
                        j = next[ju];
                    }
                }
                i = next[iu];
                mark += 1;
            }
        }

        // survivors of Lk return to the degree lists
        let mut p = pk1;
        for pk in pk1..pk2 {
            let i = Ci[pk] as usize;
            let nvi = -nv[i];
            if nvi <= 0 {
                continue;
            }
            nv[i] = nvi;
            let mut d = degree[i] + dk - nvi;
            d = isize::min(d, n as isize - nel as isize - nvi);
            let du = d as usize;
            if head[du] != -1 {
                last[head[du] as usize] = i as isize;
            }
            next[i] = head[du];
            last[i] = -1;
            head[du] = i as isize;
            mindeg = usize::min(mindeg, du);
            degree[i] = d;
            Ci[p] = i as isize;
            p += 1;
        }
        nv[k] = nvk;
        len[k] = (p - pk1) as isize;
        if len[k] == 0 {
            Cp[k] = -1; // element k roots its own subtree
            w[k] = 0;
        }
        if elenk != 0 {
            cnz = p;
        }
    }

    // convert absorption links into assembly-tree parents and postorder
    for i in 0..n {
        Cp[i] = flip(Cp[i]);
    }
    let mut heads = vec![NONE; n + 1];
    let mut nexts = vec![NONE; n + 1];
    for j in (0..=n).rev() {
        if nv[j] > 0 {
            continue; // merged nodes first, so they precede their elements
        }
        let pa = Cp[j] as usize;
        nexts[j] = heads[pa];
        heads[pa] = j;
    }
    for e in (0..=n).rev() {
        if nv[e] <= 0 || Cp[e] == -1 {
            continue;
        }
        let pa = Cp[e] as usize;
        nexts[e] = heads[pa];
        heads[pa] = e;
    }

    let mut post = vec![0usize; n + 1];
    let mut stack = vec![0usize; n + 1];
    let mut k = 0;
    for i in 0..=n {
        if Cp[i] == -1 {
            k = tdfs(i, k, &mut heads, &nexts, &mut post, &mut stack);
        }
    }
    post.truncate(n);
    post
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::symbolic::etree_counts;

    fn assert_is_permutation(p: &[usize], n: usize) {
        assert_eq!(p.len(), n);
        let mut seen = vec![false; n];
        for &j in p {
            assert!(j < n && !seen[j]);
            seen[j] = true;
        }
    }

    fn arrowhead(n: usize) -> CscMatrix<f64> {
        let mut rows = vec![];
        let mut cols = vec![];
        let mut vals = vec![];
        for j in 0..n {
            rows.push(j);
            cols.push(j);
            vals.push(n as f64);
            if j > 0 {
                rows.extend([0, j]);
                cols.extend([j, 0]);
                vals.extend([1., 1.]);
            }
        }
        let mut A = CscMatrix::from_triplets(n, n, &rows, &cols, &vals);
        A.cleanup();
        A
    }

    #[test]
    fn test_natural_is_none() {
        let A = CscMatrix::<f64>::identity(4);
        assert!(amd_order(&A, ColumnOrdering::Natural).is_none());
    }

    #[test]
    fn test_amd_is_permutation() {
        // 2d grid Laplacian pattern, 4x4
        let nx = 4;
        let n = nx * nx;
        let mut rows = vec![];
        let mut cols = vec![];
        for x in 0..nx {
            for y in 0..nx {
                let i = x * nx + y;
                rows.push(i);
                cols.push(i);
                if x + 1 < nx {
                    let j = (x + 1) * nx + y;
                    rows.extend([i, j]);
                    cols.extend([j, i]);
                }
                if y + 1 < nx {
                    let j = x * nx + y + 1;
                    rows.extend([i, j]);
                    cols.extend([j, i]);
                }
            }
        }
        let vals = vec![1.; rows.len()];
        let mut A = CscMatrix::from_triplets(n, n, &rows, &cols, &vals);
        A.cleanup();

        let p = amd_order(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap();
        assert_is_permutation(&p, n);
    }

    #[test]
    fn test_amd_defers_dense_node() {
        // the hub of an arrowhead exceeds the density threshold and
        // must be ordered last, which removes all fill
        let n = 8;
        let A = arrowhead(n);
        let p = amd_order(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap();
        assert_is_permutation(&p, n);
        assert_eq!(p[n - 1], 0);

        let iperm = crate::factor::triangular::invperm(&p).unwrap();
        let (_, Lnz) = etree_counts(&A.to_triu().symperm(&iperm));
        assert_eq!(Lnz.iter().sum::<usize>(), n - 1);
    }

    #[test]
    fn test_amd_ata_rectangular() {
        let A = CscMatrix::from_dense(&vec![
            vec![1., 0., 2., 0.],
            vec![0., 3., 0., 1.],
            vec![4., 0., 0., 1.],
            vec![0., 1., 1., 0.],
            vec![1., 0., 0., 5.],
        ]);
        let p = amd_order(&A, ColumnOrdering::MinimumDegreeAtA).unwrap();
        assert_is_permutation(&p, 4);
    }

    #[test]
    fn test_amd_empty_and_tiny() {
        let A = CscMatrix::<f64>::spalloc(0, 0, 0);
        assert_eq!(
            amd_order(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap(),
            vec![]
        );

        let A = CscMatrix::<f64>::identity(1);
        assert_eq!(
            amd_order(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap(),
            vec![0]
        );
    }
}
