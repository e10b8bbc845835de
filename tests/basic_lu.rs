#![allow(non_snake_case)]
use sparsedirect::algebra::*;
use sparsedirect::factor::*;

// banded test system with a few entries coupling the band ends
fn banded_system(n: usize) -> CscMatrix<f64> {
    let mut rows = vec![];
    let mut cols = vec![];
    let mut vals = vec![];
    for j in 0..n {
        rows.push(j);
        cols.push(j);
        vals.push(4.);
        if j + 1 < n {
            rows.extend([j, j + 1]);
            cols.extend([j + 1, j]);
            vals.extend([1., -2.]);
        }
    }
    rows.extend([0, n - 1]);
    cols.extend([n - 1, 0]);
    vals.extend([0.5, 0.5]);

    let mut A = CscMatrix::from_triplets(n, n, &rows, &cols, &vals);
    A.cleanup();
    A
}

fn residual_inf(A: &CscMatrix<f64>, x: &[f64], b: &[f64]) -> f64 {
    let mut r = b.to_vec();
    A.gemv(&mut r, x, 1., -1.);
    r.norm_inf()
}

#[test]
fn test_lu_banded() {
    let n = 50;
    let A = banded_system(n);
    let b: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();

    let lu = LuFactorization::new(&A, &LuSettings::default()).unwrap();
    let x = lu.solve(&b).unwrap();
    assert!(residual_inf(&A, &x, &b) < 1e-12);

    let xt = lu.solve_transpose(&b).unwrap();
    assert!(residual_inf(&A.transpose(), &xt, &b) < 1e-12);
}

#[test]
fn test_lu_orderings_agree() {
    let A = banded_system(30);
    let b = vec![1.; 30];

    let mut solutions = vec![];
    for ordering in [
        ColumnOrdering::Natural,
        ColumnOrdering::MinimumDegreeAtPlusA,
        ColumnOrdering::MinimumDegreeAtA,
    ] {
        let settings = LuSettingsBuilder::default()
            .ordering(ordering)
            .build()
            .unwrap();
        let lu = LuFactorization::new(&A, &settings).unwrap();
        solutions.push(lu.solve(&b).unwrap());
    }
    assert!(solutions[0].norm_inf_diff(&solutions[1]) < 1e-12);
    assert!(solutions[0].norm_inf_diff(&solutions[2]) < 1e-12);
}

#[test]
fn test_lu_pivot_tolerance() {
    // a diagonal entry small enough that strict partial pivoting
    // rejects it, but a relaxed threshold keeps it
    let A = CscMatrix::from_dense(&vec![
        vec![1e-4, 1., 0.],
        vec![1., 2., 1.],
        vec![0., 1., 3.],
    ]);
    let b = vec![1., 2., 3.];

    let relaxed = LuSettingsBuilder::default()
        .pivot_tolerance(1e-6)
        .build()
        .unwrap();
    let x1 = LuFactorization::new(&A, &LuSettings::default())
        .unwrap()
        .solve(&b)
        .unwrap();
    let x2 = LuFactorization::new(&A, &relaxed)
        .unwrap()
        .solve(&b)
        .unwrap();

    assert!(residual_inf(&A, &x1, &b) < 1e-12);
    assert!(residual_inf(&A, &x2, &b) < 1e-10);
}

#[test]
fn test_lu_f32() {
    let A: CscMatrix<f32> = CscMatrix::from_dense(&vec![
        vec![4., 1., 0.],
        vec![1., 3., 1.],
        vec![0., 1., 2.],
    ]);
    let b = vec![6.0f32, 10., 7.];

    let lu = LuFactorization::new(&A, &LuSettings::default()).unwrap();
    let x = lu.solve(&b).unwrap();

    let mut r = b.clone();
    A.gemv(&mut r, &x, 1., -1.);
    assert!(r.norm_inf() < 1e-4);
}

#[test]
fn test_lu_concurrent_solves() {
    // solves borrow the factorization immutably, so one factorization
    // can serve several threads at once
    let n = 40;
    let A = banded_system(n);
    let lu = LuFactorization::new(&A, &LuSettings::default()).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let lu = &lu;
                let A = &A;
                scope.spawn(move || {
                    let b: Vec<f64> = (0..n).map(|i| ((i + t) as f64).cos()).collect();
                    let x = lu.solve(&b).unwrap();
                    assert!(residual_inf(A, &x, &b) < 1e-12);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    });
}
