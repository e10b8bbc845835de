#![allow(non_snake_case)]
use sparsedirect::algebra::*;
use sparsedirect::factor::*;

// tall data-fitting matrix: rows sample [1, t, t^2] at distinct points
fn vandermonde(samples: usize) -> CscMatrix<f64> {
    let rows: Vec<Vec<f64>> = (0..samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            vec![1., t, t * t]
        })
        .collect();
    CscMatrix::from_dense(&rows)
}

#[test]
fn test_qr_least_squares_matches_normal_equations() {
    let A = vandermonde(20);
    let b: Vec<f64> = (0..20).map(|i| (i as f64 * 0.3).sin()).collect();

    let qr = QrFactorization::new(&A, &QrSettings::default()).unwrap();
    let x = qr.solve(&b).unwrap();

    // solve A'A y = A'b by Cholesky and compare
    let AtA = A.transpose().multiply(&A);
    let mut Atb = vec![0.; 3];
    A.t().gemv(&mut Atb, &b, 1., 0.);
    let y = CholeskyFactorization::new(&AtA, &CholeskySettings::default())
        .unwrap()
        .solve(&Atb)
        .unwrap();

    assert!(x.norm_inf_diff(&y) < 1e-10);
}

#[test]
fn test_qr_minimum_norm_matches_normal_equations() {
    // wide full row rank system
    let A = CscMatrix::from_dense(&vec![
        vec![1., 0., 2., 0., 1., 0.],
        vec![0., 3., 0., 1., 0., 2.],
        vec![1., 1., 0., 0., 4., 0.],
    ]);
    let b = vec![3., -1., 2.];

    let qr = QrFactorization::new(&A, &QrSettings::default()).unwrap();
    let x = qr.solve(&b).unwrap();

    // minimum-norm solution is A'(AA')^{-1} b
    let AAt = A.multiply(&A.transpose());
    let y = CholeskyFactorization::new(&AAt, &CholeskySettings::default())
        .unwrap()
        .solve(&b)
        .unwrap();
    let mut xref = vec![0.; 6];
    A.t().gemv(&mut xref, &y, 1., 0.);

    assert!(x.norm_inf_diff(&xref) < 1e-12);
}

#[test]
fn test_qr_transpose_roles() {
    let A = vandermonde(10);
    let qr = QrFactorization::new(&A, &QrSettings::default()).unwrap();

    // A'x = b is wide and consistent: exact solve of length m
    let b = vec![1., 2., 3.];
    let x = qr.solve_transpose(&b).unwrap();
    assert_eq!(x.len(), 10);

    let mut r = b.clone();
    A.t().gemv(&mut r, &x, 1., -1.);
    assert!(r.norm_inf() < 1e-12);
}

#[test]
fn test_qr_square_agrees_with_lu() {
    let A = CscMatrix::from_dense(&vec![
        vec![2., 1., 0., 3.],
        vec![1., 0., 4., 0.],
        vec![0., 5., 1., 1.],
        vec![1., 0., 0., 2.],
    ]);
    let b = vec![6., 5., 7., 3.];

    let x1 = QrFactorization::new(&A, &QrSettings::default())
        .unwrap()
        .solve(&b)
        .unwrap();
    let x2 = LuFactorization::new(&A, &LuSettings::default())
        .unwrap()
        .solve(&b)
        .unwrap();
    assert!(x1.norm_inf_diff(&x2) < 1e-12);
}

#[test]
fn test_qr_natural_ordering() {
    let A = vandermonde(12);
    let b = vec![1.; 12];

    let settings = QrSettingsBuilder::default()
        .ordering(ColumnOrdering::Natural)
        .build()
        .unwrap();
    let x1 = QrFactorization::new(&A, &settings).unwrap().solve(&b).unwrap();
    let x2 = QrFactorization::new(&A, &QrSettings::default())
        .unwrap()
        .solve(&b)
        .unwrap();
    assert!(x1.norm_inf_diff(&x2) < 1e-10);
}
