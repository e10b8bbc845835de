#![allow(non_snake_case)]
use sparsedirect::algebra::*;
use sparsedirect::factor::*;

#[test]
fn test_lu_requires_square() {
    let A = CscMatrix::<f64>::spalloc(4, 3, 0);
    assert!(matches!(
        LuFactorization::new(&A, &LuSettings::default()),
        Err(FactorizationError::DimensionMismatch)
    ));
}

#[test]
fn test_cholesky_requires_square() {
    let A = CscMatrix::<f64>::spalloc(4, 3, 0);
    assert!(matches!(
        CholeskyFactorization::new(&A, &CholeskySettings::default()),
        Err(FactorizationError::DimensionMismatch)
    ));
}

#[test]
fn test_solve_length_checks() {
    let A = CscMatrix::<f64>::identity(4);
    let bad = vec![1.; 3];

    let lu = LuFactorization::new(&A, &LuSettings::default()).unwrap();
    assert!(matches!(
        lu.solve(&bad),
        Err(FactorizationError::DimensionMismatch)
    ));
    assert!(matches!(
        lu.solve_transpose(&bad),
        Err(FactorizationError::DimensionMismatch)
    ));

    let chol = CholeskyFactorization::new(&A, &CholeskySettings::default()).unwrap();
    assert!(matches!(
        chol.solve(&bad),
        Err(FactorizationError::DimensionMismatch)
    ));
}

#[test]
fn test_qr_solve_length_checks() {
    // 5 x 3, so solve takes length 5 and solve_transpose length 3
    let A = CscMatrix::from_dense(&vec![
        vec![1., 0., 0.],
        vec![0., 1., 0.],
        vec![0., 0., 1.],
        vec![1., 1., 0.],
        vec![0., 1., 1.],
    ]);
    let qr = QrFactorization::new(&A, &QrSettings::default()).unwrap();

    assert!(qr.solve(&vec![1.; 5]).is_ok());
    assert!(qr.solve_transpose(&vec![1.; 3]).is_ok());
    assert!(matches!(
        qr.solve(&vec![1.; 3]),
        Err(FactorizationError::DimensionMismatch)
    ));
    assert!(matches!(
        qr.solve_transpose(&vec![1.; 5]),
        Err(FactorizationError::DimensionMismatch)
    ));
}
