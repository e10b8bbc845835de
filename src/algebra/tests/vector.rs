use crate::algebra::*;

#[test]
fn test_norms() {
    let x = vec![3., -4., 0.];
    assert_eq!(x.norm_one(), 7.);
    assert_eq!(x.norm_inf(), 4.);
    assert_eq!(x.sumsq(), 25.);
    assert_eq!(x.norm(), 5.);
}

#[test]
fn test_norm_inf_diff() {
    let x = vec![1., 5., -2.];
    let y = vec![0., 7., -2.];
    assert_eq!(x.norm_inf_diff(&y), 2.);
    assert_eq!(x.norm_inf_diff(&x), 0.);
}

#[test]
fn test_scalarops() {
    let mut x = vec![1., -2., 4.];

    x.scale(2.);
    assert_eq!(x, [2., -4., 8.]);

    x.negate();
    assert_eq!(x, [-2., 4., -8.]);

    x.set(7.);
    assert_eq!(x, [7., 7., 7.]);
}

#[test]
fn test_axpby() {
    let x = vec![1., 2., 3.];
    let mut y = vec![10., 20., 30.];

    // y = 2x + 0.5y
    y.axpby(2., &x, 0.5);
    assert_eq!(y, [7., 14., 21.]);

    let mut z = vec![1., 1., 1.];
    z.axpy(-1., &x);
    assert_eq!(z, [0., -1., -2.]);
}

#[test]
fn test_copy_from() {
    let x = vec![1., 2., 3.];
    let mut y = vec![0.; 3];
    y.copy_from(&x);
    assert_eq!(y, x);
}
