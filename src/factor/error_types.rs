use thiserror::Error;

/// Error type returned by the factorization engines
#[derive(Error, Debug)]
pub enum FactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    DimensionMismatch,
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,
    #[error("Matrix is singular to working precision")]
    SingularMatrix,
    #[error("Permutation is not a bijection on 0..n")]
    InvalidPermutation,
}
