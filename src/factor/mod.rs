//! Direct factorization engines for sparse linear systems.
//!
//! Three engines are provided, all consuming [`CscMatrix`](crate::algebra::CscMatrix)
//! inputs and producing immutable factorization objects:
//!
//! * [`LuFactorization`] : square systems via LU with partial pivoting,
//! * [`CholeskyFactorization`] : symmetric positive definite systems,
//! * [`QrFactorization`] : rectangular systems via Householder QR,
//!   giving least-squares or minimum-norm solutions.
//!
//! Each engine pairs with a builder-style settings object controlling
//! the fill-reducing ordering and (for LU) the pivot tolerance.  Solves
//! take `&self` and allocate their own scratch, so one factorization can
//! serve concurrent solves.
#![allow(non_snake_case)]

mod error_types;
pub use error_types::*;

mod ordering;
pub use ordering::*;

pub(crate) mod symbolic;
pub(crate) mod triangular;

mod cholesky;
pub use cholesky::*;

mod lu;
pub use lu::*;

mod qr;
pub use qr::*;
