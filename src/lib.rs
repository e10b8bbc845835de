//! __sparsedirect__ is a library of direct solvers for sparse linear systems.
//! Given a matrix $A$ in compressed sparse column (CSC) format it computes
//! LU, Cholesky or Householder QR factorizations and uses them to solve
//! $Ax = b$, including least-squares and minimum-norm solutions for
//! rectangular $A$.
//!
//! The library is organised in two layers:
//!
//! * [`algebra`] : the [`CscMatrix`](crate::algebra::CscMatrix) storage type
//!   together with its sparse algebra (products, sums, norms, duplicate
//!   consolidation) and dense vector utilities.
//!
//! * [`factor`] : fill-reducing orderings (approximate minimum degree),
//!   symbolic analysis, the three numeric factorization engines
//!   ([`LuFactorization`](crate::factor::LuFactorization),
//!   [`CholeskyFactorization`](crate::factor::CholeskyFactorization),
//!   [`QrFactorization`](crate::factor::QrFactorization)), and the
//!   triangular substitution kernels they share.
//!
//! All numeric code is generic over the [`FloatT`](crate::algebra::FloatT)
//! scalar trait and is single threaded.  Factorizations are immutable once
//! constructed; solves allocate their own scratch space, so a factorization
//! may be shared across threads and solved against concurrently.

//Rust hates greek characters
#![allow(confusable_idents)]

pub mod algebra;
pub mod factor;
