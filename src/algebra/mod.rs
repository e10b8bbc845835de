//! Sparse matrix and vector algebra for the factorization engines.
//!
//! All matrices are stored in standard compressed sparse column (CSC)
//! format via [`CscMatrix`].  Dense data appears only as `[T]` slices.

mod adjoint;
mod csc;
mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod matrix_types;
mod vecmath;

pub use csc::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub(crate) use matrix_traits::*;
pub use matrix_types::*;

#[cfg(test)]
mod tests;
