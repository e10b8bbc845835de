#![allow(non_snake_case)]

mod core;
pub use self::core::*;

// trait and inherent impls only
mod algebra;
mod matrix_math;
