/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint (transpose) view of a matrix
#[derive(Debug, Clone)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}
