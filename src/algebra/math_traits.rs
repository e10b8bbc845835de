use super::FloatT;

// All internal math for the factorization engines goes through these core
// traits, which are implemented generically for scalars of type FloatT.

/// Scalar operations on [`FloatT`](crate::algebra::FloatT)
///
/// The `conj`/`modulus` pair is the seam through which every
/// transpose-sensitive kernel (adjoint products, transposed triangular
/// substitution, Householder application) is routed, so that an adjoint
/// always means a conjugate transpose.  For the real monomorphizations
/// provided here conjugation is the identity.
pub trait ScalarMath {
    type T: FloatT;

    /// Complex conjugate.
    fn conj(&self) -> Self::T;

    /// Magnitude (absolute value for real scalars).
    fn modulus(&self) -> Self::T;
}

impl<T: FloatT> ScalarMath for T {
    type T = T;

    #[inline]
    fn conj(&self) -> T {
        *self
    }

    #[inline]
    fn modulus(&self) -> T {
        T::abs(*self)
    }
}

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)
pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise negation of entries.
    fn negate(&mut self) -> &mut Self;

    /// Dot product
    fn dot(&self, y: &Self) -> Self::T;

    /// Sum of squares of the elements.
    fn sumsq(&self) -> Self::T;

    /// 2-norm
    fn norm(&self) -> Self::T;

    /// Overflow-safe 2-norm, accumulated with a running scale factor.
    fn norm_robust(&self) -> Self::T;

    /// Infinity norm
    fn norm_inf(&self) -> Self::T;

    /// One norm
    fn norm_one(&self) -> Self::T;

    /// Maximum absolute elementwise difference to `b`.
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    //blas-like vector ops
    //--------------------

    /// BLAS-like scaled accumulation.  Produces `self += a*x`
    fn axpy(&mut self, a: Self::T, x: &Self) -> &mut Self;

    /// BLAS-like shift and scale in place.  Produces `self = a*x+b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;
}

/// Matrix-vector products for matrices of [`FloatT`](crate::algebra::FloatT)
pub trait MatrixVectorMultiply {
    type T: FloatT;

    /// BLAS-like general matrix-vector multiply.  Produces `y = a*self*x + b*y`
    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

/// Operations on matrices of [`FloatT`](crate::algebra::FloatT)
pub trait MatrixMath {
    type T: FloatT;

    /// Compute columnwise infinity norms and assign the results
    /// to the vector `norms`
    fn col_norms(&self, norms: &mut [Self::T]);

    /// Compute rowwise infinity norms and assign the results
    /// to the vector `norms`
    fn row_norms(&self, norms: &mut [Self::T]);

    /// Operator 1-norm: maximum column absolute sum.
    fn norm_one(&self) -> Self::T;

    /// Operator infinity norm: maximum row absolute sum.
    fn norm_inf(&self) -> Self::T;

    /// Frobenius norm: square root of the sum of squared entries.
    fn norm_frobenius(&self) -> Self::T;

    /// Elementwise scaling
    fn scale(&mut self, c: Self::T);

    /// Elementwise negation
    fn negate(&mut self);
}
