//! Scalar types usable as operand precision.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul};

use num_complex::{Complex32, Complex64};

mod private {
    use num_complex::{Complex32, Complex64};

    pub trait Sealed {}
    impl Sealed for Complex32 {}
    impl Sealed for Complex64 {}
}

/// A complex scalar that operands of a tensor network can be built from.
///
/// The two supported precisions are [`Complex32`] (single) and [`Complex64`]
/// (double). The trait is sealed: gate matrices are stored in double
/// precision and narrowed on operand materialization, so an unsupported
/// precision cannot be requested in the first place.
pub trait ComplexScalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + AddAssign
    + Mul<Output = Self>
    + private::Sealed
{
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Converts a double-precision complex number into this precision.
    fn from_c64(value: Complex64) -> Self;

    /// The complex conjugate.
    fn conj(self) -> Self;

    /// The modulus as an `f64`, mainly for comparisons in tests.
    fn modulus(self) -> f64;
}

impl ComplexScalar for Complex64 {
    fn zero() -> Self {
        Complex64::ZERO
    }

    fn one() -> Self {
        Complex64::ONE
    }

    fn from_c64(value: Complex64) -> Self {
        value
    }

    fn conj(self) -> Self {
        Complex64::conj(&self)
    }

    fn modulus(self) -> f64 {
        self.norm()
    }
}

impl ComplexScalar for Complex32 {
    fn zero() -> Self {
        Complex32::ZERO
    }

    fn one() -> Self {
        Complex32::ONE
    }

    fn from_c64(value: Complex64) -> Self {
        Complex32::new(value.re as f32, value.im as f32)
    }

    fn conj(self) -> Self {
        Complex32::conj(&self)
    }

    fn modulus(self) -> f64 {
        f64::from(self.norm())
    }
}
