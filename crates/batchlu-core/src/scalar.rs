//! Numeric element kinds: real and complex, single and double precision.

use num_complex::Complex;
use num_traits::{Float, NumAssign};
use std::fmt::Debug;
use std::ops::Neg;

/// The four element kinds a batched operation can be instantiated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `f32`
    Real32,
    /// `f64`
    Real64,
    /// `Complex<f32>`
    Complex32,
    /// `Complex<f64>`
    Complex64,
}

impl ElementKind {
    /// LAPACK routine prefix (`s`, `d`, `c`, `z`).
    pub fn prefix(self) -> char {
        match self {
            ElementKind::Real32 => 's',
            ElementKind::Real64 => 'd',
            ElementKind::Complex32 => 'c',
            ElementKind::Complex64 => 'z',
        }
    }

    /// Parse from a LAPACK prefix character.
    pub fn from_prefix(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            's' => Some(ElementKind::Real32),
            'd' => Some(ElementKind::Real64),
            'c' => Some(ElementKind::Complex32),
            'z' => Some(ElementKind::Complex64),
            _ => None,
        }
    }

    /// Whether the kind is complex.
    pub fn is_complex(self) -> bool {
        matches!(self, ElementKind::Complex32 | ElementKind::Complex64)
    }
}

/// Element type of a matrix operand.
pub trait Scalar:
    NumAssign + Copy + Neg<Output = Self> + Send + Sync + Debug + PartialEq + 'static
{
    /// Underlying real type.
    type Real: Float + Send + Sync + Debug;

    /// Element kind tag.
    const KIND: ElementKind;

    /// `|re| + |im|`, the magnitude LAPACK uses for pivot selection.
    fn abs1(self) -> Self::Real;

    /// Euclidean modulus.
    fn modulus(self) -> Self::Real;

    /// Complex conjugate (identity for real kinds).
    fn conj(self) -> Self;

    /// Embed a real value.
    fn from_real(re: Self::Real) -> Self;
}

macro_rules! impl_real_scalar {
    ($t:ty, $kind:expr) => {
        impl Scalar for $t {
            type Real = $t;
            const KIND: ElementKind = $kind;

            #[inline]
            fn abs1(self) -> $t {
                self.abs()
            }

            #[inline]
            fn modulus(self) -> $t {
                self.abs()
            }

            #[inline]
            fn conj(self) -> $t {
                self
            }

            #[inline]
            fn from_real(re: $t) -> $t {
                re
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($t:ty, $kind:expr) => {
        impl Scalar for Complex<$t> {
            type Real = $t;
            const KIND: ElementKind = $kind;

            #[inline]
            fn abs1(self) -> $t {
                self.re.abs() + self.im.abs()
            }

            #[inline]
            fn modulus(self) -> $t {
                self.norm()
            }

            #[inline]
            fn conj(self) -> Self {
                Complex::new(self.re, -self.im)
            }

            #[inline]
            fn from_real(re: $t) -> Self {
                Complex::new(re, 0.0)
            }
        }
    };
}

impl_real_scalar!(f32, ElementKind::Real32);
impl_real_scalar!(f64, ElementKind::Real64);
impl_complex_scalar!(f32, ElementKind::Complex32);
impl_complex_scalar!(f64, ElementKind::Complex64);
