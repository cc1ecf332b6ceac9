//! Core types for batched LU factorization and solve.
//!
//! - [`Scalar`]: the four element kinds (real/complex, single/double)
//! - [`LapackInt`]: 32-bit and 64-bit index widths
//! - [`BatchMut`] / [`BatchRef`]: single, strided and pointer-array operands
//! - [`WorkspacePlan`]: byte sizes of every scratch role
//! - [`Error`] / [`Status`]: the error taxonomy

pub mod batch;
pub mod error;
pub mod index;
pub mod plan;
pub mod scalar;

pub use batch::{BatchMode, BatchMut, BatchRef, Footprint};
pub use error::{Error, Result, Status};
pub use index::{LapackInt, check_index_width};
pub use plan::{WorkRole, WorkspacePlan, WorkspaceSizes};
pub use scalar::{ElementKind, Scalar};

pub use num_complex::{Complex, Complex32, Complex64};

/// Which form of the coefficient matrix a solve applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    /// `A·X = B`
    #[default]
    None,
    /// `Aᵀ·X = B`
    Transpose,
    /// `Aᴴ·X = B`
    ConjugateTranspose,
}

impl Operation {
    /// Parse from the LAPACK character (`N`, `T`, `C`).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Operation::None),
            'T' => Some(Operation::Transpose),
            'C' => Some(Operation::ConjugateTranspose),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operation::None => 'N',
            Operation::Transpose => 'T',
            Operation::ConjugateTranspose => 'C',
        }
    }
}
