//! Integer index widths for dimensions, pivots and info.

use crate::error::{Error, Result};
use num_traits::{PrimInt, Signed};
use std::fmt::{Debug, Display};

/// Signed integer type used for dimensions, pivot indices and info values.
///
/// Dimensions are signed so that negative sizes can be expressed by the
/// caller and rejected by validation.
pub trait LapackInt: PrimInt + Signed + Default + Send + Sync + Debug + Display + 'static {
    /// Width in bits.
    const BITS: u32;

    /// Whether entry points for this width are compiled in.
    const SUPPORTED: bool;

    /// Convert a value already known to be non-negative.
    fn as_index(self) -> usize;

    /// Convert an index that fits the width (validated dimensions guarantee it).
    fn from_index(v: usize) -> Self;
}

impl LapackInt for i32 {
    const BITS: u32 = 32;
    const SUPPORTED: bool = true;

    #[inline]
    fn as_index(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_index(v: usize) -> Self {
        v as i32
    }
}

impl LapackInt for i64 {
    const BITS: u32 = 64;
    const SUPPORTED: bool = cfg!(feature = "ilp64");

    #[inline]
    fn as_index(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_index(v: usize) -> Self {
        v as i64
    }
}

/// Fail with `NotImplemented` when the index width is not compiled in.
pub fn check_index_width<I: LapackInt>() -> Result<()> {
    if I::SUPPORTED {
        Ok(())
    } else {
        Err(Error::NotImplemented(
            "64-bit index entry points require the `ilp64` feature",
        ))
    }
}
