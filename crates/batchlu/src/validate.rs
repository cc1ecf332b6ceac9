//! Argument validation shared by every operation.
//!
//! Validators run in a fixed order: value arguments, then sizes, then
//! pointers. Pointer checks are skipped in size-query mode (`buffers` is
//! `None`). A buffer is "null" when it is empty.

use batchlu_core::{Error, LapackInt, Result};

/// Which operand buffers were supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferPresence {
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub x: bool,
    pub ipiv: bool,
    pub info: bool,
}

/// `InvalidSize` for `argument` when `violated`.
#[inline]
pub(crate) fn size(violated: bool, argument: &'static str) -> Result<()> {
    if violated {
        Err(Error::InvalidSize { argument })
    } else {
        Ok(())
    }
}

/// `InvalidPointer` for `argument` when it is `needed` but not `present`.
#[inline]
pub(crate) fn pointer(needed: bool, present: bool, argument: &'static str) -> Result<()> {
    if needed && !present {
        Err(Error::InvalidPointer { argument })
    } else {
        Ok(())
    }
}

/// Validated dimension as an extent.
#[inline]
pub(crate) fn extent<I: LapackInt>(v: I) -> usize {
    v.max(I::zero()).as_index()
}

/// Info vector with room for `batch` entries.
pub(crate) fn info_slots<I>(info: &mut [I], batch: usize) -> Result<&mut [I]> {
    let actual = info.len();
    info.get_mut(..batch).ok_or(Error::BufferTooSmall {
        argument: "info",
        required: batch,
        actual,
    })
}
