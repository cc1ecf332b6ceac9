//! Auxiliary per-instance kernels.

use crate::mat::{MatMut, MatRef};
use crate::memory::COPY_TILE;
use batchlu_core::{LapackInt, Scalar};

/// Set every info entry to `value`.
pub fn reset_info<I: LapackInt>(info: &mut [I], value: I) {
    info.fill(value);
}

/// Copy `src` into `dst` tile by tile.
pub fn copy_mat<T: Scalar>(src: MatRef<'_, T>, dst: &mut MatMut<'_, T>) {
    let (rows, cols) = (src.rows().min(dst.rows()), src.cols().min(dst.cols()));
    for c0 in (0..cols).step_by(COPY_TILE) {
        for r0 in (0..rows).step_by(COPY_TILE) {
            for c in c0..(c0 + COPY_TILE).min(cols) {
                for r in r0..(r0 + COPY_TILE).min(rows) {
                    dst.set(r, c, src.get(r, c));
                }
            }
        }
    }
}

/// Overwrite `a` with the identity.
pub fn set_identity<T: Scalar>(a: &mut MatMut<'_, T>) {
    for c in 0..a.cols() {
        for r in 0..a.rows() {
            a.set(r, c, if r == c { T::one() } else { T::zero() });
        }
    }
}

/// Fill the scalar constants `[-1, 0, 1]`.
pub fn init_scalars<T: Scalar>(scalars: &mut [T]) {
    for (slot, v) in scalars.iter_mut().zip([-T::one(), T::zero(), T::one()]) {
        *slot = v;
    }
}
