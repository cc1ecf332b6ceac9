//! Inversion from an LU factorization.

use crate::auxiliary::set_identity;
use crate::getrs::getrs;
use crate::mat::{MatMut, MatRef};
use crate::trsm::TrsmScratch;
use batchlu_core::{LapackInt, Operation, Scalar};

/// First `k` (1-based) with `U(k,k) == 0`.
pub fn singular_diagonal<T: Scalar>(a: MatRef<'_, T>) -> Option<usize> {
    (0..a.rows()).find(|&k| a.get(k, k) == T::zero()).map(|k| k + 1)
}

/// Write `A⁻¹` into `c`. A singular `U` sets `info` and leaves `c` untouched.
pub fn getri_outofplace<T: Scalar, I: LapackInt>(
    a: MatRef<'_, T>,
    ipiv: Option<&[I]>,
    c: &mut MatMut<'_, T>,
    info: &mut I,
    scratch: &mut TrsmScratch<'_, T>,
    optim_mem: bool,
) {
    if a.rows() == 0 {
        return;
    }
    if let Some(k) = singular_diagonal(a) {
        *info = I::from_index(k);
        return;
    }
    set_identity(c);
    getrs(Operation::None, a, ipiv, c, scratch, optim_mem);
}

/// Overwrite the factors in `a` with `A⁻¹`, staging them in `work4`.
pub fn getri<T: Scalar, I: LapackInt>(
    a: &mut MatMut<'_, T>,
    ipiv: Option<&[I]>,
    info: &mut I,
    work4: &mut [T],
    scratch: &mut TrsmScratch<'_, T>,
    optim_mem: bool,
) {
    let n = a.rows();
    if n == 0 {
        return;
    }
    if let Some(k) = singular_diagonal(a.as_ref()) {
        *info = I::from_index(k);
        return;
    }
    let factors = &mut work4[..n * n];
    for j in 0..n {
        for i in 0..n {
            factors[i + j * n] = a.get(i, j);
        }
    }
    set_identity(a);
    getrs(
        Operation::None,
        MatRef::new(factors, n, n, n),
        ipiv,
        a,
        scratch,
        optim_mem,
    );
}
