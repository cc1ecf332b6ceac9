//! Workspace sizing for every engine.
//!
//! All functions are pure and return byte sizes per scratch role together
//! with the optimized-memory flag. Degenerate problems need nothing.

use batchlu_core::{LapackInt, Operation, Scalar, WorkspacePlan, WorkspaceSizes};
use std::mem::size_of;

/// Largest `min(m, n)` factored directly by the unblocked GETF2 engine.
pub const GETF2_SWITCH_SIZE: usize = 32;

/// Panel width (`NB`) of the blocked GETRF.
pub const GETRF_BLOCK_SIZE: usize = 32;

/// Diagonal block size of the blocked TRSM.
pub const TRSM_BLOCK_SIZE: usize = 32;

/// Right-hand-side columns above which TRSM falls back to multi-pass.
pub const TRSM_MAX_PASS_COLS: usize = 1024;

/// Threads per block of one-dimensional launches (`BS1`).
pub const RESET_BLOCK_SIZE: usize = 256;

/// Tile edge of the matrix copy launch.
pub const COPY_TILE: usize = 32;

/// Product of `factors`, saturating at `usize::MAX`.
fn bytes(factors: &[usize]) -> usize {
    factors.iter().fold(1, |acc, &f| acc.saturating_mul(f))
}

/// Whether GETRF on an `m × n` matrix takes the blocked path.
pub fn uses_blocked_getrf(m: usize, n: usize) -> bool {
    m.min(n) > GETF2_SWITCH_SIZE
}

/// Number of right-hand-side columns one TRSM pass can handle through a
/// `temp_len`-element product temp.
pub fn pass_cols(ncols: usize, temp_len: usize, nb: usize, optim_mem: bool) -> usize {
    if optim_mem && temp_len >= nb.saturating_mul(ncols) {
        ncols
    } else {
        (temp_len / nb.max(1)).clamp(1, ncols.max(1))
    }
}

/// Blocked TRSM with `nb`-sized diagonal blocks over `ncols` right-hand sides.
pub fn trsm_memory_size<T: Scalar>(nb: usize, ncols: usize, batch: usize) -> WorkspacePlan {
    if nb == 0 || ncols == 0 || batch == 0 {
        return WorkspacePlan::empty();
    }
    let el = size_of::<T>();
    let pass = ncols.min(TRSM_MAX_PASS_COLS);
    WorkspacePlan {
        sizes: WorkspaceSizes {
            work1: bytes(&[batch, nb, pass, el]),
            work2: bytes(&[batch, nb, nb, el]),
            ..Default::default()
        },
        optim_mem: ncols <= TRSM_MAX_PASS_COLS,
    }
}

/// GETRF on `m × n` matrices.
pub fn getrf_memory_size<T: Scalar, I: LapackInt>(
    m: usize,
    n: usize,
    pivot: bool,
    batch: usize,
) -> WorkspacePlan {
    if m == 0 || n == 0 || batch == 0 {
        return WorkspacePlan::empty();
    }
    let el = size_of::<T>();
    let ix = size_of::<I>();

    let mut sizes = WorkspaceSizes {
        scalars: 3 * el,
        ..Default::default()
    };
    if pivot {
        sizes.pivotval = bytes(&[batch, el]);
        sizes.pivotidx = bytes(&[batch, ix]);
    }

    if !uses_blocked_getrf(m, n) {
        return WorkspacePlan {
            sizes,
            optim_mem: true,
        };
    }

    let nb = GETRF_BLOCK_SIZE;
    if pivot {
        sizes.iipiv = bytes(&[batch, nb, ix]);
    }
    sizes.iinfo = bytes(&[batch, ix]);
    sizes.work3 = bytes(&[batch, m, nb, el]);

    let trsm = trsm_memory_size::<T>(nb, n - nb, batch);
    sizes.work1 = trsm.sizes.work1;
    sizes.work2 = trsm.sizes.work2;

    WorkspacePlan {
        sizes,
        optim_mem: trsm.optim_mem,
    }
}

/// GETRS with `nrhs` right-hand sides.
pub fn getrs_memory_size<T: Scalar>(
    _op: Operation,
    n: usize,
    nrhs: usize,
    batch: usize,
) -> WorkspacePlan {
    if n == 0 || nrhs == 0 || batch == 0 {
        return WorkspacePlan::empty();
    }
    trsm_memory_size::<T>(n.min(TRSM_BLOCK_SIZE), nrhs, batch)
}

/// Out-of-place GETRI: a GETRS against the identity.
pub fn getri_outofplace_memory_size<T: Scalar>(n: usize, batch: usize) -> WorkspacePlan {
    getrs_memory_size::<T>(Operation::None, n, n, batch)
}

/// In-place GETRI: the out-of-place sizes plus a copy of the factors.
pub fn getri_memory_size<T: Scalar>(n: usize, batch: usize) -> WorkspacePlan {
    let mut plan = getri_outofplace_memory_size::<T>(n, batch);
    if n > 0 && batch > 0 {
        plan.sizes.work4 = bytes(&[batch, n, n, size_of::<T>()]);
    }
    plan
}
