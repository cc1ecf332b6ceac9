//! Blocked left-side triangular solve.
//!
//! `op(A)·X = B` is solved block row by block row: each `nb × nb` diagonal
//! block is inverted into `work2`, applied to the matching rows of `X`
//! through the `work1` product temp, and the remaining rows are updated.

use crate::mat::{MatMut, MatRef};
use crate::memory::{TRSM_BLOCK_SIZE, pass_cols};
use batchlu_core::{Operation, Scalar};

/// Triangular factor as seen through `op`.
#[derive(Debug, Clone, Copy)]
pub struct Triangle<'a, T> {
    pub a: MatRef<'a, T>,
    /// Whether `op(A)` is lower triangular.
    pub lower: bool,
    /// Whether the diagonal is implicitly one.
    pub unit: bool,
    pub op: Operation,
}

impl<T: Scalar> Triangle<'_, T> {
    /// Element `(i, j)` of `op(A)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        match self.op {
            Operation::None => self.a.get(i, j),
            Operation::Transpose => self.a.get(j, i),
            Operation::ConjugateTranspose => self.a.get(j, i).conj(),
        }
    }

    #[inline]
    fn order(&self) -> usize {
        self.a.rows()
    }
}

/// Per-instance TRSM scratch.
#[derive(Debug)]
pub struct TrsmScratch<'a, T> {
    /// Product temp (`work1`), at least `nb` elements.
    pub temp: &'a mut [T],
    /// Inverted diagonal block (`work2`), at least `nb²` elements.
    pub inv: &'a mut [T],
}

/// Invert an `nb × nb` triangle given elementwise into `out` (leading dimension `nb`).
///
/// Entries outside the triangle are written as zero. A zero diagonal yields
/// non-finite values, never a panic.
pub fn invert_triangle<T: Scalar>(
    get: impl Fn(usize, usize) -> T,
    nb: usize,
    lower: bool,
    unit: bool,
    out: &mut [T],
) {
    let diag_inv = |i: usize| {
        if unit {
            T::one()
        } else {
            T::one() / get(i, i)
        }
    };

    for j in 0..nb {
        for i in 0..nb {
            out[i + j * nb] = T::zero();
        }
        out[j + j * nb] = diag_inv(j);
        if lower {
            for i in j + 1..nb {
                let mut s = T::zero();
                for k in j..i {
                    s += get(i, k) * out[k + j * nb];
                }
                out[i + j * nb] = -s * diag_inv(i);
            }
        } else {
            for i in (0..j).rev() {
                let mut s = T::zero();
                for k in i + 1..=j {
                    s += get(i, k) * out[k + j * nb];
                }
                out[i + j * nb] = -s * diag_inv(i);
            }
        }
    }
}

/// Overwrite rows `row0..row0+nb` of columns `col0..col0+ncols` of `x` with
/// `inv · x`, `pass` columns at a time through `temp`.
#[allow(clippy::too_many_arguments)]
pub fn apply_inverse_block<T: Scalar>(
    inv: &[T],
    nb: usize,
    x: &mut MatMut<'_, T>,
    row0: usize,
    col0: usize,
    ncols: usize,
    temp: &mut [T],
    pass: usize,
) {
    let mut c0 = 0;
    while c0 < ncols {
        let w = pass.min(ncols - c0);
        let t = &mut temp[..nb * w];
        t.fill(T::zero());
        for c in 0..w {
            for k in 0..nb {
                let xv = x.get(row0 + k, col0 + c0 + c);
                if xv == T::zero() {
                    continue;
                }
                for r in 0..nb {
                    t[r + c * nb] += inv[r + k * nb] * xv;
                }
            }
        }
        for c in 0..w {
            for r in 0..nb {
                x.set(row0 + r, col0 + c0 + c, t[r + c * nb]);
            }
        }
        c0 += w;
    }
}

/// Solve `op(A)·X = B` in place on `x` for a triangular `op(A)`.
pub fn trsm_left<T: Scalar>(
    tri: Triangle<'_, T>,
    x: &mut MatMut<'_, T>,
    scratch: &mut TrsmScratch<'_, T>,
    optim_mem: bool,
) {
    let n = tri.order();
    let ncols = x.cols();
    if n == 0 || ncols == 0 {
        return;
    }
    let nb = TRSM_BLOCK_SIZE.min(n);
    let pass = pass_cols(ncols, scratch.temp.len(), nb, optim_mem);

    let mut starts: Vec<usize> = (0..n).step_by(nb).collect();
    if !tri.lower {
        starts.reverse();
    }

    for k0 in starts {
        let kb = nb.min(n - k0);
        let inv = &mut scratch.inv[..kb * kb];
        invert_triangle(|i, j| tri.get(k0 + i, k0 + j), kb, tri.lower, tri.unit, inv);
        apply_inverse_block(inv, kb, x, k0, 0, ncols, scratch.temp, pass);

        let rest = if tri.lower { k0 + kb..n } else { 0..k0 };
        if rest.is_empty() {
            continue;
        }
        for c in 0..ncols {
            for k in k0..k0 + kb {
                let xv = x.get(k, c);
                if xv == T::zero() {
                    continue;
                }
                for r in rest.clone() {
                    *x.at_mut(r, c) -= tri.get(r, k) * xv;
                }
            }
        }
    }
}
