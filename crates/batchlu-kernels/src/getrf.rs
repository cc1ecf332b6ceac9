//! LU factorization with optional partial pivoting.
//!
//! Small problems go straight to the unblocked [`getf2`]. Larger ones use a
//! right-looking blocked algorithm: each `NB`-column panel is packed into
//! `work3` and factored by GETF2 against panel-local pivots (`iipiv`) and
//! info (`iinfo`), which are then merged into the global ones before the row
//! interchanges, the TRSM on `A12` and the GEMM on `A22`.

use crate::getrs::pivot_row;
use crate::mat::MatMut;
use crate::memory::{GETRF_BLOCK_SIZE, pass_cols, uses_blocked_getrf};
use crate::trsm::{apply_inverse_block, invert_triangle};
use batchlu_core::{LapackInt, Scalar};
use num_traits::Zero;
use std::ops::Range;

/// Pivot-search staging slots.
#[derive(Debug)]
pub struct PivotStage<'a, T, I> {
    pub value: &'a mut T,
    pub index: &'a mut I,
}

/// Per-instance GETRF scratch. Empty slices for roles the plan sized at zero.
#[derive(Debug)]
pub struct GetrfScratch<'a, T, I> {
    pub scalars: &'a [T],
    pub work1: &'a mut [T],
    pub work2: &'a mut [T],
    pub work3: &'a mut [T],
    pub pivotval: &'a mut [T],
    pub pivotidx: &'a mut [I],
    pub iipiv: &'a mut [I],
    pub iinfo: &'a mut [I],
}

/// Record `col` (1-based) as the first zero pivot unless one is already set.
#[inline]
fn merge_info<I: LapackInt>(info: &mut I, col: usize) {
    if info.is_zero() {
        *info = I::from_index(col);
    }
}

/// Row of the entry with the largest `|re| + |im|` in column `j`, rows `j..m`.
/// Ties go to the first occurrence.
fn iamax<T: Scalar>(a: &MatMut<'_, T>, j: usize) -> usize {
    let mut best = j;
    let mut best_mag = a.get(j, j).abs1();
    for i in j + 1..a.rows() {
        let mag = a.get(i, j).abs1();
        if mag > best_mag {
            best = i;
            best_mag = mag;
        }
    }
    best
}

/// Unblocked LU of `a` in place.
///
/// With `pivoting`, the chosen row of step `j` is written 1-based to
/// `ipiv[j]` and whole rows of `a` are interchanged. Returns the first
/// column (0-based) whose pivot is exactly zero; elimination continues past
/// it without scaling that column.
pub fn getf2<T: Scalar, I: LapackInt>(
    a: &mut MatMut<'_, T>,
    mut pivoting: Option<(&mut [I], PivotStage<'_, T, I>)>,
) -> Option<usize> {
    let (m, n) = (a.rows(), a.cols());
    let mut first_zero = None;

    for j in 0..m.min(n) {
        let pivot = match pivoting.as_mut() {
            Some((ipiv, stage)) => {
                let p = iamax(a, j);
                *stage.index = I::from_index(p + 1);
                *stage.value = a.get(p, j);
                ipiv[j] = *stage.index;
                a.swap_rows(j, p);
                *stage.value
            }
            None => a.get(j, j),
        };

        if pivot != T::zero() {
            let r = T::one() / pivot;
            for i in j + 1..m {
                *a.at_mut(i, j) *= r;
            }
        } else if first_zero.is_none() {
            first_zero = Some(j);
        }

        for c in j + 1..n {
            let u = a.get(j, c);
            if u == T::zero() {
                continue;
            }
            for i in j + 1..m {
                let l = a.get(i, j);
                *a.at_mut(i, c) -= l * u;
            }
        }
    }
    first_zero
}

/// `A[rows, cols] = beta·A[rows, cols] + alpha·A[rows, inner]·A[inner, cols]`.
fn gemm_update<T: Scalar>(
    a: &mut MatMut<'_, T>,
    rows: Range<usize>,
    cols: Range<usize>,
    inner: Range<usize>,
    alpha: T,
    beta: T,
) {
    for c in cols {
        if beta != T::one() {
            for r in rows.clone() {
                *a.at_mut(r, c) *= beta;
            }
        }
        for k in inner.clone() {
            let b = a.get(k, c);
            if b == T::zero() {
                continue;
            }
            let s = alpha * b;
            for r in rows.clone() {
                let l = a.get(r, k);
                *a.at_mut(r, c) += l * s;
            }
        }
    }
}

/// LU factorization of one instance in place.
///
/// `info` is only raised, never cleared: callers reset it first.
pub fn getrf<T: Scalar, I: LapackInt>(
    a: &mut MatMut<'_, T>,
    mut ipiv: Option<&mut [I]>,
    info: &mut I,
    scratch: GetrfScratch<'_, T, I>,
    optim_mem: bool,
) {
    let (m, n) = (a.rows(), a.cols());
    let k = m.min(n);
    if k == 0 {
        return;
    }
    let GetrfScratch {
        scalars,
        work1,
        work2,
        work3,
        pivotval,
        pivotidx,
        iipiv,
        iinfo,
    } = scratch;

    let mut spare_value = T::zero();
    let mut spare_index = I::zero();
    let (value, index) = match (pivotval.first_mut(), pivotidx.first_mut()) {
        (Some(v), Some(i)) => (v, i),
        _ => (&mut spare_value, &mut spare_index),
    };

    if !uses_blocked_getrf(m, n) {
        let pivoting = ipiv.map(|p| (p, PivotStage { value, index }));
        if let Some(col) = getf2(a, pivoting) {
            merge_info(info, col + 1);
        }
        return;
    }

    let minus_one = scalars.first().copied().unwrap_or(-T::one());
    let one = scalars.get(2).copied().unwrap_or_else(T::one);
    let nb = GETRF_BLOCK_SIZE;
    let pass = pass_cols(n - nb, work1.len(), nb, optim_mem);

    for j in (0..k).step_by(nb) {
        let jb = nb.min(k - j);
        let prows = m - j;
        let panel = &mut work3[..prows * jb];

        for c in 0..jb {
            for r in 0..prows {
                panel[r + c * prows] = a.get(j + r, j + c);
            }
        }
        let local_pivots = ipiv.as_ref().map(|_| {
            (
                &mut iipiv[..jb],
                PivotStage {
                    value: &mut *value,
                    index: &mut *index,
                },
            )
        });
        let panel_zero = getf2(&mut MatMut::new(panel, prows, jb, prows), local_pivots);
        for c in 0..jb {
            for r in 0..prows {
                a.set(j + r, j + c, panel[r + c * prows]);
            }
        }

        let shadow = panel_zero.map_or_else(I::zero, |c| I::from_index(c + 1));
        if let Some(slot) = iinfo.first_mut() {
            *slot = shadow;
        }
        if !shadow.is_zero() {
            merge_info(info, shadow.as_index() + j);
        }

        if let Some(ipiv) = ipiv.as_deref_mut() {
            for i in 0..jb {
                let p = pivot_row(iipiv[i], prows) + j;
                ipiv[j + i] = I::from_index(p + 1);
                a.swap_rows_in(j + i, p, 0..j);
                a.swap_rows_in(j + i, p, j + jb..n);
            }
        }

        if j + jb < n {
            let ncols = n - j - jb;
            let inv = &mut work2[..jb * jb];
            invert_triangle(|r, c| a.get(j + r, j + c), jb, true, true, inv);
            apply_inverse_block(inv, jb, a, j, j + jb, ncols, work1, pass);
            if j + jb < m {
                gemm_update(a, j + jb..m, j + jb..n, j..j + jb, minus_one, one);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_vecs(m: usize, n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<i32>) {
        let nb = GETRF_BLOCK_SIZE;
        (
            vec![-1.0, 0.0, 1.0],
            vec![0.0; nb * n],
            vec![0.0; nb * nb],
            vec![0.0; m * nb],
            vec![0; nb],
        )
    }

    #[test]
    fn test_getf2_matches_hand_factorization() {
        // A = [[2, 1, 1], [4, -6, 0], [-2, 7, 2]] column-major
        let mut a: Vec<f64> = vec![2.0, 4.0, -2.0, 1.0, -6.0, 7.0, 1.0, 0.0, 2.0];
        let mut ipiv = [0i32; 3];
        let (mut v, mut i) = (0.0, 0i32);
        let zero = getf2(
            &mut MatMut::new(&mut a, 3, 3, 3),
            Some((
                &mut ipiv[..],
                PivotStage {
                    value: &mut v,
                    index: &mut i,
                },
            )),
        );
        assert_eq!(zero, None);
        assert_eq!(ipiv, [2, 2, 3]);
        // U diagonal: 4, 4, 1
        assert_eq!(a[0], 4.0);
        assert_eq!(a[4], 4.0);
        assert!((a[8] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_getf2_reports_first_zero_pivot_and_continues() {
        let mut a: Vec<f64> = vec![1.0, 2.0, 4.0, 1.0, 2.0, 4.0, 1.0, 2.0, 4.0];
        let mut ipiv = [0i32; 3];
        let (mut v, mut i) = (0.0, 0i32);
        let zero = getf2(
            &mut MatMut::new(&mut a, 3, 3, 3),
            Some((
                &mut ipiv[..],
                PivotStage {
                    value: &mut v,
                    index: &mut i,
                },
            )),
        );
        assert_eq!(zero, Some(1));
        assert_eq!(ipiv[0], 3);
        assert!(a.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_npvt_keeps_row_order() {
        let mut a = vec![4.0, 2.0, 2.0, 3.0];
        let zero = getf2::<f64, i32>(&mut MatMut::new(&mut a, 2, 2, 2), None);
        assert_eq!(zero, None);
        assert_eq!(a, vec![4.0, 0.5, 2.0, 2.0]);
    }

    #[test]
    fn test_blocked_agrees_with_unblocked() {
        let n = 48;
        let mut seed = 7u64;
        let original: Vec<f64> = (0..n * n)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((seed >> 33) as f64 / (1u64 << 31) as f64) - 0.5
            })
            .collect();

        let mut reference = original.clone();
        let mut ref_piv = vec![0i32; n];
        let (mut v, mut i) = (0.0, 0i32);
        getf2(
            &mut MatMut::new(&mut reference, n, n, n),
            Some((
                &mut ref_piv[..],
                PivotStage {
                    value: &mut v,
                    index: &mut i,
                },
            )),
        );

        let mut blocked = original;
        let mut piv = vec![0i32; n];
        let mut info = 0i32;
        let (scalars, mut w1, mut w2, mut w3, mut iipiv) = scratch_vecs(n, n);
        let (mut pv, mut pi, mut ii) = (vec![0.0], vec![0i32], vec![0i32]);
        getrf(
            &mut MatMut::new(&mut blocked, n, n, n),
            Some(&mut piv[..]),
            &mut info,
            GetrfScratch {
                scalars: &scalars,
                work1: &mut w1,
                work2: &mut w2,
                work3: &mut w3,
                pivotval: &mut pv,
                pivotidx: &mut pi,
                iipiv: &mut iipiv,
                iinfo: &mut ii,
            },
            true,
        );

        assert_eq!(info, 0);
        assert_eq!(piv, ref_piv);
        for (x, y) in blocked.iter().zip(&reference) {
            assert!((x - y).abs() < 1e-10, "{x} vs {y}");
        }
    }
}
