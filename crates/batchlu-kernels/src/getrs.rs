//! Solve from an LU factorization.

use crate::mat::{MatMut, MatRef};
use crate::trsm::{Triangle, TrsmScratch, trsm_left};
use batchlu_core::{LapackInt, Operation, Scalar};

/// Zero-based row for the one-based pivot `p`.
#[inline]
pub(crate) fn pivot_row<I: LapackInt>(p: I, rows: usize) -> usize {
    let row = p.as_index();
    assert!((1..=rows).contains(&row), "pivot {row} outside 1..={rows}");
    row - 1
}

/// Apply the interchanges `ipiv[0..]` to the rows of `x`, first to last.
///
/// # Panics
///
/// Panics if a pivot lies outside `1..=x.rows()`.
pub fn laswp_forward<T: Scalar, I: LapackInt>(x: &mut MatMut<'_, T>, ipiv: &[I]) {
    let (rows, cols) = (x.rows(), x.cols());
    for (k, &p) in ipiv.iter().enumerate() {
        x.swap_rows_in(k, pivot_row(p, rows), 0..cols);
    }
}

/// Apply the interchanges `ipiv[0..]` to the rows of `x`, last to first.
///
/// # Panics
///
/// Panics if a pivot lies outside `1..=x.rows()`.
pub fn laswp_backward<T: Scalar, I: LapackInt>(x: &mut MatMut<'_, T>, ipiv: &[I]) {
    let (rows, cols) = (x.rows(), x.cols());
    for (k, &p) in ipiv.iter().enumerate().rev() {
        x.swap_rows_in(k, pivot_row(p, rows), 0..cols);
    }
}

/// Solve `op(A)·X = B` for one instance, overwriting `b` with `X`.
///
/// `a` holds the unit-lower `L` and upper `U` factors from GETRF; `ipiv`
/// is `None` for factorizations computed without pivoting.
pub fn getrs<T: Scalar, I: LapackInt>(
    op: Operation,
    a: MatRef<'_, T>,
    ipiv: Option<&[I]>,
    b: &mut MatMut<'_, T>,
    scratch: &mut TrsmScratch<'_, T>,
    optim_mem: bool,
) {
    let n = a.rows();
    if n == 0 || b.cols() == 0 {
        return;
    }
    let ipiv = ipiv.map(|p| &p[..n]);

    match op {
        Operation::None => {
            if let Some(p) = ipiv {
                laswp_forward(b, p);
            }
            let lower = Triangle {
                a,
                lower: true,
                unit: true,
                op,
            };
            trsm_left(lower, b, scratch, optim_mem);
            let upper = Triangle {
                a,
                lower: false,
                unit: false,
                op,
            };
            trsm_left(upper, b, scratch, optim_mem);
        }
        Operation::Transpose | Operation::ConjugateTranspose => {
            // op(U) is lower, op(L) is upper
            let u = Triangle {
                a,
                lower: true,
                unit: false,
                op,
            };
            trsm_left(u, b, scratch, optim_mem);
            let l = Triangle {
                a,
                lower: false,
                unit: true,
                op,
            };
            trsm_left(l, b, scratch, optim_mem);
            if let Some(p) = ipiv {
                laswp_backward(b, p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::getrf::{PivotStage, getf2};

    fn factor(a: &mut [f64], n: usize) -> Vec<i32> {
        let mut ipiv = vec![0i32; n];
        let (mut v, mut i) = (0.0, 0i32);
        getf2(
            &mut MatMut::new(a, n, n, n),
            Some((
                &mut ipiv[..],
                PivotStage {
                    value: &mut v,
                    index: &mut i,
                },
            )),
        );
        ipiv
    }

    fn solve(op: Operation, a: &[f64], ipiv: &[i32], b: &mut [f64], n: usize) {
        let mut temp = vec![0.0; n];
        let mut inv = vec![0.0; n * n];
        let mut scratch = TrsmScratch {
            temp: &mut temp,
            inv: &mut inv,
        };
        getrs(
            op,
            MatRef::new(a, n, n, n),
            Some(ipiv),
            &mut MatMut::new(b, n, 1, n),
            &mut scratch,
            true,
        );
    }

    #[test]
    fn solves_three_by_three() {
        let mut a = vec![2.0, 4.0, -2.0, 1.0, -6.0, 7.0, 1.0, 0.0, 2.0];
        let ipiv = factor(&mut a, 3);
        let mut b = vec![5.0, -2.0, 9.0];
        solve(Operation::None, &a, &ipiv, &mut b, 3);
        for (x, e) in b.iter().zip([1.0, 1.0, 2.0]) {
            assert!((x - e).abs() < 1e-12);
        }
    }

    #[test]
    fn solves_transposed_system() {
        // A^T x = b with x = [1, 1, 2]: columns of A dotted with x
        let original = [2.0, 4.0, -2.0, 1.0, -6.0, 7.0, 1.0, 0.0, 2.0];
        let x = [1.0, 1.0, 2.0];
        let mut b: Vec<f64> = (0..3)
            .map(|c| (0..3).map(|r| original[r + 3 * c] * x[r]).sum())
            .collect();
        let mut a = original.to_vec();
        let ipiv = factor(&mut a, 3);
        solve(Operation::Transpose, &a, &ipiv, &mut b, 3);
        for (got, e) in b.iter().zip(x) {
            assert!((got - e).abs() < 1e-12);
        }
    }

    #[test]
    fn swaps_round_trip() {
        let mut data = vec![1.0, 2.0, 3.0];
        let ipiv = [3i32, 3, 3];
        let mut x = MatMut::new(&mut data, 3, 1, 3);
        laswp_forward(&mut x, &ipiv);
        laswp_backward(&mut x, &ipiv);
        assert_eq!(data, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "pivot 0 outside 1..=3")]
    fn zero_pivot_is_rejected() {
        let mut data = vec![1.0, 2.0, 3.0];
        let mut x = MatMut::new(&mut data, 3, 1, 3);
        laswp_forward(&mut x, &[1i32, 0, 3]);
    }

    #[test]
    #[should_panic(expected = "outside 1..=3")]
    fn pivot_past_last_row_is_rejected() {
        let mut data = vec![1.0, 2.0, 3.0];
        let mut x = MatMut::new(&mut data, 3, 1, 3);
        laswp_backward(&mut x, &[4i32, 2, 3]);
    }
}
