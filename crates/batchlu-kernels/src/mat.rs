//! Per-instance column-major matrix views.

use batchlu_core::Scalar;
use std::ops::Range;

/// Mutable view of one `rows × cols` column-major matrix with leading dimension `ld`.
#[derive(Debug)]
pub struct MatMut<'a, T> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    ld: usize,
}

/// Read-only view of one column-major matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatRef<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a, T: Scalar> MatMut<'a, T> {
    pub fn new(data: &'a mut [T], rows: usize, cols: usize, ld: usize) -> Self {
        debug_assert!(ld >= rows);
        debug_assert!(rows == 0 || cols == 0 || data.len() >= ld * (cols - 1) + rows);
        Self {
            data,
            rows,
            cols,
            ld,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i + j * self.ld]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: T) {
        self.data[i + j * self.ld] = v;
    }

    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i + j * self.ld]
    }

    /// Reborrow as a read-only view.
    pub fn as_ref(&self) -> MatRef<'_, T> {
        MatRef {
            data: self.data,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
        }
    }

    /// Swap rows `r1` and `r2` over the given column range.
    pub fn swap_rows_in(&mut self, r1: usize, r2: usize, cols: Range<usize>) {
        if r1 == r2 {
            return;
        }
        for c in cols {
            self.data.swap(r1 + c * self.ld, r2 + c * self.ld);
        }
    }

    /// Swap rows `r1` and `r2` across every column.
    pub fn swap_rows(&mut self, r1: usize, r2: usize) {
        self.swap_rows_in(r1, r2, 0..self.cols);
    }
}

impl<'a, T: Scalar> MatRef<'a, T> {
    pub fn new(data: &'a [T], rows: usize, cols: usize, ld: usize) -> Self {
        debug_assert!(ld >= rows);
        debug_assert!(rows == 0 || cols == 0 || data.len() >= ld * (cols - 1) + rows);
        Self {
            data,
            rows,
            cols,
            ld,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i + j * self.ld]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_indexing_with_padding() {
        // 2×2 stored with ld = 3: [a00 a10 pad a01 a11]
        let mut data = vec![1.0, 2.0, -9.0, 3.0, 4.0];
        let mut m = MatMut::new(&mut data, 2, 2, 3);
        assert_eq!(m.get(1, 0), 2.0);
        assert_eq!(m.get(0, 1), 3.0);
        m.swap_rows(0, 1);
        assert_eq!(m.get(0, 0), 2.0);
        assert_eq!(m.get(0, 1), 4.0);
        assert_eq!(data[2], -9.0);
    }
}
