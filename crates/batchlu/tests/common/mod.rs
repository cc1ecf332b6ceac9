//! Shared helpers for the integration tests.
#![allow(dead_code)]

use batchlu::{Complex64, Scalar};

/// Deterministic linear congruential generator.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform in `[-0.5, 0.5)`.
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as f64 / (1u64 << 31) as f64) - 0.5
    }
}

pub fn random_matrix(rng: &mut Lcg, rows: usize, cols: usize) -> Vec<f64> {
    (0..rows * cols).map(|_| rng.next_f64()).collect()
}

pub fn random_complex(rng: &mut Lcg, rows: usize, cols: usize) -> Vec<Complex64> {
    (0..rows * cols)
        .map(|_| Complex64::new(rng.next_f64(), rng.next_f64()))
        .collect()
}

/// Column-major `C = A·B` for `A` of `m × k` and `B` of `k × p`.
pub fn matmul<T: Scalar>(a: &[T], b: &[T], m: usize, k: usize, p: usize) -> Vec<T> {
    let mut c = vec![T::zero(); m * p];
    for j in 0..p {
        for l in 0..k {
            let blj = b[l + j * k];
            for i in 0..m {
                c[i + j * m] += a[i + l * m] * blj;
            }
        }
    }
    c
}

/// Column-major transpose (optionally conjugated) of an `m × n` matrix.
pub fn transpose<T: Scalar>(a: &[T], m: usize, n: usize, conj: bool) -> Vec<T> {
    let mut t = vec![T::zero(); m * n];
    for j in 0..n {
        for i in 0..m {
            let v = a[i + j * m];
            t[j + i * n] = if conj { v.conj() } else { v };
        }
    }
    t
}

pub fn max_abs_diff<T: Scalar>(a: &[T], b: &[T]) -> f64
where
    T::Real: Into<f64>,
{
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - y).modulus().into())
        .fold(0.0, f64::max)
}

/// Check `P·A = L·U` for an `m × n` factorization stored in `lu`.
pub fn assert_lu_reconstructs(original: &[f64], lu: &[f64], ipiv: Option<&[i32]>, m: usize, n: usize) {
    let k = m.min(n);
    let mut l = vec![0.0; m * k];
    let mut u = vec![0.0; k * n];
    for j in 0..k {
        l[j + j * m] = 1.0;
        for i in j + 1..m {
            l[i + j * m] = lu[i + j * m];
        }
    }
    for j in 0..n {
        for i in 0..=j.min(k - 1) {
            u[i + j * k] = lu[i + j * m];
        }
    }
    let product = matmul(&l, &u, m, k, n);

    let mut permuted = original.to_vec();
    if let Some(ipiv) = ipiv {
        for (row, &p) in ipiv.iter().enumerate() {
            let p = (p - 1) as usize;
            for j in 0..n {
                permuted.swap(row + j * m, p + j * m);
            }
        }
    }
    let err = max_abs_diff(&product, &permuted);
    assert!(err < 1e-10, "P·A differs from L·U by {err}");
}

/// Add `shift` to every diagonal entry.
pub fn shift_diagonal(a: &mut [f64], n: usize, shift: f64) {
    for i in 0..n {
        a[i + i * n] += shift;
    }
}
