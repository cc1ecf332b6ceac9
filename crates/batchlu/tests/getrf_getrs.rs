//! Factorization and triangular-solve tests, cross-checked against faer.

mod common;

use batchlu::{
    BatchMut, BatchRef, Complex64, GetrfDims, GetrsDims, Handle, HandleConfig, Operation,
    getrf, getrf_npvt, getrs,
};
use common::{
    Lcg, assert_lu_reconstructs, matmul, max_abs_diff, random_complex, random_matrix,
    shift_diagonal, transpose,
};
use faer::prelude::*;

fn factor(handle: &Handle, a: &mut [f64], n: usize, batch: usize) -> (Vec<i32>, Vec<i32>) {
    let mut ipiv = vec![0i32; n * batch];
    let mut info = vec![-1i32; batch];
    getrf(
        handle,
        &GetrfDims::square(n as i32, batch as i32),
        BatchMut::strided(a, n * n),
        BatchMut::strided(&mut ipiv, n),
        &mut info,
    )
    .unwrap();
    (ipiv, info)
}

#[test]
fn test_blocked_solve_matches_faer() {
    let handle = Handle::new();
    let (n, batch) = (70usize, 3usize);
    let mut rng = Lcg::new(1234);
    let originals: Vec<Vec<f64>> = (0..batch).map(|_| random_matrix(&mut rng, n, n)).collect();
    let rhs = random_matrix(&mut rng, n, batch);

    let mut a = originals.concat();
    let (ipiv, info) = factor(&handle, &mut a, n, batch);
    assert_eq!(info, vec![0; batch]);

    let mut x = rhs.clone();
    getrs(
        &handle,
        Operation::None,
        &GetrsDims::new(n as i32, 1, batch as i32),
        BatchRef::strided(&a, n * n),
        BatchRef::strided(&ipiv, n),
        BatchMut::strided(&mut x, n),
    )
    .unwrap();

    for (i, data) in originals.iter().enumerate() {
        let matrix = Mat::<f64>::from_fn(n, n, |row, col| data[col * n + row]);
        let b = Col::<f64>::from_fn(n, |row| rhs[i * n + row]);
        let plu = matrix.partial_piv_lu();
        let expected = plu.solve(&b);

        for j in 0..n {
            let got = x[i * n + j];
            let want = expected[j];
            assert!(
                (got - want).abs() <= 1e-8 * want.abs().max(1.0),
                "instance {i} row {j}: {got} vs {want}"
            );
        }
    }
}

#[test]
fn test_blocked_factors_reconstruct() {
    let handle = Handle::new();
    let mut rng = Lcg::new(8);
    for (m, n) in [(70usize, 70usize), (50, 40), (40, 50), (33, 33), (100, 36)] {
        let original = random_matrix(&mut rng, m, n);
        let mut a = original.clone();
        let mut ipiv = vec![0i32; m.min(n)];
        let mut info = vec![0i32];
        getrf(
            &handle,
            &GetrfDims {
                m: m as i32,
                n: n as i32,
                lda: m as i32,
                batch_count: 1,
            },
            BatchMut::from(&mut a),
            BatchMut::from(&mut ipiv),
            &mut info,
        )
        .unwrap();
        assert_eq!(info, vec![0], "{m}x{n}");
        assert!(
            ipiv.iter().enumerate().all(|(k, &p)| p as usize > k && p as usize <= m),
            "{m}x{n}: pivots out of range"
        );
        assert_lu_reconstructs(&original, &a, Some(&ipiv), m, n);
    }
}

#[test]
fn test_zero_column_in_second_panel() {
    let handle = Handle::new();
    let n = 40;
    let mut rng = Lcg::new(17);
    let mut a = random_matrix(&mut rng, n, n);
    for i in 0..n {
        a[i + 35 * n] = 0.0;
    }
    let (_, info) = factor(&handle, &mut a, n, 1);
    assert_eq!(info, vec![36]);
}

#[test]
fn test_first_zero_pivot_wins() {
    let handle = Handle::new();
    let n = 40;
    let mut rng = Lcg::new(23);
    let mut a = random_matrix(&mut rng, n, n);
    for col in [4, 20] {
        for i in 0..n {
            a[i + col * n] = 0.0;
        }
    }
    let (_, info) = factor(&handle, &mut a, n, 1);
    assert_eq!(info, vec![5]);
}

#[test]
fn test_npvt_factors_reconstruct() {
    let handle = Handle::new();
    let (n, batch) = (45usize, 2usize);
    let mut rng = Lcg::new(31);
    let mut originals = Vec::new();
    for _ in 0..batch {
        let mut m = random_matrix(&mut rng, n, n);
        shift_diagonal(&mut m, n, n as f64);
        originals.push(m);
    }
    let mut a = originals.concat();
    let mut info = vec![-1i32; batch];
    getrf_npvt(
        &handle,
        &GetrfDims::square(n as i32, batch as i32),
        BatchMut::strided(&mut a, n * n),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0; batch]);
    for (k, original) in originals.iter().enumerate() {
        assert_lu_reconstructs(original, &a[k * n * n..(k + 1) * n * n], None, n, n);
    }
}

#[test]
fn test_npvt_zero_leading_entry() {
    // [[0, 1], [1, 0]] factors fine with pivoting but not without
    let handle = Handle::new();
    let mut a = vec![0.0, 1.0, 1.0, 0.0];
    let mut info = vec![0i32];
    getrf_npvt(
        &handle,
        &GetrfDims::square(2i32, 1),
        BatchMut::from(&mut a),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![1]);
}

#[test]
fn test_transposed_solve() {
    let handle = Handle::new();
    let n = 40;
    let mut rng = Lcg::new(41);
    let mut a = random_matrix(&mut rng, n, n);
    shift_diagonal(&mut a, n, 4.0);
    let expected = random_matrix(&mut rng, n, 2);
    let mut x = matmul(&transpose(&a, n, n, false), &expected, n, n, 2);

    let (ipiv, _) = factor(&handle, &mut a, n, 1);
    getrs(
        &handle,
        Operation::Transpose,
        &GetrsDims::new(n as i32, 2, 1),
        BatchRef::from(&a),
        BatchRef::from(&ipiv),
        BatchMut::from(&mut x),
    )
    .unwrap();
    assert!(max_abs_diff(&x, &expected) < 1e-10);
}

#[test]
fn test_conjugate_transposed_solve() {
    let handle = Handle::new();
    let n = 36;
    let mut rng = Lcg::new(43);
    let mut a = random_complex(&mut rng, n, n);
    for i in 0..n {
        a[i + i * n] += Complex64::new(3.0, -2.0);
    }
    let expected = random_complex(&mut rng, n, 3);
    let mut x = matmul(&transpose(&a, n, n, true), &expected, n, n, 3);
    let mut y = matmul(&transpose(&a, n, n, false), &expected, n, n, 3);

    let mut ipiv = vec![0i32; n];
    let mut info = vec![0i32];
    getrf(
        &handle,
        &GetrfDims::square(n as i32, 1),
        BatchMut::from(&mut a),
        BatchMut::from(&mut ipiv),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0]);

    let dims = GetrsDims::new(n as i32, 3, 1);
    getrs(
        &handle,
        Operation::ConjugateTranspose,
        &dims,
        BatchRef::from(&a),
        BatchRef::from(&ipiv),
        BatchMut::from(&mut x),
    )
    .unwrap();
    getrs(
        &handle,
        Operation::Transpose,
        &dims,
        BatchRef::from(&a),
        BatchRef::from(&ipiv),
        BatchMut::from(&mut y),
    )
    .unwrap();
    assert!(max_abs_diff(&x, &expected) < 1e-10);
    assert!(max_abs_diff(&y, &expected) < 1e-10);
}

#[test]
fn test_single_precision() {
    let handle = Handle::new();
    let a0 = [4.0f32, 2.0, 1.0, 3.0];
    let mut a = a0.to_vec();
    let mut ipiv = vec![0i32; 2];
    let mut info = vec![0i32];
    getrf(
        &handle,
        &GetrfDims::square(2i32, 1),
        BatchMut::from(&mut a),
        BatchMut::from(&mut ipiv),
        &mut info,
    )
    .unwrap();
    // [[4, 1], [2, 3]]·[1, 2] = [6, 8]
    let mut x = vec![6.0f32, 8.0];
    getrs(
        &handle,
        Operation::None,
        &GetrsDims::new(2i32, 1, 1),
        BatchRef::from(&a),
        BatchRef::from(&ipiv),
        BatchMut::from(&mut x),
    )
    .unwrap();
    assert!((x[0] - 1.0).abs() < 1e-6 && (x[1] - 2.0).abs() < 1e-6);
}

#[test]
fn test_getrf_degenerate_resets_info() {
    let handle = Handle::with_config(HandleConfig::default().with_trace_launches(true));
    let mut info = vec![9i32; 3];
    getrf::<f64, i32>(
        &handle,
        &GetrfDims {
            m: 0,
            n: 4,
            lda: 1,
            batch_count: 3,
        },
        BatchMut::Single(&mut []),
        BatchMut::Single(&mut []),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0; 3]);
    let kernels: Vec<_> = handle.stream().launches().iter().map(|l| l.kernel).collect();
    assert_eq!(kernels, vec!["reset_info"]);
}

#[test]
fn test_getrs_without_rhs_is_noop() {
    let handle = Handle::with_config(HandleConfig::default().with_trace_launches(true));
    let a = vec![1.0, 0.0, 0.0, 1.0];
    let ipiv = vec![1i32, 2];
    getrs(
        &handle,
        Operation::None,
        &GetrsDims::new(2i32, 0, 1),
        BatchRef::from(&a),
        BatchRef::from(&ipiv),
        BatchMut::Single(&mut []),
    )
    .unwrap();
    assert!(handle.stream().launches().is_empty());
}
