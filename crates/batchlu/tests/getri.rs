//! Inversion tests: `A·A⁻¹ ≈ I` across precisions and paths.

mod common;

use batchlu::{
    BatchMut, BatchRef, Complex64, GetrfDims, GetriDims, GetriOutofplaceDims, Handle, Scalar,
    Workspace, getrf, getrf_npvt, getri, getri_npvt, getri_npvt_outofplace, getri_outofplace,
    getri_outofplace_execute, getri_outofplace_plan, getri_plan,
};
use common::{Lcg, matmul, max_abs_diff, random_complex, random_matrix, shift_diagonal};

fn identity<T: Scalar>(n: usize) -> Vec<T> {
    let mut id = vec![T::zero(); n * n];
    for i in 0..n {
        id[i + i * n] = T::one();
    }
    id
}

fn lu(handle: &Handle, a: &mut Vec<f64>, n: usize) -> Vec<i32> {
    let mut ipiv = vec![0i32; n];
    let mut info = vec![0i32];
    getrf(
        handle,
        &GetrfDims::square(n as i32, 1),
        BatchMut::from(a),
        BatchMut::from(&mut ipiv),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0]);
    ipiv
}

#[test]
fn test_inplace_inverse_blocked() {
    let handle = Handle::new();
    let n = 40;
    let mut rng = Lcg::new(51);
    let original = random_matrix(&mut rng, n, n);
    let mut a = original.clone();
    let ipiv = lu(&handle, &mut a, n);

    let mut info = vec![-1i32];
    getri(
        &handle,
        &GetriDims::new(n as i32, 1),
        BatchMut::from(&mut a),
        BatchRef::from(&ipiv),
        &mut info,
    )
    .unwrap();

    assert_eq!(info, vec![0]);
    let product = matmul(&original, &a, n, n, n);
    assert!(max_abs_diff(&product, &identity::<f64>(n)) < 1e-9);
    assert_eq!(handle.memory_in_use(), 0);
}

#[test]
fn test_outofplace_inverse_keeps_factors() {
    let handle = Handle::new();
    let n = 5;
    let mut rng = Lcg::new(52);
    let original = random_matrix(&mut rng, n, n);
    let mut a = original.clone();
    let ipiv = lu(&handle, &mut a, n);
    let factors = a.clone();

    let mut c = vec![0.0; n * n];
    let mut info = vec![-1i32];
    getri_outofplace(
        &handle,
        &GetriOutofplaceDims::new(n as i32, 1),
        BatchRef::from(&a),
        BatchRef::from(&ipiv),
        BatchMut::from(&mut c),
        &mut info,
    )
    .unwrap();

    assert_eq!(info, vec![0]);
    assert_eq!(a, factors);
    let product = matmul(&original, &c, n, n, n);
    assert!(max_abs_diff(&product, &identity::<f64>(n)) < 1e-10);
}

#[test]
fn test_npvt_inverse_of_complex_batch() {
    let handle = Handle::new();
    let (n, batch) = (8usize, 3usize);
    let mut rng = Lcg::new(53);
    let mut originals = Vec::new();
    for _ in 0..batch {
        let mut m = random_complex(&mut rng, n, n);
        for i in 0..n {
            m[i + i * n] += Complex64::new(n as f64, 0.0);
        }
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

    let mut c = vec![Complex64::new(0.0, 0.0); n * n * batch];
    getri_npvt_outofplace(
        &handle,
        &GetriOutofplaceDims::new(n as i32, batch as i32),
        BatchRef::strided(&a, n * n),
        BatchMut::strided(&mut c, n * n),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0; batch]);

    getri_npvt(
        &handle,
        &GetriDims::new(n as i32, batch as i32),
        BatchMut::strided(&mut a, n * n),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0; batch]);

    let id = identity::<Complex64>(n);
    for (k, original) in originals.iter().enumerate() {
        let inv = &c[k * n * n..(k + 1) * n * n];
        assert!(max_abs_diff(&matmul(original, inv, n, n, n), &id) < 1e-10);
        assert!(max_abs_diff(inv, &a[k * n * n..(k + 1) * n * n]) < 1e-12);
    }
}

#[test]
fn test_singular_factor_reports_diagonal() {
    let handle = Handle::new();
    // U already factored: diag(1, 0, 3)
    let mut a = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0];
    let before = a.clone();
    let ipiv = vec![1i32, 2, 3];
    let mut info = vec![0i32];
    getri(
        &handle,
        &GetriDims::new(3i32, 1),
        BatchMut::from(&mut a),
        BatchRef::from(&ipiv),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![2]);
    assert_eq!(a, before);
}

#[test]
fn test_plans_and_explicit_workspace() {
    let n = 40i32;
    let inplace = getri_plan::<f64, i32>(&GetriDims::new(n, 2)).unwrap();
    let outofplace = getri_outofplace_plan::<f64, i32>(&GetriOutofplaceDims::new(n, 2)).unwrap();
    assert_eq!(inplace.sizes.work4, 2 * 40 * 40 * 8);
    assert_eq!(outofplace.sizes.work4, 0);
    assert_eq!(inplace.sizes.work1, outofplace.sizes.work1);

    let handle = Handle::new();
    let mut workspace = Workspace::<f64, i32>::allocate(&handle, &outofplace).unwrap();
    let mut rng = Lcg::new(54);
    let mut originals = Vec::new();
    for _ in 0..2 {
        let mut m = random_matrix(&mut rng, 40, 40);
        shift_diagonal(&mut m, 40, 1.0);
        originals.push(m);
    }
    let mut a0 = originals[0].clone();
    let mut a1 = originals[1].clone();
    let p0 = lu(&handle, &mut a0, 40);
    let p1 = lu(&handle, &mut a1, 40);

    let (mut c0, mut c1) = (vec![0.0; 1600], vec![0.0; 1600]);
    let mut info = vec![-1i32; 2];
    getri_outofplace_execute(
        &handle,
        &mut workspace,
        &GetriOutofplaceDims::new(n, 2),
        BatchRef::Batched(vec![&a0[..], &a1[..]]),
        BatchRef::Batched(vec![&p0[..], &p1[..]]),
        BatchMut::Batched(vec![&mut c0[..], &mut c1[..]]),
        &mut info,
    )
    .unwrap();
    assert_eq!(info, vec![0, 0]);
    let id = identity::<f64>(40);
    assert!(max_abs_diff(&matmul(&originals[0], &c0, 40, 40, 40), &id) < 1e-9);
    assert!(max_abs_diff(&matmul(&originals[1], &c1, 40, 40, 40), &id) < 1e-9);
}
