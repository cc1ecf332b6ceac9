//! GESV_OUTOFPLACE: solve `A·X = B` into a separate `X`, leaving `B` intact.
//!
//! The solve is composed from three phases over one shared workspace:
//! factor `A` in place (GETRF with partial pivoting), copy `B` into `X`,
//! then solve in place on `X` (GETRS, no transpose). Workspace negotiation
//! takes the larger of the two phases for every generic buffer, keeps the
//! factorization-only buffers as GETRF sized them, and allows the
//! single-pass strategy only when both phases allow it.

use super::blocks;
use super::getrf::factor;
use super::getrs::solve;
use crate::handle::Handle;
use crate::validate::{self, BufferPresence, extent, info_slots};
use crate::workspace::Workspace;
use batchlu_core::{
    BatchMut, BatchRef, Footprint, LapackInt, Operation, Result, Scalar, WorkspacePlan,
    WorkspaceSizes, check_index_width,
};
use batchlu_kernels::{
    COPY_TILE, MatMut, MatRef, RESET_BLOCK_SIZE, copy_mat, for_each_instance,
    getrf_memory_size, getrs_memory_size, reset_info,
};

/// Dimensions of a GESV_OUTOFPLACE call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GesvDims<I> {
    pub n: I,
    pub nrhs: I,
    pub lda: I,
    pub ldb: I,
    pub ldx: I,
    pub batch_count: I,
}

impl<I: LapackInt> GesvDims<I> {
    /// Tight leading dimensions.
    pub fn new(n: I, nrhs: I, batch_count: I) -> Self {
        Self {
            n,
            nrhs,
            lda: n,
            ldb: n,
            ldx: n,
            batch_count,
        }
    }
}

/// Validate GESV_OUTOFPLACE arguments.
///
/// Sizes are checked first: `n < 0`, `nrhs < 0`, `lda < n`, `ldb < n`,
/// `ldx < n`, `batch_count < 0` each fail with `InvalidSize`. With `buffers`
/// given, `A` and `ipiv` are then required when `n > 0`, `B` and `X` when
/// `n·nrhs > 0`, and `info` when `batch_count > 0`. `buffers = None` is the
/// size-query mode and skips the pointer checks.
pub fn gesv_outofplace_arg_check<I: LapackInt>(
    dims: &GesvDims<I>,
    buffers: Option<&BufferPresence>,
) -> Result<()> {
    let GesvDims {
        n,
        nrhs,
        lda,
        ldb,
        ldx,
        batch_count,
    } = *dims;
    let zero = I::zero();

    validate::size(n < zero, "n")?;
    validate::size(nrhs < zero, "nrhs")?;
    validate::size(lda < n, "lda")?;
    validate::size(ldb < n, "ldb")?;
    validate::size(ldx < n, "ldx")?;
    validate::size(batch_count < zero, "batch_count")?;

    if let Some(p) = buffers {
        let has_rhs = n > zero && nrhs > zero;
        validate::pointer(n > zero, p.a, "A")?;
        validate::pointer(n > zero, p.ipiv, "ipiv")?;
        validate::pointer(has_rhs, p.b, "B")?;
        validate::pointer(has_rhs, p.x, "X")?;
        validate::pointer(batch_count > zero, p.info, "info")?;
    }
    Ok(())
}

/// Merge the factorization and solve phase plans into one.
pub fn combine_factor_solve(factor: &WorkspacePlan, solve: &WorkspacePlan) -> WorkspacePlan {
    let (f, s) = (&factor.sizes, &solve.sizes);
    WorkspacePlan {
        sizes: WorkspaceSizes {
            work1: f.work1.max(s.work1),
            work2: f.work2.max(s.work2),
            work3: f.work3.max(s.work3),
            work4: f.work4.max(s.work4),
            scalars: f.scalars,
            pivotval: f.pivotval,
            pivotidx: f.pivotidx,
            iipiv: f.iipiv,
            iinfo: f.iinfo,
        },
        optim_mem: factor.optim_mem && solve.optim_mem,
    }
}

/// Workspace for `batch` solves of `n × n` systems with `nrhs` right-hand sides.
pub fn gesv_outofplace_memory_size<T: Scalar, I: LapackInt>(
    n: usize,
    nrhs: usize,
    batch: usize,
) -> WorkspacePlan {
    if n == 0 || nrhs == 0 || batch == 0 {
        return WorkspacePlan::empty();
    }
    let factor = getrf_memory_size::<T, I>(n, n, true, batch);
    let solve = getrs_memory_size::<T>(Operation::None, n, nrhs, batch);
    combine_factor_solve(&factor, &solve)
}

/// Size query: validates sizes (never buffers) and returns the workspace plan.
pub fn gesv_outofplace_plan<T: Scalar, I: LapackInt>(
    dims: &GesvDims<I>,
) -> Result<WorkspacePlan> {
    check_index_width::<I>()?;
    gesv_outofplace_arg_check(dims, None)?;
    Ok(gesv_outofplace_memory_size::<T, I>(
        extent(dims.n),
        extent(dims.nrhs),
        extent(dims.batch_count),
    ))
}

fn presence<T, I>(
    a: &BatchMut<'_, T>,
    ipiv: &BatchMut<'_, I>,
    b: &BatchRef<'_, T>,
    x: &BatchMut<'_, T>,
    info: &[I],
) -> BufferPresence {
    BufferPresence {
        a: !a.is_null(),
        b: !b.is_null(),
        x: !x.is_null(),
        ipiv: !ipiv.is_null(),
        info: !info.is_empty(),
        ..Default::default()
    }
}

/// Run the composite solve against a caller-allocated workspace.
///
/// On return `A` holds the LU factors, `ipiv` the pivots, `X` the solution
/// and `info[i]` the first zero pivot of instance `i` (0 when regular).
/// Singular instances do not stop the batch; their `X` is unspecified.
#[allow(clippy::too_many_arguments)]
pub fn gesv_outofplace_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GesvDims<I>,
    a: BatchMut<'_, T>,
    ipiv: BatchMut<'_, I>,
    b: BatchRef<'_, T>,
    x: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    log::trace!(
        "{}gesv_outofplace n={} nrhs={} lda={} ldb={} ldx={} batch_count={}",
        T::KIND.prefix(),
        dims.n,
        dims.nrhs,
        dims.lda,
        dims.ldb,
        dims.ldx,
        dims.batch_count
    );
    gesv_outofplace_arg_check(dims, Some(&presence(&a, &ipiv, &b, &x, info)))?;

    let (n, nrhs, lda, ldb, ldx, batch) = (
        extent(dims.n),
        extent(dims.nrhs),
        extent(dims.lda),
        extent(dims.ldb),
        extent(dims.ldx),
        extent(dims.batch_count),
    );
    let required = gesv_outofplace_memory_size::<T, I>(n, nrhs, batch);
    workspace.require(&required)?;

    let info = info_slots(info, batch)?;
    let mut a = a.into_instances("A", batch, Footprint::new(n, n, lda))?;
    let mut ipiv = ipiv.into_instances("ipiv", batch, Footprint::vector(n))?;
    let b = b.into_instances("B", batch, Footprint::new(n, nrhs, ldb))?;
    let mut x = x.into_instances("X", batch, Footprint::new(n, nrhs, ldx))?;

    if batch == 0 {
        log::debug!("gesv_outofplace: quick return, batch_count=0");
        return Ok(());
    }
    let stream = handle.stream();
    stream.launch(
        "reset_info",
        [blocks(batch, RESET_BLOCK_SIZE), 1, 1],
        || reset_info(&mut *info, I::zero()),
    )?;
    if n == 0 || nrhs == 0 {
        log::debug!("gesv_outofplace: quick return, n={n} nrhs={nrhs}");
        return Ok(());
    }

    factor(
        handle,
        workspace.regions(),
        (n, n, lda),
        &mut a,
        Some(ipiv.as_mut_slice()),
        info,
        required.optim_mem,
    )?;

    let copies: Vec<_> = b.into_iter().zip(x.iter_mut().map(|v| &mut **v)).collect();
    let parallel = handle.fan_out("copy_mat", batch);
    stream.launch(
        "copy_mat",
        [blocks(n, COPY_TILE), blocks(nrhs, COPY_TILE), batch],
        || {
            for_each_instance(copies, parallel, |(src, dst)| {
                copy_mat(
                    MatRef::new(src, n, nrhs, ldb),
                    &mut MatMut::new(dst, n, nrhs, ldx),
                );
            })
        },
    )?;

    solve(
        handle,
        workspace.regions(),
        Operation::None,
        (n, lda),
        (nrhs, ldx),
        a.iter().map(|v| &**v).collect(),
        Some(ipiv.iter().map(|v| &**v).collect()),
        &mut x,
        required.optim_mem,
    )
}

/// One-shot composite solve: validate, plan, allocate, execute.
///
/// The workspace is released on every exit path.
pub fn gesv_outofplace<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GesvDims<I>,
    a: BatchMut<'_, T>,
    ipiv: BatchMut<'_, I>,
    b: BatchRef<'_, T>,
    x: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    gesv_outofplace_arg_check(dims, Some(&presence(&a, &ipiv, &b, &x, info)))?;
    let plan = gesv_outofplace_plan::<T, I>(dims)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    gesv_outofplace_execute(handle, &mut workspace, dims, a, ipiv, b, x, info)
}
