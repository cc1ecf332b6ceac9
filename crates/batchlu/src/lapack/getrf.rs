//! GETRF: batched LU factorization with or without partial pivoting.

use super::blocks;
use crate::handle::Handle;
use crate::validate::{self, BufferPresence, extent, info_slots};
use crate::workspace::{Regions, Workspace};
use batchlu_core::{
    BatchMut, Footprint, LapackInt, Result, Scalar, WorkspacePlan, check_index_width,
};
use batchlu_kernels::{
    self as kernels, GetrfScratch, MatMut, RESET_BLOCK_SIZE, for_each_instance,
    getrf_memory_size, init_scalars, partition, reset_info,
};

/// Dimensions of a GETRF call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetrfDims<I> {
    pub m: I,
    pub n: I,
    pub lda: I,
    pub batch_count: I,
}

impl<I: LapackInt> GetrfDims<I> {
    /// `n × n` matrices with a tight leading dimension.
    pub fn square(n: I, batch_count: I) -> Self {
        Self {
            m: n,
            n,
            lda: n,
            batch_count,
        }
    }
}

/// Validate GETRF arguments; `buffers` is `None` in size-query mode.
pub fn getrf_arg_check<I: LapackInt>(
    dims: &GetrfDims<I>,
    pivot: bool,
    buffers: Option<&BufferPresence>,
) -> Result<()> {
    let GetrfDims {
        m,
        n,
        lda,
        batch_count,
    } = *dims;
    let zero = I::zero();

    validate::size(m < zero, "m")?;
    validate::size(n < zero, "n")?;
    validate::size(lda < m, "lda")?;
    validate::size(batch_count < zero, "batch_count")?;

    if let Some(p) = buffers {
        let nonempty = m > zero && n > zero;
        validate::pointer(nonempty, p.a, "A")?;
        validate::pointer(pivot && nonempty, p.ipiv, "ipiv")?;
        validate::pointer(batch_count > zero, p.info, "info")?;
    }
    Ok(())
}

fn plan_for<T: Scalar, I: LapackInt>(dims: &GetrfDims<I>, pivot: bool) -> Result<WorkspacePlan> {
    check_index_width::<I>()?;
    getrf_arg_check(dims, pivot, None)?;
    Ok(getrf_memory_size::<T, I>(
        extent(dims.m),
        extent(dims.n),
        pivot,
        extent(dims.batch_count),
    ))
}

/// Workspace needed by [`getrf_execute`].
pub fn getrf_plan<T: Scalar, I: LapackInt>(dims: &GetrfDims<I>) -> Result<WorkspacePlan> {
    plan_for::<T, I>(dims, true)
}

/// Workspace needed by [`getrf_npvt_execute`].
pub fn getrf_npvt_plan<T: Scalar, I: LapackInt>(dims: &GetrfDims<I>) -> Result<WorkspacePlan> {
    plan_for::<T, I>(dims, false)
}

/// Factor every instance of `a` in place as `P·L·U`.
pub fn getrf_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetrfDims<I>,
    a: BatchMut<'_, T>,
    ipiv: BatchMut<'_, I>,
    info: &mut [I],
) -> Result<()> {
    template(handle, workspace, dims, a, Some(ipiv), info)
}

/// Factor every instance of `a` in place as `L·U` without row interchanges.
pub fn getrf_npvt_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetrfDims<I>,
    a: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    template(handle, workspace, dims, a, None, info)
}

/// One-shot GETRF with partial pivoting.
pub fn getrf<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetrfDims<I>,
    a: BatchMut<'_, T>,
    ipiv: BatchMut<'_, I>,
    info: &mut [I],
) -> Result<()> {
    one_shot(handle, dims, a, Some(ipiv), info)
}

/// One-shot GETRF without pivoting.
pub fn getrf_npvt<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetrfDims<I>,
    a: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    one_shot(handle, dims, a, None, info)
}

fn presence<T, I>(a: &BatchMut<'_, T>, ipiv: Option<&BatchMut<'_, I>>, info: &[I]) -> BufferPresence {
    BufferPresence {
        a: !a.is_null(),
        ipiv: ipiv.is_some_and(|p| !p.is_null()),
        info: !info.is_empty(),
        ..Default::default()
    }
}

fn one_shot<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetrfDims<I>,
    a: BatchMut<'_, T>,
    ipiv: Option<BatchMut<'_, I>>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let pivot = ipiv.is_some();
    getrf_arg_check(dims, pivot, Some(&presence(&a, ipiv.as_ref(), info)))?;
    let plan = plan_for::<T, I>(dims, pivot)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    template(handle, &mut workspace, dims, a, ipiv, info)
}

fn template<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetrfDims<I>,
    a: BatchMut<'_, T>,
    ipiv: Option<BatchMut<'_, I>>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let pivot = ipiv.is_some();
    log::trace!(
        "{}getrf{} m={} n={} lda={} batch_count={}",
        T::KIND.prefix(),
        if pivot { "" } else { "_npvt" },
        dims.m,
        dims.n,
        dims.lda,
        dims.batch_count
    );
    getrf_arg_check(dims, pivot, Some(&presence(&a, ipiv.as_ref(), info)))?;

    let (m, n, lda, batch) = (
        extent(dims.m),
        extent(dims.n),
        extent(dims.lda),
        extent(dims.batch_count),
    );
    let required = getrf_memory_size::<T, I>(m, n, pivot, batch);
    workspace.require(&required)?;

    let info = info_slots(info, batch)?;
    let mut a = a.into_instances("A", batch, Footprint::new(m, n, lda))?;
    let mut ipiv = ipiv
        .map(|p| p.into_instances("ipiv", batch, Footprint::vector(m.min(n))))
        .transpose()?;

    if batch == 0 {
        log::debug!("getrf: quick return, batch_count=0");
        return Ok(());
    }
    handle.stream().launch(
        "reset_info",
        [blocks(batch, RESET_BLOCK_SIZE), 1, 1],
        || reset_info(&mut *info, I::zero()),
    )?;
    if m == 0 || n == 0 {
        log::debug!("getrf: quick return, m={m} n={n}");
        return Ok(());
    }

    factor(
        handle,
        workspace.regions(),
        (m, n, lda),
        &mut a,
        ipiv.as_deref_mut(),
        info,
        required.optim_mem,
    )
}

/// Launch the scalar setup and the factorization over already-validated
/// instances. Info must have been reset by the caller.
pub(crate) fn factor<T: Scalar, I: LapackInt>(
    handle: &Handle,
    regions: Regions<'_, T, I>,
    (m, n, lda): (usize, usize, usize),
    a: &mut [&mut [T]],
    ipiv: Option<&mut [&mut [I]]>,
    info: &mut [I],
    optim_mem: bool,
) -> Result<()> {
    let batch = a.len();
    let stream = handle.stream();
    let Regions {
        scalars,
        work1,
        work2,
        work3,
        pivotval,
        pivotidx,
        iipiv,
        iinfo,
        ..
    } = regions;

    stream.launch("init_scalars", [1, 1, 1], || init_scalars(&mut *scalars))?;
    let scalars: &[T] = scalars;

    let mut work1 = partition(work1, batch).into_iter();
    let mut work2 = partition(work2, batch).into_iter();
    let mut work3 = partition(work3, batch).into_iter();
    let mut pivotval = partition(pivotval, batch).into_iter();
    let mut pivotidx = partition(pivotidx, batch).into_iter();
    let mut iipiv = partition(iipiv, batch).into_iter();
    let mut iinfo = partition(iinfo, batch).into_iter();
    let mut pivots = ipiv.map(|p| p.iter_mut());

    let mut items = Vec::with_capacity(batch);
    for (a, info) in a.iter_mut().zip(info.iter_mut()) {
        let ipiv = pivots
            .as_mut()
            .and_then(|it| it.next())
            .map(|p| &mut **p);
        let scratch = GetrfScratch {
            scalars,
            work1: work1.next().unwrap_or_default(),
            work2: work2.next().unwrap_or_default(),
            work3: work3.next().unwrap_or_default(),
            pivotval: pivotval.next().unwrap_or_default(),
            pivotidx: pivotidx.next().unwrap_or_default(),
            iipiv: iipiv.next().unwrap_or_default(),
            iinfo: iinfo.next().unwrap_or_default(),
        };
        items.push((&mut **a, ipiv, info, scratch));
    }

    let parallel = handle.fan_out("getrf", batch);
    stream.launch("getrf", [batch, 1, 1], || {
        for_each_instance(items, parallel, |(a, ipiv, info, scratch)| {
            kernels::getrf(&mut MatMut::new(a, m, n, lda), ipiv, info, scratch, optim_mem);
        })
    })
}
