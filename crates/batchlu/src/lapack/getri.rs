//! GETRI: matrix inverse from GETRF factors, in place or out of place.

use super::blocks;
use crate::handle::Handle;
use crate::validate::{self, BufferPresence, extent, info_slots};
use crate::workspace::{Regions, Workspace};
use batchlu_core::{
    BatchMut, BatchRef, Footprint, LapackInt, Result, Scalar, WorkspacePlan, check_index_width,
};
use batchlu_kernels::{
    self as kernels, MatMut, MatRef, RESET_BLOCK_SIZE, TrsmScratch, for_each_instance,
    getri_memory_size, getri_outofplace_memory_size, partition, reset_info,
};

/// Dimensions of an in-place GETRI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetriDims<I> {
    pub n: I,
    pub lda: I,
    pub batch_count: I,
}

/// Dimensions of an out-of-place GETRI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetriOutofplaceDims<I> {
    pub n: I,
    pub lda: I,
    pub ldc: I,
    pub batch_count: I,
}

impl<I: LapackInt> GetriDims<I> {
    pub fn new(n: I, batch_count: I) -> Self {
        Self {
            n,
            lda: n,
            batch_count,
        }
    }
}

impl<I: LapackInt> GetriOutofplaceDims<I> {
    pub fn new(n: I, batch_count: I) -> Self {
        Self {
            n,
            lda: n,
            ldc: n,
            batch_count,
        }
    }
}

pub fn getri_arg_check<I: LapackInt>(
    dims: &GetriDims<I>,
    pivot: bool,
    buffers: Option<&BufferPresence>,
) -> Result<()> {
    let GetriDims {
        n,
        lda,
        batch_count,
    } = *dims;
    let zero = I::zero();

    validate::size(n < zero, "n")?;
    validate::size(lda < n, "lda")?;
    validate::size(batch_count < zero, "batch_count")?;

    if let Some(p) = buffers {
        validate::pointer(n > zero, p.a, "A")?;
        validate::pointer(pivot && n > zero, p.ipiv, "ipiv")?;
        validate::pointer(batch_count > zero, p.info, "info")?;
    }
    Ok(())
}

pub fn getri_outofplace_arg_check<I: LapackInt>(
    dims: &GetriOutofplaceDims<I>,
    pivot: bool,
    buffers: Option<&BufferPresence>,
) -> Result<()> {
    let GetriOutofplaceDims {
        n,
        lda,
        ldc,
        batch_count,
    } = *dims;
    let zero = I::zero();

    validate::size(n < zero, "n")?;
    validate::size(lda < n, "lda")?;
    validate::size(ldc < n, "ldc")?;
    validate::size(batch_count < zero, "batch_count")?;

    if let Some(p) = buffers {
        validate::pointer(n > zero, p.a, "A")?;
        validate::pointer(pivot && n > zero, p.ipiv, "ipiv")?;
        validate::pointer(n > zero, p.c, "C")?;
        validate::pointer(batch_count > zero, p.info, "info")?;
    }
    Ok(())
}

/// Workspace needed by [`getri_execute`].
pub fn getri_plan<T: Scalar, I: LapackInt>(dims: &GetriDims<I>) -> Result<WorkspacePlan> {
    check_index_width::<I>()?;
    getri_arg_check(dims, true, None)?;
    Ok(getri_memory_size::<T>(extent(dims.n), extent(dims.batch_count)))
}

/// Workspace needed by [`getri_npvt_execute`].
pub fn getri_npvt_plan<T: Scalar, I: LapackInt>(dims: &GetriDims<I>) -> Result<WorkspacePlan> {
    check_index_width::<I>()?;
    getri_arg_check(dims, false, None)?;
    Ok(getri_memory_size::<T>(extent(dims.n), extent(dims.batch_count)))
}

/// Workspace needed by the out-of-place variants.
pub fn getri_outofplace_plan<T: Scalar, I: LapackInt>(
    dims: &GetriOutofplaceDims<I>,
) -> Result<WorkspacePlan> {
    check_index_width::<I>()?;
    getri_outofplace_arg_check(dims, false, None)?;
    Ok(getri_outofplace_memory_size::<T>(
        extent(dims.n),
        extent(dims.batch_count),
    ))
}

/// Overwrite every instance of `a` with its inverse.
///
/// # Panics
///
/// Panics if an entry of `ipiv` lies outside `1..=n`.
pub fn getri_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetriDims<I>,
    a: BatchMut<'_, T>,
    ipiv: BatchRef<'_, I>,
    info: &mut [I],
) -> Result<()> {
    inplace(handle, workspace, dims, a, Some(ipiv), info)
}

pub fn getri_npvt_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetriDims<I>,
    a: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    inplace(handle, workspace, dims, a, None, info)
}

/// One-shot in-place inverse.
pub fn getri<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetriDims<I>,
    a: BatchMut<'_, T>,
    ipiv: BatchRef<'_, I>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    getri_arg_check(dims, true, Some(&inplace_presence(&a, Some(&ipiv), info)))?;
    let plan = getri_plan::<T, I>(dims)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    inplace(handle, &mut workspace, dims, a, Some(ipiv), info)
}

/// One-shot in-place inverse of factors computed without pivoting.
pub fn getri_npvt<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetriDims<I>,
    a: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    getri_arg_check(dims, false, Some(&inplace_presence::<T, I>(&a, None, info)))?;
    let plan = getri_npvt_plan::<T, I>(dims)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    inplace(handle, &mut workspace, dims, a, None, info)
}

#[allow(clippy::too_many_arguments)]
pub fn getri_outofplace_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetriOutofplaceDims<I>,
    a: BatchRef<'_, T>,
    ipiv: BatchRef<'_, I>,
    c: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    outofplace(handle, workspace, dims, a, Some(ipiv), c, info)
}

pub fn getri_npvt_outofplace_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetriOutofplaceDims<I>,
    a: BatchRef<'_, T>,
    c: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    outofplace(handle, workspace, dims, a, None, c, info)
}

/// One-shot out-of-place inverse: `C = A⁻¹`.
pub fn getri_outofplace<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetriOutofplaceDims<I>,
    a: BatchRef<'_, T>,
    ipiv: BatchRef<'_, I>,
    c: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let buffers = outofplace_presence(&a, Some(&ipiv), &c, info);
    getri_outofplace_arg_check(dims, true, Some(&buffers))?;
    let plan = getri_outofplace_plan::<T, I>(dims)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    outofplace(handle, &mut workspace, dims, a, Some(ipiv), c, info)
}

pub fn getri_npvt_outofplace<T: Scalar, I: LapackInt>(
    handle: &Handle,
    dims: &GetriOutofplaceDims<I>,
    a: BatchRef<'_, T>,
    c: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let buffers = outofplace_presence::<T, I>(&a, None, &c, info);
    getri_outofplace_arg_check(dims, false, Some(&buffers))?;
    let plan = getri_outofplace_plan::<T, I>(dims)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    outofplace(handle, &mut workspace, dims, a, None, c, info)
}

fn inplace_presence<T, I>(
    a: &BatchMut<'_, T>,
    ipiv: Option<&BatchRef<'_, I>>,
    info: &[I],
) -> BufferPresence {
    BufferPresence {
        a: !a.is_null(),
        ipiv: ipiv.is_some_and(|p| !p.is_null()),
        info: !info.is_empty(),
        ..Default::default()
    }
}

fn outofplace_presence<T, I>(
    a: &BatchRef<'_, T>,
    ipiv: Option<&BatchRef<'_, I>>,
    c: &BatchMut<'_, T>,
    info: &[I],
) -> BufferPresence {
    BufferPresence {
        a: !a.is_null(),
        c: !c.is_null(),
        ipiv: ipiv.is_some_and(|p| !p.is_null()),
        info: !info.is_empty(),
        ..Default::default()
    }
}

fn inplace<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetriDims<I>,
    a: BatchMut<'_, T>,
    ipiv: Option<BatchRef<'_, I>>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let pivot = ipiv.is_some();
    log::trace!(
        "{}getri{} n={} lda={} batch_count={}",
        T::KIND.prefix(),
        if pivot { "" } else { "_npvt" },
        dims.n,
        dims.lda,
        dims.batch_count
    );
    getri_arg_check(dims, pivot, Some(&inplace_presence(&a, ipiv.as_ref(), info)))?;

    let (n, lda, batch) = (extent(dims.n), extent(dims.lda), extent(dims.batch_count));
    let required = getri_memory_size::<T>(n, batch);
    workspace.require(&required)?;

    let info = info_slots(info, batch)?;
    let a = a.into_instances("A", batch, Footprint::new(n, n, lda))?;
    let ipiv = ipiv
        .map(|p| p.into_instances("ipiv", batch, Footprint::vector(n)))
        .transpose()?;

    if batch == 0 {
        log::debug!("getri: quick return, batch_count=0");
        return Ok(());
    }
    handle.stream().launch(
        "reset_info",
        [blocks(batch, RESET_BLOCK_SIZE), 1, 1],
        || reset_info(&mut *info, I::zero()),
    )?;
    if n == 0 {
        log::debug!("getri: quick return, n=0");
        return Ok(());
    }

    let Regions {
        work1,
        work2,
        work4,
        ..
    } = workspace.regions();
    let mut temps = partition(work1, batch).into_iter();
    let mut invs = partition(work2, batch).into_iter();
    let mut copies = partition(work4, batch).into_iter();
    let mut pivots = ipiv.map(|p| p.into_iter());

    let mut items = Vec::with_capacity(batch);
    for (a, info) in a.into_iter().zip(info.iter_mut()) {
        let scratch = TrsmScratch {
            temp: temps.next().unwrap_or_default(),
            inv: invs.next().unwrap_or_default(),
        };
        let ipiv = pivots.as_mut().and_then(|it| it.next());
        items.push((a, ipiv, info, copies.next().unwrap_or_default(), scratch));
    }

    let optim_mem = required.optim_mem;
    let parallel = handle.fan_out("getri", batch);
    handle.stream().launch("getri", [batch, 1, 1], || {
        for_each_instance(items, parallel, |(a, ipiv, info, work4, mut scratch)| {
            kernels::getri(
                &mut MatMut::new(a, n, n, lda),
                ipiv,
                info,
                work4,
                &mut scratch,
                optim_mem,
            );
        })
    })
}

#[allow(clippy::too_many_arguments)]
fn outofplace<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    dims: &GetriOutofplaceDims<I>,
    a: BatchRef<'_, T>,
    ipiv: Option<BatchRef<'_, I>>,
    c: BatchMut<'_, T>,
    info: &mut [I],
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let pivot = ipiv.is_some();
    log::trace!(
        "{}getri{}_outofplace n={} lda={} ldc={} batch_count={}",
        T::KIND.prefix(),
        if pivot { "" } else { "_npvt" },
        dims.n,
        dims.lda,
        dims.ldc,
        dims.batch_count
    );
    getri_outofplace_arg_check(
        dims,
        pivot,
        Some(&outofplace_presence(&a, ipiv.as_ref(), &c, info)),
    )?;

    let (n, lda, ldc, batch) = (
        extent(dims.n),
        extent(dims.lda),
        extent(dims.ldc),
        extent(dims.batch_count),
    );
    let required = getri_outofplace_memory_size::<T>(n, batch);
    workspace.require(&required)?;

    let info = info_slots(info, batch)?;
    let a = a.into_instances("A", batch, Footprint::new(n, n, lda))?;
    let ipiv = ipiv
        .map(|p| p.into_instances("ipiv", batch, Footprint::vector(n)))
        .transpose()?;
    let c = c.into_instances("C", batch, Footprint::new(n, n, ldc))?;

    if batch == 0 {
        log::debug!("getri_outofplace: quick return, batch_count=0");
        return Ok(());
    }
    handle.stream().launch(
        "reset_info",
        [blocks(batch, RESET_BLOCK_SIZE), 1, 1],
        || reset_info(&mut *info, I::zero()),
    )?;
    if n == 0 {
        log::debug!("getri_outofplace: quick return, n=0");
        return Ok(());
    }

    let Regions { work1, work2, .. } = workspace.regions();
    let mut temps = partition(work1, batch).into_iter();
    let mut invs = partition(work2, batch).into_iter();
    let mut pivots = ipiv.map(|p| p.into_iter());

    let mut items = Vec::with_capacity(batch);
    for ((a, c), info) in a.into_iter().zip(c).zip(info.iter_mut()) {
        let scratch = TrsmScratch {
            temp: temps.next().unwrap_or_default(),
            inv: invs.next().unwrap_or_default(),
        };
        let ipiv = pivots.as_mut().and_then(|it| it.next());
        items.push((a, ipiv, c, info, scratch));
    }

    let optim_mem = required.optim_mem;
    let parallel = handle.fan_out("getri_outofplace", batch);
    handle.stream().launch("getri_outofplace", [batch, 1, 1], || {
        for_each_instance(items, parallel, |(a, ipiv, c, info, mut scratch)| {
            kernels::getri_outofplace(
                MatRef::new(a, n, n, lda),
                ipiv,
                &mut MatMut::new(c, n, n, ldc),
                info,
                &mut scratch,
                optim_mem,
            );
        })
    })
}
