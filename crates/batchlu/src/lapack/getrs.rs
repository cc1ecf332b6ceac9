//! GETRS: solve `op(A)·X = B` from GETRF factors.

use crate::handle::Handle;
use crate::validate::{self, BufferPresence, extent};
use crate::workspace::{Regions, Workspace};
use batchlu_core::{
    BatchMut, BatchRef, Footprint, LapackInt, Operation, Result, Scalar, WorkspacePlan,
    check_index_width,
};
use batchlu_kernels::{
    self as kernels, MatMut, MatRef, TrsmScratch, for_each_instance, getrs_memory_size,
    partition,
};

/// Dimensions of a GETRS call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetrsDims<I> {
    pub n: I,
    pub nrhs: I,
    pub lda: I,
    pub ldb: I,
    pub batch_count: I,
}

impl<I: LapackInt> GetrsDims<I> {
    /// Tight leading dimensions.
    pub fn new(n: I, nrhs: I, batch_count: I) -> Self {
        Self {
            n,
            nrhs,
            lda: n,
            ldb: n,
            batch_count,
        }
    }
}

/// Validate GETRS arguments; `buffers` is `None` in size-query mode.
pub fn getrs_arg_check<I: LapackInt>(
    dims: &GetrsDims<I>,
    buffers: Option<&BufferPresence>,
) -> Result<()> {
    let GetrsDims {
        n,
        nrhs,
        lda,
        ldb,
        batch_count,
    } = *dims;
    let zero = I::zero();

    validate::size(n < zero, "n")?;
    validate::size(nrhs < zero, "nrhs")?;
    validate::size(lda < n, "lda")?;
    validate::size(ldb < n, "ldb")?;
    validate::size(batch_count < zero, "batch_count")?;

    if let Some(p) = buffers {
        validate::pointer(n > zero, p.a, "A")?;
        validate::pointer(n > zero, p.ipiv, "ipiv")?;
        validate::pointer(n > zero && nrhs > zero, p.b, "B")?;
    }
    Ok(())
}

/// Workspace needed by [`getrs_execute`].
pub fn getrs_plan<T: Scalar, I: LapackInt>(
    op: Operation,
    dims: &GetrsDims<I>,
) -> Result<WorkspacePlan> {
    check_index_width::<I>()?;
    getrs_arg_check(dims, None)?;
    Ok(getrs_memory_size::<T>(
        op,
        extent(dims.n),
        extent(dims.nrhs),
        extent(dims.batch_count),
    ))
}

/// Overwrite every instance of `b` with the solution of `op(A)·X = B`.
///
/// # Panics
///
/// Panics if an entry of `ipiv` lies outside `1..=n`, as it can only when
/// `ipiv` did not come from GETRF.
#[allow(clippy::too_many_arguments)]
pub fn getrs_execute<T: Scalar, I: LapackInt>(
    handle: &Handle,
    workspace: &mut Workspace<'_, T, I>,
    op: Operation,
    dims: &GetrsDims<I>,
    a: BatchRef<'_, T>,
    ipiv: BatchRef<'_, I>,
    b: BatchMut<'_, T>,
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    log::trace!(
        "{}getrs trans={} n={} nrhs={} lda={} ldb={} batch_count={}",
        T::KIND.prefix(),
        op.as_char(),
        dims.n,
        dims.nrhs,
        dims.lda,
        dims.ldb,
        dims.batch_count
    );
    let buffers = BufferPresence {
        a: !a.is_null(),
        ipiv: !ipiv.is_null(),
        b: !b.is_null(),
        ..Default::default()
    };
    getrs_arg_check(dims, Some(&buffers))?;

    let (n, nrhs, lda, ldb, batch) = (
        extent(dims.n),
        extent(dims.nrhs),
        extent(dims.lda),
        extent(dims.ldb),
        extent(dims.batch_count),
    );
    let required = getrs_memory_size::<T>(op, n, nrhs, batch);
    workspace.require(&required)?;

    let a = a.into_instances("A", batch, Footprint::new(n, n, lda))?;
    let ipiv = ipiv.into_instances("ipiv", batch, Footprint::vector(n))?;
    let mut b = b.into_instances("B", batch, Footprint::new(n, nrhs, ldb))?;

    if n == 0 || nrhs == 0 || batch == 0 {
        log::debug!("getrs: quick return, n={n} nrhs={nrhs} batch_count={batch}");
        return Ok(());
    }

    solve(
        handle,
        workspace.regions(),
        op,
        (n, lda),
        (nrhs, ldb),
        a,
        Some(ipiv),
        &mut b,
        required.optim_mem,
    )
}

/// One-shot GETRS.
pub fn getrs<T: Scalar, I: LapackInt>(
    handle: &Handle,
    op: Operation,
    dims: &GetrsDims<I>,
    a: BatchRef<'_, T>,
    ipiv: BatchRef<'_, I>,
    b: BatchMut<'_, T>,
) -> Result<()> {
    handle.check()?;
    check_index_width::<I>()?;
    let buffers = BufferPresence {
        a: !a.is_null(),
        ipiv: !ipiv.is_null(),
        b: !b.is_null(),
        ..Default::default()
    };
    getrs_arg_check(dims, Some(&buffers))?;
    let plan = getrs_plan::<T, I>(op, dims)?;
    let mut workspace = Workspace::allocate(handle, &plan)?;
    getrs_execute(handle, &mut workspace, op, dims, a, ipiv, b)
}

/// Launch the triangular solves over already-validated instances.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve<T: Scalar, I: LapackInt>(
    handle: &Handle,
    regions: Regions<'_, T, I>,
    op: Operation,
    (n, lda): (usize, usize),
    (nrhs, ldb): (usize, usize),
    a: Vec<&[T]>,
    ipiv: Option<Vec<&[I]>>,
    b: &mut [&mut [T]],
    optim_mem: bool,
) -> Result<()> {
    let batch = b.len();
    let Regions { work1, work2, .. } = regions;
    let mut temps = partition(work1, batch).into_iter();
    let mut invs = partition(work2, batch).into_iter();
    let mut pivots = ipiv.map(|p| p.into_iter());

    let mut items = Vec::with_capacity(batch);
    for (a, b) in a.into_iter().zip(b.iter_mut()) {
        let ipiv = pivots.as_mut().and_then(|it| it.next());
        let scratch = TrsmScratch {
            temp: temps.next().unwrap_or_default(),
            inv: invs.next().unwrap_or_default(),
        };
        items.push((a, ipiv, &mut **b, scratch));
    }

    let parallel = handle.fan_out("getrs", batch);
    handle.stream().launch("getrs", [batch, 1, 1], || {
        for_each_instance(items, parallel, |(a, ipiv, b, mut scratch)| {
            kernels::getrs(
                op,
                MatRef::new(a, n, n, lda),
                ipiv,
                &mut MatMut::new(b, n, nrhs, ldb),
                &mut scratch,
                optim_mem,
            );
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchlu_core::Error;

    #[test]
    fn test_pointer_rules() {
        let dims = GetrsDims::new(3i32, 0, 1);
        let buffers = BufferPresence {
            a: true,
            ipiv: true,
            ..Default::default()
        };
        // B is not needed without right-hand sides
        assert!(getrs_arg_check(&dims, Some(&buffers)).is_ok());

        let dims = GetrsDims::new(3i32, 2, 1);
        assert_eq!(
            getrs_arg_check(&dims, Some(&buffers)),
            Err(Error::InvalidPointer { argument: "B" })
        );
    }

    #[test]
    fn test_ldb_checked() {
        let dims = GetrsDims {
            n: 4i64,
            nrhs: 1,
            lda: 4,
            ldb: 3,
            batch_count: 1,
        };
        assert_eq!(
            getrs_arg_check(&dims, None),
            Err(Error::InvalidSize { argument: "ldb" })
        );
    }
}
