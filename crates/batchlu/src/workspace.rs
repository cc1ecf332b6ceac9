//! Scratch memory owned by one call.
//!
//! A [`Workspace`] holds one typed region per [`WorkRole`], sized from a
//! [`WorkspacePlan`], and charges its bytes against the handle's memory
//! counter for as long as it lives.

use crate::handle::Handle;
use batchlu_core::{Error, LapackInt, Result, Scalar, WorkRole, WorkspacePlan, WorkspaceSizes};
use std::mem::size_of;

fn alloc_region<E: Copy>(bytes: usize, fill: E) -> Result<Vec<E>> {
    let len = bytes.div_ceil(size_of::<E>());
    let mut region = Vec::new();
    region
        .try_reserve_exact(len)
        .map_err(|_| Error::MemoryError {
            requested: bytes,
            available: 0,
        })?;
    region.resize(len, fill);
    Ok(region)
}

/// Mutable views of every region.
pub(crate) struct Regions<'a, T, I> {
    pub scalars: &'a mut [T],
    pub work1: &'a mut [T],
    pub work2: &'a mut [T],
    pub work3: &'a mut [T],
    pub work4: &'a mut [T],
    pub pivotval: &'a mut [T],
    pub pivotidx: &'a mut [I],
    pub iipiv: &'a mut [I],
    pub iinfo: &'a mut [I],
}

/// Allocated scratch for one operation.
#[derive(Debug)]
pub struct Workspace<'h, T: Scalar, I: LapackInt> {
    handle: &'h Handle,
    plan: WorkspacePlan,
    scalars: Vec<T>,
    work1: Vec<T>,
    work2: Vec<T>,
    work3: Vec<T>,
    work4: Vec<T>,
    pivotval: Vec<T>,
    pivotidx: Vec<I>,
    iipiv: Vec<I>,
    iinfo: Vec<I>,
}

impl<'h, T: Scalar, I: LapackInt> Workspace<'h, T, I> {
    /// Allocate every region of `plan` against `handle`.
    pub fn allocate(handle: &'h Handle, plan: &WorkspacePlan) -> Result<Self> {
        handle.check()?;
        let sizes = &plan.sizes;
        let bytes = sizes.total();
        handle.charge(bytes)?;

        let regions = (|| {
            Ok::<_, Error>((
                alloc_region(sizes.scalars, T::zero())?,
                alloc_region(sizes.work1, T::zero())?,
                alloc_region(sizes.work2, T::zero())?,
                alloc_region(sizes.work3, T::zero())?,
                alloc_region(sizes.work4, T::zero())?,
                alloc_region(sizes.pivotval, T::zero())?,
                alloc_region(sizes.pivotidx, I::zero())?,
                alloc_region(sizes.iipiv, I::zero())?,
                alloc_region(sizes.iinfo, I::zero())?,
            ))
        })();
        let (scalars, work1, work2, work3, work4, pivotval, pivotidx, iipiv, iinfo) =
            match regions {
                Ok(r) => r,
                Err(e) => {
                    handle.release(bytes);
                    return Err(e);
                }
            };

        log::debug!(
            "workspace allocated: {bytes} bytes (work1={} work2={} work3={} work4={}), optim_mem={}",
            sizes.work1,
            sizes.work2,
            sizes.work3,
            sizes.work4,
            plan.optim_mem
        );

        Ok(Self {
            handle,
            plan: *plan,
            scalars,
            work1,
            work2,
            work3,
            work4,
            pivotval,
            pivotidx,
            iipiv,
            iinfo,
        })
    }

    /// The plan this workspace was allocated from.
    pub fn plan(&self) -> &WorkspacePlan {
        &self.plan
    }

    /// Bytes charged to the handle.
    pub fn bytes(&self) -> usize {
        self.plan.sizes.total()
    }

    /// Fail with `WorkspaceTooSmall` unless every region covers `required`.
    pub fn require(&self, required: &WorkspacePlan) -> Result<()> {
        let have: &WorkspaceSizes = &self.plan.sizes;
        match have.first_shortfall(&required.sizes) {
            None => Ok(()),
            Some(role) => Err(Error::WorkspaceTooSmall {
                role: role.name(),
                required: required.sizes.get(role),
                actual: have.get(role),
            }),
        }
    }

    /// Length in elements of one region.
    pub fn len_of(&self, role: WorkRole) -> usize {
        match role {
            WorkRole::Scalars => self.scalars.len(),
            WorkRole::Work1 => self.work1.len(),
            WorkRole::Work2 => self.work2.len(),
            WorkRole::Work3 => self.work3.len(),
            WorkRole::Work4 => self.work4.len(),
            WorkRole::PivotVal => self.pivotval.len(),
            WorkRole::PivotIdx => self.pivotidx.len(),
            WorkRole::IIpiv => self.iipiv.len(),
            WorkRole::IInfo => self.iinfo.len(),
        }
    }

    pub(crate) fn regions(&mut self) -> Regions<'_, T, I> {
        Regions {
            scalars: &mut self.scalars,
            work1: &mut self.work1,
            work2: &mut self.work2,
            work3: &mut self.work3,
            work4: &mut self.work4,
            pivotval: &mut self.pivotval,
            pivotidx: &mut self.pivotidx,
            iipiv: &mut self.iipiv,
            iinfo: &mut self.iinfo,
        }
    }
}

impl<T: Scalar, I: LapackInt> Drop for Workspace<'_, T, I> {
    fn drop(&mut self) {
        self.handle.release(self.bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HandleConfig;

    fn plan(work1: usize, iinfo: usize) -> WorkspacePlan {
        WorkspacePlan {
            sizes: WorkspaceSizes {
                work1,
                iinfo,
                ..Default::default()
            },
            optim_mem: true,
        }
    }

    #[test]
    fn test_regions_sized_in_elements() {
        let handle = Handle::new();
        let ws = Workspace::<f64, i32>::allocate(&handle, &plan(64, 12)).unwrap();
        assert_eq!(ws.len_of(WorkRole::Work1), 8);
        assert_eq!(ws.len_of(WorkRole::IInfo), 3);
        assert_eq!(handle.memory_in_use(), 76);
        drop(ws);
        assert_eq!(handle.memory_in_use(), 0);
    }

    #[test]
    fn test_limit_exceeded_charges_nothing() {
        let handle = Handle::with_config(HandleConfig::default().with_memory_limit(32));
        let err = Workspace::<f32, i32>::allocate(&handle, &plan(64, 0)).unwrap_err();
        assert!(matches!(err, Error::MemoryError { requested: 64, .. }));
        assert_eq!(handle.memory_in_use(), 0);
    }

    #[test]
    fn test_require_names_short_role() {
        let handle = Handle::new();
        let ws = Workspace::<f64, i32>::allocate(&handle, &plan(64, 0)).unwrap();
        assert!(ws.require(&plan(32, 0)).is_ok());
        assert_eq!(
            ws.require(&plan(64, 4)),
            Err(Error::WorkspaceTooSmall {
                role: "iinfo",
                required: 4,
                actual: 0
            })
        );
    }
}
