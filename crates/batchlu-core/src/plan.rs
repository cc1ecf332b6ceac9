//! Workspace size descriptors.
//!
//! Sizes are in bytes, one per scratch role, exactly as a device allocator
//! would be asked for them.

/// Scratch buffer roles shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkRole {
    /// Constants `[-1, 0, 1]` for the trailing update.
    Scalars,
    /// TRSM product temp.
    Work1,
    /// Inverted triangular diagonal block.
    Work2,
    /// Packed factorization panel.
    Work3,
    /// Copy of the LU factors for in-place inversion.
    Work4,
    /// Pivot-search value staging.
    PivotVal,
    /// Pivot-search index staging.
    PivotIdx,
    /// Panel-local pivot indices.
    IIpiv,
    /// Panel-local singularity info.
    IInfo,
}

impl WorkRole {
    pub const ALL: [WorkRole; 9] = [
        WorkRole::Scalars,
        WorkRole::Work1,
        WorkRole::Work2,
        WorkRole::Work3,
        WorkRole::Work4,
        WorkRole::PivotVal,
        WorkRole::PivotIdx,
        WorkRole::IIpiv,
        WorkRole::IInfo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WorkRole::Scalars => "scalars",
            WorkRole::Work1 => "work1",
            WorkRole::Work2 => "work2",
            WorkRole::Work3 => "work3",
            WorkRole::Work4 => "work4",
            WorkRole::PivotVal => "pivotval",
            WorkRole::PivotIdx => "pivotidx",
            WorkRole::IIpiv => "iipiv",
            WorkRole::IInfo => "iinfo",
        }
    }
}

impl std::fmt::Display for WorkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte size of every scratch role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WorkspaceSizes {
    pub scalars: usize,
    pub work1: usize,
    pub work2: usize,
    pub work3: usize,
    pub work4: usize,
    pub pivotval: usize,
    pub pivotidx: usize,
    pub iipiv: usize,
    pub iinfo: usize,
}

impl WorkspaceSizes {
    /// Size of one role.
    pub fn get(&self, role: WorkRole) -> usize {
        match role {
            WorkRole::Scalars => self.scalars,
            WorkRole::Work1 => self.work1,
            WorkRole::Work2 => self.work2,
            WorkRole::Work3 => self.work3,
            WorkRole::Work4 => self.work4,
            WorkRole::PivotVal => self.pivotval,
            WorkRole::PivotIdx => self.pivotidx,
            WorkRole::IIpiv => self.iipiv,
            WorkRole::IInfo => self.iinfo,
        }
    }

    /// Total bytes across all roles, saturating at `usize::MAX`.
    pub fn total(&self) -> usize {
        WorkRole::ALL
            .iter()
            .fold(0, |acc, &r| acc.saturating_add(self.get(r)))
    }

    /// Whether every role is zero.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Whether every role of `self` is at least as large as in `other`.
    pub fn covers(&self, other: &WorkspaceSizes) -> bool {
        WorkRole::ALL.iter().all(|&r| self.get(r) >= other.get(r))
    }

    /// First role of `self` that is smaller than in `other`.
    pub fn first_shortfall(&self, other: &WorkspaceSizes) -> Option<WorkRole> {
        WorkRole::ALL
            .iter()
            .copied()
            .find(|&r| self.get(r) < other.get(r))
    }
}

/// Result of a size query: byte sizes plus whether the single-pass
/// (optimized memory) strategy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkspacePlan {
    pub sizes: WorkspaceSizes,
    pub optim_mem: bool,
}

impl WorkspacePlan {
    /// Plan for a quick-return problem: nothing to allocate, nothing to chunk.
    pub fn empty() -> Self {
        Self {
            sizes: WorkspaceSizes::default(),
            optim_mem: true,
        }
    }
}

impl Default for WorkspacePlan {
    fn default() -> Self {
        Self::empty()
    }
}
