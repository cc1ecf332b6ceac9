//! High-level batched solve over packed column-major input.

use crate::handle::Handle;
use crate::lapack::{GesvDims, gesv_outofplace};
use batchlu_core::{BatchMut, BatchRef, Error, Result, Scalar};

/// Result of a batched solve.
#[derive(Debug, Clone)]
pub struct BatchedSolveResult<T> {
    /// Solutions for each system (flattened: batch_size * n * nrhs elements).
    pub solutions: Vec<T>,
    /// Per-system info: 0 when solved, `k` when `U(k,k)` is exactly zero.
    pub info: Vec<i32>,
    /// Indices of matrices that were singular.
    pub singular_indices: Vec<usize>,
    /// Matrix dimension.
    pub n: usize,
    /// Right-hand sides per system.
    pub nrhs: usize,
    /// Number of systems solved.
    pub batch_size: usize,
}

impl<T> BatchedSolveResult<T> {
    /// Get the solution block (`n × nrhs`, column-major) of one system.
    pub fn solution(&self, index: usize) -> Option<&[T]> {
        if index >= self.batch_size {
            return None;
        }
        let len = self.n * self.nrhs;
        let start = index * len;
        self.solutions.get(start..start + len)
    }

    /// Check if a specific system was singular.
    pub fn is_singular(&self, index: usize) -> bool {
        self.singular_indices.contains(&index)
    }

    /// Number of successfully solved systems.
    pub fn num_solved(&self) -> usize {
        self.batch_size - self.singular_indices.len()
    }
}

fn as_i32(v: usize, argument: &'static str) -> Result<i32> {
    i32::try_from(v).map_err(|_| Error::InvalidSize { argument })
}

fn packed_len(batch: usize, rows: usize, cols: usize, argument: &'static str) -> Result<usize> {
    batch
        .checked_mul(rows)
        .and_then(|v| v.checked_mul(cols))
        .ok_or(Error::InvalidSize { argument })
}

/// Packed input must match its dimensions exactly.
fn check_packed(argument: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        Err(Error::BufferTooSmall {
            argument,
            required,
            actual,
        })
    } else if actual > required {
        Err(Error::InvalidSize { argument })
    } else {
        Ok(())
    }
}

/// Solve `batch_size` systems `A_i·X_i = B_i`.
///
/// `matrices` holds `batch_size` packed `n × n` column-major matrices and
/// `rhs` the matching `n × nrhs` blocks. Inputs are left untouched.
pub fn solve_batch<T: Scalar>(
    handle: &Handle,
    matrices: &[T],
    rhs: &[T],
    n: usize,
    nrhs: usize,
    batch_size: usize,
) -> Result<BatchedSolveResult<T>> {
    let dims = GesvDims::new(
        as_i32(n, "n")?,
        as_i32(nrhs, "nrhs")?,
        as_i32(batch_size, "batch_count")?,
    );
    let expected_matrix_len = packed_len(batch_size, n, n, "matrices")?;
    let expected_rhs_len = packed_len(batch_size, n, nrhs, "rhs")?;
    check_packed("matrices", expected_matrix_len, matrices.len())?;
    check_packed("rhs", expected_rhs_len, rhs.len())?;

    let mut factors = matrices.to_vec();
    let mut ipiv = vec![0i32; batch_size * n];
    let mut solutions = vec![T::zero(); expected_rhs_len];
    let mut info = vec![0i32; batch_size];

    gesv_outofplace(
        handle,
        &dims,
        BatchMut::strided(&mut factors, n * n),
        BatchMut::strided(&mut ipiv, n),
        BatchRef::strided(rhs, n * nrhs),
        BatchMut::strided(&mut solutions, n * nrhs),
        &mut info,
    )?;

    let singular_indices: Vec<usize> = info
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0)
        .map(|(i, _)| i)
        .collect();
    if !singular_indices.is_empty() {
        log::warn!(
            "{} of {} systems singular: {:?}",
            singular_indices.len(),
            batch_size,
            singular_indices
        );
    }

    Ok(BatchedSolveResult {
        solutions,
        info,
        singular_indices,
        n,
        nrhs,
        batch_size,
    })
}
