//! Batched operand views.
//!
//! A matrix operand is one of three shapes:
//! - `Single`: one matrix in one buffer,
//! - `Strided`: `batch_count` same-shape matrices at a fixed element stride,
//! - `Batched`: an array of independent per-instance buffers.
//!
//! Matrices are column-major with a leading dimension carried separately by
//! the operation. An empty buffer (or an empty instance array) plays the role
//! of a null pointer.

use crate::error::{Error, Result};

/// Invocation shape of an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchMode {
    Single,
    Strided,
    Batched,
}

impl std::fmt::Display for BatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchMode::Single => write!(f, "single"),
            BatchMode::Strided => write!(f, "strided_batched"),
            BatchMode::Batched => write!(f, "batched"),
        }
    }
}

/// Memory footprint of one instance: `rows × cols` with leading dimension `ld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub rows: usize,
    pub cols: usize,
    pub ld: usize,
}

impl Footprint {
    pub fn new(rows: usize, cols: usize, ld: usize) -> Self {
        Self { rows, cols, ld }
    }

    /// A contiguous vector of `len` elements.
    pub fn vector(len: usize) -> Self {
        Self {
            rows: len,
            cols: 1,
            ld: len,
        }
    }

    /// Number of elements spanned by one instance.
    #[inline]
    pub fn span(&self) -> usize {
        if self.rows == 0 || self.cols == 0 {
            0
        } else {
            self.ld
                .saturating_mul(self.cols - 1)
                .saturating_add(self.rows)
        }
    }
}

/// Mutable batched operand.
#[derive(Debug)]
pub enum BatchMut<'a, E> {
    Single(&'a mut [E]),
    Strided { data: &'a mut [E], stride: usize },
    Batched(Vec<&'a mut [E]>),
}

/// Read-only batched operand.
#[derive(Debug, Clone)]
pub enum BatchRef<'a, E> {
    Single(&'a [E]),
    Strided { data: &'a [E], stride: usize },
    Batched(Vec<&'a [E]>),
}

impl<'a, E> From<&'a mut [E]> for BatchMut<'a, E> {
    fn from(data: &'a mut [E]) -> Self {
        BatchMut::Single(data)
    }
}

impl<'a, E> From<&'a mut Vec<E>> for BatchMut<'a, E> {
    fn from(data: &'a mut Vec<E>) -> Self {
        BatchMut::Single(data.as_mut_slice())
    }
}

impl<'a, E> From<&'a [E]> for BatchRef<'a, E> {
    fn from(data: &'a [E]) -> Self {
        BatchRef::Single(data)
    }
}

impl<'a, E> From<&'a Vec<E>> for BatchRef<'a, E> {
    fn from(data: &'a Vec<E>) -> Self {
        BatchRef::Single(data.as_slice())
    }
}

impl<'a, E> BatchMut<'a, E> {
    /// Strided operand with `stride` elements between instances.
    pub fn strided(data: &'a mut [E], stride: usize) -> Self {
        BatchMut::Strided { data, stride }
    }

    pub fn mode(&self) -> BatchMode {
        match self {
            BatchMut::Single(_) => BatchMode::Single,
            BatchMut::Strided { .. } => BatchMode::Strided,
            BatchMut::Batched(_) => BatchMode::Batched,
        }
    }

    /// Whether the operand is the null pointer.
    pub fn is_null(&self) -> bool {
        match self {
            BatchMut::Single(data) => data.is_empty(),
            BatchMut::Strided { data, .. } => data.is_empty(),
            BatchMut::Batched(ptrs) => ptrs.is_empty(),
        }
    }

    /// Split into one disjoint mutable view per instance.
    ///
    /// Every view spans at least `shape.span()` elements. Strided instances
    /// must not overlap when more than one instance is requested. An empty
    /// shape yields empty views whatever the operand holds.
    pub fn into_instances(
        self,
        name: &'static str,
        count: usize,
        shape: Footprint,
    ) -> Result<Vec<&'a mut [E]>> {
        let span = shape.span();
        if count == 0 {
            return Ok(Vec::new());
        }
        if span == 0 {
            return Ok((0..count).map(|_| <&mut [E]>::default()).collect());
        }
        match self {
            BatchMut::Single(data) => {
                if count > 1 {
                    return Err(Error::InvalidSize {
                        argument: "batch_count",
                    });
                }
                check_len(name, span, data.len())?;
                Ok(vec![data])
            }
            BatchMut::Strided { data, stride } => {
                if count > 1 && stride < span {
                    return Err(Error::InvalidSize { argument: name });
                }
                let required = stride.saturating_mul(count - 1).saturating_add(span);
                check_len(name, required, data.len())?;
                let stride = stride.max(span);
                Ok(data.chunks_mut(stride).take(count).collect())
            }
            BatchMut::Batched(ptrs) => {
                check_len(name, count, ptrs.len())?;
                let mut views = Vec::with_capacity(count);
                for view in ptrs.into_iter().take(count) {
                    check_len(name, span, view.len())?;
                    views.push(view);
                }
                Ok(views)
            }
        }
    }
}

impl<'a, E> BatchRef<'a, E> {
    /// Strided operand with `stride` elements between instances.
    ///
    /// A zero stride broadcasts one matrix to every instance.
    pub fn strided(data: &'a [E], stride: usize) -> Self {
        BatchRef::Strided { data, stride }
    }

    pub fn mode(&self) -> BatchMode {
        match self {
            BatchRef::Single(_) => BatchMode::Single,
            BatchRef::Strided { .. } => BatchMode::Strided,
            BatchRef::Batched(_) => BatchMode::Batched,
        }
    }

    /// Whether the operand is the null pointer.
    pub fn is_null(&self) -> bool {
        match self {
            BatchRef::Single(data) => data.is_empty(),
            BatchRef::Strided { data, .. } => data.is_empty(),
            BatchRef::Batched(ptrs) => ptrs.is_empty(),
        }
    }

    /// Split into one read-only view per instance. Views may overlap.
    pub fn into_instances(
        self,
        name: &'static str,
        count: usize,
        shape: Footprint,
    ) -> Result<Vec<&'a [E]>> {
        let span = shape.span();
        if count == 0 {
            return Ok(Vec::new());
        }
        if span == 0 {
            return Ok(vec![<&[E]>::default(); count]);
        }
        match self {
            BatchRef::Single(data) => {
                if count > 1 {
                    return Err(Error::InvalidSize {
                        argument: "batch_count",
                    });
                }
                check_len(name, span, data.len())?;
                Ok(vec![data])
            }
            BatchRef::Strided { data, stride } => {
                let required = stride.saturating_mul(count - 1).saturating_add(span);
                check_len(name, required, data.len())?;
                Ok((0..count).map(|i| &data[i * stride..]).collect())
            }
            BatchRef::Batched(ptrs) => {
                check_len(name, count, ptrs.len())?;
                let mut views = Vec::with_capacity(count);
                for view in ptrs.into_iter().take(count) {
                    check_len(name, span, view.len())?;
                    views.push(view);
                }
                Ok(views)
            }
        }
    }
}

fn check_len(argument: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        Err(Error::BufferTooSmall {
            argument,
            required,
            actual,
        })
    } else {
        Ok(())
    }
}
