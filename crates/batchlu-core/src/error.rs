//! Error types for batched factorization and solve operations.

use thiserror::Error;

/// Errors surfaced by batchlu operations.
///
/// Numerical singularity is not an error: a singular instance is
/// reported through its entry in the info vector, never as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The handle's stream has been torn down.
    #[error("Invalid handle: stream has been closed")]
    InvalidHandle,

    /// A dimension, leading dimension, stride or batch count is out of range.
    #[error("Invalid size for argument `{argument}`")]
    InvalidSize { argument: &'static str },

    /// A required buffer was not supplied.
    #[error("Invalid pointer: `{argument}` is required but empty")]
    InvalidPointer { argument: &'static str },

    /// A supplied buffer is shorter than the shape it describes.
    #[error("Buffer `{argument}` too small: need {required} elements, got {actual}")]
    BufferTooSmall {
        argument: &'static str,
        required: usize,
        actual: usize,
    },

    /// Workspace allocation failed or would exceed the handle's memory limit.
    #[error("Memory error: requested {requested} bytes, {available} available")]
    MemoryError { requested: usize, available: usize },

    /// A caller-provided workspace does not cover the plan it is used with.
    #[error("Workspace region `{role}` too small: need {required} bytes, got {actual}")]
    WorkspaceTooSmall {
        role: &'static str,
        required: usize,
        actual: usize,
    },

    /// The requested configuration is not compiled in.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Result type for batchlu operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Flat status code, one per error class, for callers that report codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidHandle,
    InvalidSize,
    InvalidPointer,
    MemoryError,
    NotImplemented,
}

impl Error {
    /// Map this error onto its status code.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidHandle => Status::InvalidHandle,
            Error::InvalidSize { .. } | Error::BufferTooSmall { .. } => Status::InvalidSize,
            Error::InvalidPointer { .. } => Status::InvalidPointer,
            Error::MemoryError { .. } | Error::WorkspaceTooSmall { .. } => Status::MemoryError,
            Error::NotImplemented(_) => Status::NotImplemented,
        }
    }
}

impl Status {
    /// Status of a finished call.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Success => "success",
            Status::InvalidHandle => "invalid_handle",
            Status::InvalidSize => "invalid_size",
            Status::InvalidPointer => "invalid_pointer",
            Status::MemoryError => "memory_error",
            Status::NotImplemented => "not_implemented",
        };
        f.write_str(name)
    }
}
