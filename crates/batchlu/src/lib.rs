//! Batched LU factorization, solve and inversion.
//!
//! Operations follow the LAPACK conventions: column-major storage, 1-based
//! pivot indices, and a per-instance `info` value that reports the first
//! exactly-zero pivot instead of failing the call. Every operation works
//! over a single matrix, a strided batch, or an array of independent
//! matrices, for `f32`, `f64`, `Complex<f32>` and `Complex<f64>`, with
//! 32-bit or (feature `ilp64`) 64-bit indices.
//!
//! Scratch memory is negotiated explicitly:
//!
//! ```
//! use batchlu::{BatchMut, BatchRef, GesvDims, Handle, Workspace};
//!
//! let handle = Handle::new();
//! let dims = GesvDims::new(2i32, 1, 1);
//! let plan = batchlu::gesv_outofplace_plan::<f64, i32>(&dims).unwrap();
//! let mut workspace = Workspace::<f64, i32>::allocate(&handle, &plan).unwrap();
//!
//! let mut a = vec![2.0, 1.0, 1.0, 3.0];
//! let b = vec![5.0, 10.0];
//! let mut x = vec![0.0; 2];
//! let mut ipiv = vec![0i32; 2];
//! let mut info = vec![0i32; 1];
//! batchlu::gesv_outofplace_execute(
//!     &handle,
//!     &mut workspace,
//!     &dims,
//!     BatchMut::from(&mut a),
//!     BatchMut::from(&mut ipiv),
//!     BatchRef::from(&b),
//!     BatchMut::from(&mut x),
//!     &mut info,
//! )
//! .unwrap();
//! assert_eq!(info[0], 0);
//! assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 3.0).abs() < 1e-12);
//! ```

pub mod handle;
pub mod lapack;
pub mod solver;
pub mod validate;
pub mod workspace;

pub use handle::{Handle, HandleConfig, Launch, Stream};
pub use lapack::*;
pub use solver::{BatchedSolveResult, solve_batch};
pub use validate::BufferPresence;
pub use workspace::Workspace;

pub use batchlu_core::{
    BatchMode, BatchMut, BatchRef, Complex, Complex32, Complex64, ElementKind, Error, Footprint,
    LapackInt, Operation, Result, Scalar, Status, WorkRole, WorkspacePlan, WorkspaceSizes,
};
pub use batchlu_kernels::memory;
