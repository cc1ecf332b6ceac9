//! Operation drivers: validation, size queries, and execution.
//!
//! Every operation comes in three forms:
//! - `*_plan`: size query; sizes are validated, buffers are not,
//! - `*_execute`: runs against a caller-allocated [`Workspace`](crate::Workspace),
//! - the bare name: validate, plan, allocate and execute in one call.

mod gesv;
mod getrf;
mod getri;
mod getrs;

pub use gesv::{
    GesvDims, combine_factor_solve, gesv_outofplace, gesv_outofplace_arg_check,
    gesv_outofplace_execute, gesv_outofplace_memory_size, gesv_outofplace_plan,
};
pub use getrf::{
    GetrfDims, getrf, getrf_arg_check, getrf_execute, getrf_npvt, getrf_npvt_execute,
    getrf_npvt_plan, getrf_plan,
};
pub use getri::{
    GetriDims, GetriOutofplaceDims, getri, getri_arg_check, getri_execute, getri_npvt,
    getri_npvt_execute, getri_npvt_outofplace, getri_npvt_outofplace_execute, getri_npvt_plan,
    getri_outofplace, getri_outofplace_arg_check, getri_outofplace_execute,
    getri_outofplace_plan, getri_plan,
};
pub use getrs::{GetrsDims, getrs, getrs_arg_check, getrs_execute, getrs_plan};

/// Grid size of a one-dimensional launch over `count` items.
#[inline]
pub(crate) fn blocks(count: usize, block: usize) -> usize {
    count.div_ceil(block)
}
