//! CPU execution engine for batched LU.
//!
//! Every kernel here works on a single instance; the [`exec`] helpers fan a
//! batch out over instances. Scratch buffers are handed in by the caller, sized
//! by the functions in [`memory`].

pub mod auxiliary;
pub mod exec;
pub mod getrf;
pub mod getri;
pub mod getrs;
pub mod mat;
pub mod memory;
pub mod trsm;

pub use auxiliary::{copy_mat, init_scalars, reset_info, set_identity};
pub use exec::{for_each_instance, partition};
pub use getrf::{GetrfScratch, PivotStage, getf2, getrf};
pub use getri::{getri, getri_outofplace, singular_diagonal};
pub use getrs::{getrs, laswp_backward, laswp_forward};
pub use mat::{MatMut, MatRef};
pub use memory::{
    COPY_TILE, GETF2_SWITCH_SIZE, GETRF_BLOCK_SIZE, RESET_BLOCK_SIZE, TRSM_BLOCK_SIZE,
    TRSM_MAX_PASS_COLS, getrf_memory_size, getri_memory_size, getri_outofplace_memory_size,
    getrs_memory_size, trsm_memory_size, uses_blocked_getrf,
};
pub use trsm::{Triangle, TrsmScratch, trsm_left};
