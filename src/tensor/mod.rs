//! Tensor types
//!
//! This module provides the `Tensor` type, a dense row-major f32 array stored
//! on a compute device (CPU, GPU). Every solver in the crate moves data
//! through tensors; host round-trips only happen for scalar reductions and
//! explicit downloads.

mod core;
mod storage;

pub use core::Tensor;
pub use storage::Storage;
