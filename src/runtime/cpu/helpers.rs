//! Helper functions for CPU operation implementations
//!
//! CPU tensors hold a plain heap pointer. These helpers are the only place
//! that turns it back into a slice; kernels work on safe slices.

use super::{CpuClient, CpuRuntime};
use crate::error::Result;
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

/// Read-only view of a CPU tensor's elements
#[inline]
pub(crate) fn as_slice(t: &Tensor<CpuRuntime>) -> &[f32] {
    let len = t.numel();
    if len == 0 {
        return &[];
    }
    // Storage holds `len` initialized f32 values for as long as `t` lives
    unsafe { std::slice::from_raw_parts(t.storage().ptr() as *const f32, len) }
}

/// Mutable view of a CPU tensor's elements
///
/// Copies the buffer first if another handle shares it, so the mutation is
/// never visible through a clone.
#[inline]
pub(crate) fn as_mut_slice(t: &mut Tensor<CpuRuntime>) -> Result<&mut [f32]> {
    t.make_unique()?;
    let len = t.numel();
    if len == 0 {
        return Ok(&mut []);
    }
    // `t` is the unique owner of its storage and is borrowed mutably
    Ok(unsafe { std::slice::from_raw_parts_mut(t.storage().ptr() as *mut f32, len) })
}

/// Allocate an output tensor on the client's device
#[inline]
pub(crate) fn alloc_output(client: &CpuClient, shape: &[usize]) -> Result<Tensor<CpuRuntime>> {
    Tensor::try_empty(shape, client.device())
}
