//! Runtime backends for tensor computation
//!
//! This module defines the `Runtime` trait and provides implementations
//! for the supported compute backends (CPU, WebGPU).
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific GPU/CPU)
//! └── Client (dispatches operations, owns the queue, reports device limits)
//! ```

mod traits;

pub mod cpu;

#[cfg(feature = "wgpu")]
pub mod wgpu;

pub use traits::{Device, Runtime, RuntimeClient};

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Validate that two tensors live on the same device
pub(crate) fn ensure_same_device<R: Runtime>(a: &Tensor<R>, b: &Tensor<R>) -> Result<()> {
    if !a.device().is_same(b.device()) {
        return Err(Error::DeviceMismatch);
    }
    Ok(())
}

/// Validate that two tensors live on the same device and share a shape
pub(crate) fn ensure_compatible<R: Runtime>(a: &Tensor<R>, b: &Tensor<R>) -> Result<()> {
    ensure_same_device(a, b)?;
    if a.shape() != b.shape() {
        return Err(Error::shape_mismatch(a.shape(), b.shape()));
    }
    Ok(())
}

/// Validate that a tensor is a 2D image
pub(crate) fn ensure_2d<R: Runtime>(t: &Tensor<R>, arg: &'static str) -> Result<(usize, usize)> {
    match t.shape() {
        [h, w] => Ok((*h, *w)),
        other => Err(Error::invalid_argument(
            arg,
            format!("expected a 2D array, got shape {:?}", other),
        )),
    }
}
