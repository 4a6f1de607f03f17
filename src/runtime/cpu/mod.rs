//! CPU runtime implementation
//!
//! The CPU runtime uses aligned heap allocation and provides the reference
//! implementation for every operation. Element-wise kernels and convolution
//! bands are spread over threads with rayon when the `rayon` feature is on.
//!
//! The tiled convolution path stages each 16x16 output block plus its halo
//! in a block-local buffer, mirroring the GPU workgroup-memory kernel. The
//! client reports a configurable "local memory" budget so the same
//! selection rule applies on both backends.

mod client;
mod device;
pub(crate) mod helpers;
pub(crate) mod kernels;
mod runtime;

pub use crate::tensor::Tensor;
pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
