//! WebGPU runtime implementation
//!
//! Cross-platform GPU backend built on wgpu. Kernels are WGSL compute
//! shaders compiled on first use and cached per device. Tensor buffers are
//! opaque `wgpu::Buffer`s tracked in a registry keyed by the u64 handle
//! stored in each tensor's storage.
//!
//! Only f32 is supported.

mod cache;
mod client;
mod device;
mod runtime;
pub(crate) mod shaders;

pub use crate::tensor::Tensor;
pub(crate) use client::get_buffer;
pub use client::WgpuClient;
pub use device::{WgpuDevice, WgpuError};
pub use runtime::{WgpuRuntime, is_wgpu_available};
