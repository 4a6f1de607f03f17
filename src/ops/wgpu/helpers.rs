//! Helpers shared by the WebGPU operation implementations.

use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::BufferUsages;

use crate::error::{Error, Result};
use crate::ops::Conv2dParams;
use crate::runtime::RuntimeClient;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime, get_buffer};
use crate::tensor::Tensor;

/// Create a uniform buffer holding `data`.
pub(super) fn create_params_buffer<T: Pod>(client: &WgpuClient, data: &T) -> wgpu::Buffer {
    let buffer = client.wgpu_device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("params"),
        size: std::mem::size_of::<T>() as u64,
        usage: BufferUsages::UNIFORM | BufferUsages::STORAGE | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    client
        .queue
        .write_buffer(&buffer, 0, bytemuck::bytes_of(data));
    buffer
}

/// Resolve the wgpu buffer behind a tensor.
pub(crate) fn get_tensor_buffer(tensor: &Tensor<WgpuRuntime>) -> Result<Arc<wgpu::Buffer>> {
    let ptr = tensor.storage().ptr();
    get_buffer(ptr).ok_or_else(|| Error::Internal("Buffer not found in registry".to_string()))
}

/// Allocate output tensor with given shape.
pub(super) fn alloc_output(client: &WgpuClient, shape: &[usize]) -> Result<Tensor<WgpuRuntime>> {
    Tensor::try_empty(shape, client.device())
}

/// Element counts are passed to shaders as u32.
pub(super) fn checked_numel(n: usize, operation: &'static str) -> Result<u32> {
    u32::try_from(n).map_err(|_| {
        Error::backend_limitation(
            "wgpu",
            operation,
            format!("{n} elements exceed the u32 index range of WGSL kernels"),
        )
    })
}

// ============================================================================
// Params Structs (must match WGSL shader structs)
// ============================================================================

/// `{ numel, scalar }` for element-wise kernels
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct ElementwiseParams {
    pub numel: u32,
    pub scalar: f32,
    pub _pad: [u32; 2],
}

impl ElementwiseParams {
    pub fn new(numel: u32, scalar: f32) -> Self {
        Self {
            numel,
            scalar,
            _pad: [0; 2],
        }
    }
}

/// Image and kernel geometry for convolution kernels
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct ConvParams {
    pub height: u32,
    pub width: u32,
    pub kh: u32,
    pub kw: u32,
}

impl From<&Conv2dParams> for ConvParams {
    fn from(p: &Conv2dParams) -> Self {
        Self {
            height: p.height as u32,
            width: p.width as u32,
            kh: p.kh as u32,
            kw: p.kw as u32,
        }
    }
}

/// Image geometry for stencil kernels
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct StencilParams {
    pub height: u32,
    pub width: u32,
    pub numel: u32,
    pub _pad: u32,
}

/// Threshold parameters for shrinkage kernels
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct ShrinkParams {
    pub numel: u32,
    pub mu: f32,
    pub use_field: u32,
    pub _pad: u32,
}
