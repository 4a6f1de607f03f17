//! WebGPU implementation of unary operations.

use super::helpers::{
    ElementwiseParams, alloc_output, checked_numel, create_params_buffer, get_tensor_buffer,
};
use crate::error::Result;
use crate::ops::{UnaryOp, UnaryOps};
use crate::runtime::wgpu::shaders::elementwise;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::tensor::Tensor;

fn unary_impl(
    client: &WgpuClient,
    op: UnaryOp,
    a: &Tensor<WgpuRuntime>,
) -> Result<Tensor<WgpuRuntime>> {
    let out = alloc_output(client, a.shape())?;
    let numel = a.numel();
    if numel == 0 {
        return Ok(out);
    }

    let params = ElementwiseParams::new(checked_numel(numel, op.name())?, 0.0);
    let params_buf = create_params_buffer(client, &params);
    let a_buf = get_tensor_buffer(a)?;
    let out_buf = get_tensor_buffer(&out)?;
    elementwise::launch_unary(
        client.pipeline_cache(),
        client.wgpu_queue(),
        op,
        &a_buf,
        &out_buf,
        &params_buf,
        numel,
    );
    Ok(out)
}

impl UnaryOps<WgpuRuntime> for WgpuClient {
    fn neg(&self, a: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        unary_impl(self, UnaryOp::Neg, a)
    }

    fn abs(&self, a: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        unary_impl(self, UnaryOp::Abs, a)
    }

    fn sqrt(&self, a: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        unary_impl(self, UnaryOp::Sqrt, a)
    }

    fn sign(&self, a: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        unary_impl(self, UnaryOp::Sign, a)
    }

    fn is_zero(&self, a: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        unary_impl(self, UnaryOp::IsZero, a)
    }
}
