//! WebGPU implementation of binary operations.

use super::helpers::{
    ElementwiseParams, alloc_output, checked_numel, create_params_buffer, get_tensor_buffer,
};
use crate::error::Result;
use crate::ops::{BinaryOp, BinaryOps};
use crate::runtime::ensure_compatible;
use crate::runtime::wgpu::shaders::elementwise;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::tensor::Tensor;

fn binary_impl(
    client: &WgpuClient,
    op: BinaryOp,
    a: &Tensor<WgpuRuntime>,
    b: &Tensor<WgpuRuntime>,
) -> Result<Tensor<WgpuRuntime>> {
    ensure_compatible(a, b)?;
    let out = alloc_output(client, a.shape())?;
    let numel = a.numel();
    if numel == 0 {
        return Ok(out);
    }

    let params = ElementwiseParams::new(checked_numel(numel, op.name())?, 0.0);
    let params_buf = create_params_buffer(client, &params);
    let a_buf = get_tensor_buffer(a)?;
    let b_buf = get_tensor_buffer(b)?;
    let out_buf = get_tensor_buffer(&out)?;
    elementwise::launch_binary(
        client.pipeline_cache(),
        client.wgpu_queue(),
        op,
        &a_buf,
        &b_buf,
        &out_buf,
        &params_buf,
        numel,
    );
    Ok(out)
}

fn binary_assign_impl(
    client: &WgpuClient,
    op: BinaryOp,
    a: &mut Tensor<WgpuRuntime>,
    b: &Tensor<WgpuRuntime>,
) -> Result<()> {
    ensure_compatible(a, b)?;
    let numel = a.numel();
    if numel == 0 {
        return Ok(());
    }
    a.make_unique()?;

    let params = ElementwiseParams::new(checked_numel(numel, op.name())?, 0.0);
    let params_buf = create_params_buffer(client, &params);
    let a_buf = get_tensor_buffer(a)?;
    let b_buf = get_tensor_buffer(b)?;
    elementwise::launch_binary_assign(
        client.pipeline_cache(),
        client.wgpu_queue(),
        op,
        &a_buf,
        &b_buf,
        &params_buf,
        numel,
    );
    Ok(())
}

impl BinaryOps<WgpuRuntime> for WgpuClient {
    fn add(&self, a: &Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Add, a, b)
    }

    fn sub(&self, a: &Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Sub, a, b)
    }

    fn mul(&self, a: &Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Mul, a, b)
    }

    fn div(&self, a: &Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Div, a, b)
    }

    fn pow(&self, a: &Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Pow, a, b)
    }

    fn maximum(
        &self,
        a: &Tensor<WgpuRuntime>,
        b: &Tensor<WgpuRuntime>,
    ) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Max, a, b)
    }

    fn minimum(
        &self,
        a: &Tensor<WgpuRuntime>,
        b: &Tensor<WgpuRuntime>,
    ) -> Result<Tensor<WgpuRuntime>> {
        binary_impl(self, BinaryOp::Min, a, b)
    }

    fn add_assign(&self, a: &mut Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Add, a, b)
    }

    fn sub_assign(&self, a: &mut Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Sub, a, b)
    }

    fn mul_assign(&self, a: &mut Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Mul, a, b)
    }

    fn div_assign(&self, a: &mut Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Div, a, b)
    }
}
