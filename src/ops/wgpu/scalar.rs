//! WebGPU implementation of tensor-scalar operations.

use super::helpers::{
    ElementwiseParams, alloc_output, checked_numel, create_params_buffer, get_tensor_buffer,
};
use crate::error::Result;
use crate::ops::{ScalarOp, ScalarOps};
use crate::runtime::ensure_compatible;
use crate::runtime::wgpu::shaders::elementwise;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::tensor::Tensor;

fn scalar_impl(
    client: &WgpuClient,
    op: ScalarOp,
    a: &Tensor<WgpuRuntime>,
    scalar: f64,
) -> Result<Tensor<WgpuRuntime>> {
    let out = alloc_output(client, a.shape())?;
    let numel = a.numel();
    if numel == 0 {
        return Ok(out);
    }

    let params = ElementwiseParams::new(checked_numel(numel, op.name())?, scalar as f32);
    let params_buf = create_params_buffer(client, &params);
    let a_buf = get_tensor_buffer(a)?;
    let out_buf = get_tensor_buffer(&out)?;
    elementwise::launch_scalar(
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

impl ScalarOps<WgpuRuntime> for WgpuClient {
    fn add_scalar(&self, a: &Tensor<WgpuRuntime>, scalar: f64) -> Result<Tensor<WgpuRuntime>> {
        scalar_impl(self, ScalarOp::Add, a, scalar)
    }

    fn sub_scalar(&self, a: &Tensor<WgpuRuntime>, scalar: f64) -> Result<Tensor<WgpuRuntime>> {
        scalar_impl(self, ScalarOp::Sub, a, scalar)
    }

    fn rsub_scalar(&self, a: &Tensor<WgpuRuntime>, scalar: f64) -> Result<Tensor<WgpuRuntime>> {
        scalar_impl(self, ScalarOp::RSub, a, scalar)
    }

    fn mul_scalar(&self, a: &Tensor<WgpuRuntime>, scalar: f64) -> Result<Tensor<WgpuRuntime>> {
        scalar_impl(self, ScalarOp::Mul, a, scalar)
    }

    fn div_scalar(&self, a: &Tensor<WgpuRuntime>, scalar: f64) -> Result<Tensor<WgpuRuntime>> {
        scalar_impl(self, ScalarOp::Div, a, scalar)
    }

    fn pow_scalar(&self, a: &Tensor<WgpuRuntime>, scalar: f64) -> Result<Tensor<WgpuRuntime>> {
        scalar_impl(self, ScalarOp::Pow, a, scalar)
    }

    fn axpy(
        &self,
        a: &Tensor<WgpuRuntime>,
        alpha: f64,
        b: &Tensor<WgpuRuntime>,
    ) -> Result<Tensor<WgpuRuntime>> {
        ensure_compatible(a, b)?;
        let out = alloc_output(self, a.shape())?;
        let numel = a.numel();
        if numel == 0 {
            return Ok(out);
        }

        let params = ElementwiseParams::new(checked_numel(numel, "axpy")?, alpha as f32);
        let params_buf = create_params_buffer(self, &params);
        let a_buf = get_tensor_buffer(a)?;
        let b_buf = get_tensor_buffer(b)?;
        let out_buf = get_tensor_buffer(&out)?;
        elementwise::launch_axpy(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &a_buf,
            &b_buf,
            &out_buf,
            &params_buf,
            numel,
        );
        Ok(out)
    }

    fn scale_assign(&self, a: &mut Tensor<WgpuRuntime>, scalar: f64) -> Result<()> {
        let numel = a.numel();
        if numel == 0 {
            return Ok(());
        }
        a.make_unique()?;

        let params = ElementwiseParams::new(checked_numel(numel, "scale_assign")?, scalar as f32);
        let params_buf = create_params_buffer(self, &params);
        let a_buf = get_tensor_buffer(a)?;
        elementwise::launch_scale_assign(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &a_buf,
            &params_buf,
            numel,
        );
        Ok(())
    }

    fn axpy_assign(
        &self,
        a: &mut Tensor<WgpuRuntime>,
        alpha: f64,
        b: &Tensor<WgpuRuntime>,
    ) -> Result<()> {
        ensure_compatible(a, b)?;
        let numel = a.numel();
        if numel == 0 {
            return Ok(());
        }
        a.make_unique()?;

        let params = ElementwiseParams::new(checked_numel(numel, "axpy_assign")?, alpha as f32);
        let params_buf = create_params_buffer(self, &params);
        let a_buf = get_tensor_buffer(a)?;
        let b_buf = get_tensor_buffer(b)?;
        elementwise::launch_axpy_assign(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &a_buf,
            &b_buf,
            &params_buf,
            numel,
        );
        Ok(())
    }
}
