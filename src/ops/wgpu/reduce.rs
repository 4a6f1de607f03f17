//! WebGPU implementation of full reductions.
//!
//! The device folds the input into at most 1024 f32 partials; the host
//! combines them in f64.

use super::helpers::{ElementwiseParams, checked_numel, create_params_buffer, get_tensor_buffer};
use crate::error::Result;
use crate::ops::{ReduceOp, ReduceOps};
use crate::runtime::wgpu::shaders::reduce::{self, reduce_groups};
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::runtime::{RuntimeClient, ensure_compatible};
use crate::tensor::Tensor;

fn combine_partials(op: ReduceOp, partials: &Tensor<WgpuRuntime>) -> Result<f64> {
    Ok(partials
        .try_to_vec()?
        .into_iter()
        .fold(op.identity(), |acc, p| op.combine(acc, p as f64)))
}

fn reduce_impl(client: &WgpuClient, op: ReduceOp, a: &Tensor<WgpuRuntime>) -> Result<f64> {
    let numel = a.numel();
    if numel == 0 {
        return Ok(op.identity());
    }

    let partials = Tensor::<WgpuRuntime>::try_empty(&[reduce_groups(numel) as usize], client.device())?;
    let params = ElementwiseParams::new(checked_numel(numel, op.name())?, 0.0);
    let params_buf = create_params_buffer(client, &params);
    let a_buf = get_tensor_buffer(a)?;
    let partials_buf = get_tensor_buffer(&partials)?;
    reduce::launch_reduce(
        client.pipeline_cache(),
        client.wgpu_queue(),
        op,
        &a_buf,
        &partials_buf,
        &params_buf,
        numel,
    );
    combine_partials(op, &partials)
}

impl ReduceOps<WgpuRuntime> for WgpuClient {
    fn sum(&self, a: &Tensor<WgpuRuntime>) -> Result<f64> {
        reduce_impl(self, ReduceOp::Sum, a)
    }

    fn sum_sq(&self, a: &Tensor<WgpuRuntime>) -> Result<f64> {
        reduce_impl(self, ReduceOp::SumSq, a)
    }

    fn abs_sum(&self, a: &Tensor<WgpuRuntime>) -> Result<f64> {
        reduce_impl(self, ReduceOp::AbsSum, a)
    }

    fn min(&self, a: &Tensor<WgpuRuntime>) -> Result<f64> {
        reduce_impl(self, ReduceOp::Min, a)
    }

    fn max(&self, a: &Tensor<WgpuRuntime>) -> Result<f64> {
        reduce_impl(self, ReduceOp::Max, a)
    }

    fn dot(&self, a: &Tensor<WgpuRuntime>, b: &Tensor<WgpuRuntime>) -> Result<f64> {
        ensure_compatible(a, b)?;
        let numel = a.numel();
        if numel == 0 {
            return Ok(0.0);
        }

        let partials =
            Tensor::<WgpuRuntime>::try_empty(&[reduce_groups(numel) as usize], self.device())?;
        let params = ElementwiseParams::new(checked_numel(numel, "dot")?, 0.0);
        let params_buf = create_params_buffer(self, &params);
        let a_buf = get_tensor_buffer(a)?;
        let b_buf = get_tensor_buffer(b)?;
        let partials_buf = get_tensor_buffer(&partials)?;
        reduce::launch_dot(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &a_buf,
            &b_buf,
            &partials_buf,
            &params_buf,
            numel,
        );
        combine_partials(ReduceOp::Sum, &partials)
    }
}
