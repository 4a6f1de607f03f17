//! WebGPU implementation of shrinkage operators.

use super::helpers::{
    ShrinkParams, alloc_output, checked_numel, create_params_buffer, get_tensor_buffer,
};
use crate::error::Result;
use crate::ops::{ProximalOps, Threshold};
use crate::runtime::ensure_compatible;
use crate::runtime::wgpu::shaders::proximal;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::tensor::Tensor;

impl ProximalOps<WgpuRuntime> for WgpuClient {
    fn soft_shrink(&self, x: &Tensor<WgpuRuntime>, mu: f64) -> Result<Tensor<WgpuRuntime>> {
        let out = alloc_output(self, x.shape())?;
        let numel = x.numel();
        if numel == 0 {
            return Ok(out);
        }

        let params = ShrinkParams {
            numel: checked_numel(numel, "soft_shrink")?,
            mu: mu as f32,
            use_field: 0,
            _pad: 0,
        };
        let params_buf = create_params_buffer(self, &params);
        let x_buf = get_tensor_buffer(x)?;
        let out_buf = get_tensor_buffer(&out)?;
        proximal::launch_soft_shrink(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &x_buf,
            &out_buf,
            &params_buf,
            numel,
        );
        Ok(out)
    }

    fn shrink2d(
        &self,
        ax: &Tensor<WgpuRuntime>,
        ay: &Tensor<WgpuRuntime>,
        threshold: Threshold<'_, WgpuRuntime>,
    ) -> Result<(Tensor<WgpuRuntime>, Tensor<WgpuRuntime>)> {
        ensure_compatible(ax, ay)?;
        let out_x = alloc_output(self, ax.shape())?;
        let out_y = alloc_output(self, ax.shape())?;
        let numel = ax.numel();
        if numel == 0 {
            return Ok((out_x, out_y));
        }

        let ax_buf = get_tensor_buffer(ax)?;
        let (mu, use_field, mu_buf) = match threshold {
            Threshold::Scalar(mu) => (mu as f32, 0, ax_buf.clone()),
            Threshold::Field(field) => {
                ensure_compatible(ax, field)?;
                (0.0, 1, get_tensor_buffer(field)?)
            }
        };
        let params = ShrinkParams {
            numel: checked_numel(numel, "shrink2d")?,
            mu,
            use_field,
            _pad: 0,
        };
        let params_buf = create_params_buffer(self, &params);
        let ay_buf = get_tensor_buffer(ay)?;
        let out_x_buf = get_tensor_buffer(&out_x)?;
        let out_y_buf = get_tensor_buffer(&out_y)?;
        // With a scalar threshold the field binding is a placeholder that is never read
        proximal::launch_shrink2d(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &ax_buf,
            &ay_buf,
            &mu_buf,
            &out_x_buf,
            &out_y_buf,
            &params_buf,
            numel,
        );
        Ok((out_x, out_y))
    }

    fn bregman_kick_steps(
        &self,
        v: &Tensor<WgpuRuntime>,
        r: &Tensor<WgpuRuntime>,
        x: &Tensor<WgpuRuntime>,
        mu: f64,
    ) -> Result<Tensor<WgpuRuntime>> {
        ensure_compatible(v, r)?;
        ensure_compatible(v, x)?;
        let out = alloc_output(self, v.shape())?;
        let numel = v.numel();
        if numel == 0 {
            return Ok(out);
        }

        let params = ShrinkParams {
            numel: checked_numel(numel, "bregman_kick_steps")?,
            mu: mu as f32,
            use_field: 0,
            _pad: 0,
        };
        let params_buf = create_params_buffer(self, &params);
        let v_buf = get_tensor_buffer(v)?;
        let r_buf = get_tensor_buffer(r)?;
        let x_buf = get_tensor_buffer(x)?;
        let out_buf = get_tensor_buffer(&out)?;
        proximal::launch_bregman_kick_steps(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &v_buf,
            &r_buf,
            &x_buf,
            &out_buf,
            &params_buf,
            numel,
        );
        Ok(out)
    }
}
