//! WebGPU implementation of finite-difference stencils.

use super::helpers::{
    StencilParams, alloc_output, checked_numel, create_params_buffer, get_tensor_buffer,
};
use crate::error::Result;
use crate::ops::StencilOps;
use crate::runtime::wgpu::shaders::stencil::launch_stencil;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::runtime::{ensure_2d, ensure_compatible};
use crate::tensor::Tensor;

fn stencil_params(height: usize, width: usize, op: &'static str) -> Result<StencilParams> {
    Ok(StencilParams {
        height: height as u32,
        width: width as u32,
        numel: checked_numel(height * width, op)?,
        _pad: 0,
    })
}

impl StencilOps<WgpuRuntime> for WgpuClient {
    fn grad2d(
        &self,
        x: &Tensor<WgpuRuntime>,
    ) -> Result<(Tensor<WgpuRuntime>, Tensor<WgpuRuntime>)> {
        let (height, width) = ensure_2d(x, "x")?;
        let gx = alloc_output(self, x.shape())?;
        let gy = alloc_output(self, x.shape())?;
        if x.numel() == 0 {
            return Ok((gx, gy));
        }

        let params_buf = create_params_buffer(self, &stencil_params(height, width, "grad2d")?);
        let x_buf = get_tensor_buffer(x)?;
        let gx_buf = get_tensor_buffer(&gx)?;
        let gy_buf = get_tensor_buffer(&gy)?;
        launch_stencil(
            self.pipeline_cache(),
            self.wgpu_queue(),
            "grad2d",
            [&x_buf, &gx_buf, &gy_buf],
            &params_buf,
            x.numel(),
        );
        Ok((gx, gy))
    }

    fn divergence2d(
        &self,
        px: &Tensor<WgpuRuntime>,
        py: &Tensor<WgpuRuntime>,
    ) -> Result<Tensor<WgpuRuntime>> {
        let (height, width) = ensure_2d(px, "px")?;
        ensure_compatible(px, py)?;
        let out = alloc_output(self, px.shape())?;
        if px.numel() == 0 {
            return Ok(out);
        }

        let params_buf =
            create_params_buffer(self, &stencil_params(height, width, "divergence2d")?);
        let px_buf = get_tensor_buffer(px)?;
        let py_buf = get_tensor_buffer(py)?;
        let out_buf = get_tensor_buffer(&out)?;
        launch_stencil(
            self.pipeline_cache(),
            self.wgpu_queue(),
            "divergence2d",
            [&px_buf, &py_buf, &out_buf],
            &params_buf,
            px.numel(),
        );
        Ok(out)
    }

    fn norm2d(
        &self,
        gx: &Tensor<WgpuRuntime>,
        gy: &Tensor<WgpuRuntime>,
    ) -> Result<Tensor<WgpuRuntime>> {
        ensure_compatible(gx, gy)?;
        let out = alloc_output(self, gx.shape())?;
        let numel = gx.numel();
        if numel == 0 {
            return Ok(out);
        }

        // Treated as one row; the magnitude is purely element-wise
        let params_buf = create_params_buffer(self, &stencil_params(1, numel, "norm2d")?);
        let gx_buf = get_tensor_buffer(gx)?;
        let gy_buf = get_tensor_buffer(gy)?;
        let out_buf = get_tensor_buffer(&out)?;
        launch_stencil(
            self.pipeline_cache(),
            self.wgpu_queue(),
            "norm2d",
            [&gx_buf, &gy_buf, &out_buf],
            &params_buf,
            numel,
        );
        Ok(out)
    }
}
