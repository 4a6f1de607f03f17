//! WebGPU implementation of 2D convolution operations.

use super::helpers::{
    ConvParams, ElementwiseParams, alloc_output, checked_numel, create_params_buffer,
    get_tensor_buffer,
};
use crate::error::{Error, Result};
use crate::ops::conv_common::{select_strategy, validate_kernel_2d, validate_kernel_sv};
use crate::ops::{Conv2dParams, ConvOps, ConvStrategy, Padding};
use crate::runtime::wgpu::shaders::conv;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};
use crate::runtime::{RuntimeClient, ensure_2d, ensure_same_device};
use crate::tensor::Tensor;

impl ConvOps<WgpuRuntime> for WgpuClient {
    fn convolve2d_with_strategy(
        &self,
        x: &Tensor<WgpuRuntime>,
        kernel: &Tensor<WgpuRuntime>,
        padding: Padding,
        strategy: ConvStrategy,
    ) -> Result<Tensor<WgpuRuntime>> {
        let (height, width) = ensure_2d(x, "x")?;
        let (kh, kw) = validate_kernel_2d(kernel.shape())?;
        ensure_same_device(x, kernel)?;

        let params = Conv2dParams {
            height,
            width,
            kh,
            kw,
            padding,
        };
        let out = alloc_output(self, x.shape())?;
        if x.numel() == 0 {
            return Ok(out);
        }
        checked_numel(x.numel(), "convolve2d")?;

        let strategy = select_strategy(
            strategy,
            &params,
            self.local_mem_size(),
            self.max_workgroup_size(),
            "wgpu",
        )?;
        let params_buf = create_params_buffer(self, &ConvParams::from(&params));
        let (xb, kb, ob) = (
            get_tensor_buffer(x)?,
            get_tensor_buffer(kernel)?,
            get_tensor_buffer(&out)?,
        );
        let launcher = match strategy {
            ConvStrategy::Tiled => conv::launch_conv2d_tiled,
            _ => conv::launch_conv2d_naive,
        };
        launcher(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &xb,
            &kb,
            &ob,
            &params_buf,
            &params,
        );
        Ok(out)
    }

    fn transpose2d(&self, kernel: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        validate_kernel_2d(kernel.shape())?;
        let out = alloc_output(self, kernel.shape())?;
        let numel = kernel.numel();
        if numel == 0 {
            return Ok(out);
        }

        let params = ElementwiseParams::new(checked_numel(numel, "transpose2d")?, 0.0);
        let params_buf = create_params_buffer(self, &params);
        let kernel_buf = get_tensor_buffer(kernel)?;
        let out_buf = get_tensor_buffer(&out)?;
        conv::launch_transpose2d(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &kernel_buf,
            &out_buf,
            &params_buf,
            numel,
        );
        Ok(out)
    }

    fn convolve2d_sv(
        &self,
        x: &Tensor<WgpuRuntime>,
        kernel: &Tensor<WgpuRuntime>,
        padding: Padding,
    ) -> Result<Tensor<WgpuRuntime>> {
        let (height, width) = ensure_2d(x, "x")?;
        let (kh, kw) = validate_kernel_sv(kernel.shape(), height, width)?;
        ensure_same_device(x, kernel)?;

        let params = Conv2dParams {
            height,
            width,
            kh,
            kw,
            padding,
        };
        let out = alloc_output(self, x.shape())?;
        if x.numel() == 0 {
            return Ok(out);
        }
        checked_numel(kernel.numel(), "convolve2d_sv")?;

        let params_buf = create_params_buffer(self, &ConvParams::from(&params));
        let x_buf = get_tensor_buffer(x)?;
        let kernel_buf = get_tensor_buffer(kernel)?;
        let out_buf = get_tensor_buffer(&out)?;
        conv::launch_conv2d_sv(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &x_buf,
            &kernel_buf,
            &out_buf,
            &params_buf,
            &params,
        );
        Ok(out)
    }

    fn transpose2d_sv(&self, kernel: &Tensor<WgpuRuntime>) -> Result<Tensor<WgpuRuntime>> {
        let &[_, _, height, width] = kernel.shape() else {
            return Err(Error::invalid_argument(
                "kernel",
                format!("expected a 4D spatially-varying kernel, got shape {:?}", kernel.shape()),
            ));
        };
        let (kh, kw) = validate_kernel_sv(kernel.shape(), height, width)?;
        let params = Conv2dParams {
            height,
            width,
            kh,
            kw,
            padding: Padding::Zero,
        };
        let out = alloc_output(self, kernel.shape())?;
        if kernel.numel() == 0 {
            return Ok(out);
        }
        checked_numel(kernel.numel(), "transpose2d_sv")?;

        let params_buf = create_params_buffer(self, &ConvParams::from(&params));
        let kernel_buf = get_tensor_buffer(kernel)?;
        let out_buf = get_tensor_buffer(&out)?;
        conv::launch_transpose2d_sv(
            self.pipeline_cache(),
            self.wgpu_queue(),
            &kernel_buf,
            &out_buf,
            &params_buf,
            &params,
        );
        Ok(out)
    }
}
