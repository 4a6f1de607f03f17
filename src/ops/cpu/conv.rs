//! CPU implementation of 2D convolution operations.

use crate::error::{Error, Result};
use crate::ops::conv_common::{select_strategy, validate_kernel_2d, validate_kernel_sv};
use crate::ops::{Conv2dParams, ConvOps, ConvStrategy, Padding};
use crate::runtime::cpu::helpers::{alloc_output, as_mut_slice, as_slice};
use crate::runtime::cpu::kernels::conv;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::{RuntimeClient, ensure_2d, ensure_same_device};
use crate::tensor::Tensor;

impl ConvOps<CpuRuntime> for CpuClient {
    fn convolve2d_with_strategy(
        &self,
        x: &Tensor<CpuRuntime>,
        kernel: &Tensor<CpuRuntime>,
        padding: Padding,
        strategy: ConvStrategy,
    ) -> Result<Tensor<CpuRuntime>> {
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
        let mut out = alloc_output(self, x.shape())?;
        if x.numel() == 0 {
            return Ok(out);
        }

        let strategy = select_strategy(
            strategy,
            &params,
            self.local_mem_size(),
            self.max_workgroup_size(),
            "cpu",
        )?;
        let (xs, ks, os) = (as_slice(x), as_slice(kernel), as_mut_slice(&mut out)?);
        match strategy {
            ConvStrategy::Tiled => conv::conv2d_tiled(xs, ks, os, params),
            _ => conv::conv2d_naive(xs, ks, os, params),
        }
        Ok(out)
    }

    fn transpose2d(&self, kernel: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        validate_kernel_2d(kernel.shape())?;
        let mut out = alloc_output(self, kernel.shape())?;
        conv::rotate180(as_slice(kernel), as_mut_slice(&mut out)?);
        Ok(out)
    }

    fn convolve2d_sv(
        &self,
        x: &Tensor<CpuRuntime>,
        kernel: &Tensor<CpuRuntime>,
        padding: Padding,
    ) -> Result<Tensor<CpuRuntime>> {
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
        let mut out = alloc_output(self, x.shape())?;
        if x.numel() == 0 {
            return Ok(out);
        }
        conv::conv2d_sv(as_slice(x), as_slice(kernel), as_mut_slice(&mut out)?, params);
        Ok(out)
    }

    fn transpose2d_sv(&self, kernel: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
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
        let mut out = alloc_output(self, kernel.shape())?;
        if kernel.numel() == 0 {
            return Ok(out);
        }
        conv::transpose_sv(as_slice(kernel), as_mut_slice(&mut out)?, params);
        Ok(out)
    }
}
