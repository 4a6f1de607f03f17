//! CPU implementation of finite-difference stencils.

use crate::error::Result;
use crate::ops::StencilOps;
use crate::runtime::cpu::helpers::{alloc_output, as_mut_slice, as_slice};
use crate::runtime::cpu::kernels::stencil;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::{ensure_2d, ensure_compatible};
use crate::tensor::Tensor;

impl StencilOps<CpuRuntime> for CpuClient {
    fn grad2d(
        &self,
        x: &Tensor<CpuRuntime>,
    ) -> Result<(Tensor<CpuRuntime>, Tensor<CpuRuntime>)> {
        let (height, width) = ensure_2d(x, "x")?;
        let mut gx = alloc_output(self, x.shape())?;
        let mut gy = alloc_output(self, x.shape())?;
        if x.numel() > 0 {
            stencil::grad2d(
                as_slice(x),
                as_mut_slice(&mut gx)?,
                as_mut_slice(&mut gy)?,
                height,
                width,
            );
        }
        Ok((gx, gy))
    }

    fn divergence2d(
        &self,
        px: &Tensor<CpuRuntime>,
        py: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        let (height, width) = ensure_2d(px, "px")?;
        ensure_compatible(px, py)?;
        let mut out = alloc_output(self, px.shape())?;
        if px.numel() > 0 {
            stencil::divergence2d(
                as_slice(px),
                as_slice(py),
                as_mut_slice(&mut out)?,
                height,
                width,
            );
        }
        Ok(out)
    }

    fn norm2d(
        &self,
        gx: &Tensor<CpuRuntime>,
        gy: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        ensure_compatible(gx, gy)?;
        let mut out = alloc_output(self, gx.shape())?;
        stencil::norm2d(as_slice(gx), as_slice(gy), as_mut_slice(&mut out)?);
        Ok(out)
    }
}
