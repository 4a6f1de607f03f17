//! CPU implementation of shrinkage operators.

use crate::error::Result;
use crate::ops::{ProximalOps, Threshold};
use crate::runtime::cpu::helpers::{alloc_output, as_mut_slice, as_slice};
use crate::runtime::cpu::kernels::proximal;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::ensure_compatible;
use crate::tensor::Tensor;

impl ProximalOps<CpuRuntime> for CpuClient {
    fn soft_shrink(&self, x: &Tensor<CpuRuntime>, mu: f64) -> Result<Tensor<CpuRuntime>> {
        let mut out = alloc_output(self, x.shape())?;
        proximal::soft_shrink(as_slice(x), mu as f32, as_mut_slice(&mut out)?);
        Ok(out)
    }

    fn shrink2d(
        &self,
        ax: &Tensor<CpuRuntime>,
        ay: &Tensor<CpuRuntime>,
        threshold: Threshold<'_, CpuRuntime>,
    ) -> Result<(Tensor<CpuRuntime>, Tensor<CpuRuntime>)> {
        ensure_compatible(ax, ay)?;
        let mut out_x = alloc_output(self, ax.shape())?;
        let mut out_y = alloc_output(self, ax.shape())?;
        let (xs, ys) = (as_slice(ax), as_slice(ay));
        let (ox, oy) = (as_mut_slice(&mut out_x)?, as_mut_slice(&mut out_y)?);
        match threshold {
            Threshold::Scalar(mu) => {
                let mu = mu as f32;
                proximal::shrink2d(xs, ys, |_| mu, ox, oy);
            }
            Threshold::Field(mu) => {
                ensure_compatible(ax, mu)?;
                let mu = as_slice(mu);
                proximal::shrink2d(xs, ys, |i| mu[i], ox, oy);
            }
        }
        Ok((out_x, out_y))
    }

    fn bregman_kick_steps(
        &self,
        v: &Tensor<CpuRuntime>,
        r: &Tensor<CpuRuntime>,
        x: &Tensor<CpuRuntime>,
        mu: f64,
    ) -> Result<Tensor<CpuRuntime>> {
        ensure_compatible(v, r)?;
        ensure_compatible(v, x)?;
        let mut out = alloc_output(self, v.shape())?;
        proximal::bregman_kick_steps(
            as_slice(v),
            as_slice(r),
            as_slice(x),
            mu as f32,
            as_mut_slice(&mut out)?,
        );
        Ok(out)
    }
}
