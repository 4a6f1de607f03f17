//! CPU implementation of tensor-scalar operations.

use crate::error::Result;
use crate::ops::{ScalarOp, ScalarOps};
use crate::runtime::cpu::helpers::{alloc_output, as_mut_slice, as_slice};
use crate::runtime::cpu::kernels::elementwise;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::ensure_compatible;
use crate::tensor::Tensor;

fn scalar_impl(
    client: &CpuClient,
    op: ScalarOp,
    a: &Tensor<CpuRuntime>,
    scalar: f64,
) -> Result<Tensor<CpuRuntime>> {
    let mut out = alloc_output(client, a.shape())?;
    elementwise::scalar_op(op, as_slice(a), scalar as f32, as_mut_slice(&mut out)?);
    Ok(out)
}

impl ScalarOps<CpuRuntime> for CpuClient {
    fn add_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_impl(self, ScalarOp::Add, a, scalar)
    }

    fn sub_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_impl(self, ScalarOp::Sub, a, scalar)
    }

    fn rsub_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_impl(self, ScalarOp::RSub, a, scalar)
    }

    fn mul_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_impl(self, ScalarOp::Mul, a, scalar)
    }

    fn div_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_impl(self, ScalarOp::Div, a, scalar)
    }

    fn pow_scalar(&self, a: &Tensor<CpuRuntime>, scalar: f64) -> Result<Tensor<CpuRuntime>> {
        scalar_impl(self, ScalarOp::Pow, a, scalar)
    }

    fn axpy(
        &self,
        a: &Tensor<CpuRuntime>,
        alpha: f64,
        b: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        ensure_compatible(a, b)?;
        let mut out = alloc_output(self, a.shape())?;
        elementwise::axpy(as_slice(a), alpha as f32, as_slice(b), as_mut_slice(&mut out)?);
        Ok(out)
    }

    fn scale_assign(&self, a: &mut Tensor<CpuRuntime>, scalar: f64) -> Result<()> {
        elementwise::scalar_op_assign(ScalarOp::Mul, as_mut_slice(a)?, scalar as f32);
        Ok(())
    }

    fn axpy_assign(
        &self,
        a: &mut Tensor<CpuRuntime>,
        alpha: f64,
        b: &Tensor<CpuRuntime>,
    ) -> Result<()> {
        ensure_compatible(a, b)?;
        elementwise::axpy_assign(as_mut_slice(a)?, alpha as f32, as_slice(b));
        Ok(())
    }
}
