//! CPU implementation of full reductions.

use crate::error::Result;
use crate::ops::{ReduceOp, ReduceOps};
use crate::runtime::cpu::helpers::as_slice;
use crate::runtime::cpu::kernels::reduce;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::ensure_compatible;
use crate::tensor::Tensor;

impl ReduceOps<CpuRuntime> for CpuClient {
    fn sum(&self, a: &Tensor<CpuRuntime>) -> Result<f64> {
        Ok(reduce::reduce(ReduceOp::Sum, as_slice(a)))
    }

    fn sum_sq(&self, a: &Tensor<CpuRuntime>) -> Result<f64> {
        Ok(reduce::reduce(ReduceOp::SumSq, as_slice(a)))
    }

    fn abs_sum(&self, a: &Tensor<CpuRuntime>) -> Result<f64> {
        Ok(reduce::reduce(ReduceOp::AbsSum, as_slice(a)))
    }

    fn min(&self, a: &Tensor<CpuRuntime>) -> Result<f64> {
        Ok(reduce::reduce(ReduceOp::Min, as_slice(a)))
    }

    fn max(&self, a: &Tensor<CpuRuntime>) -> Result<f64> {
        Ok(reduce::reduce(ReduceOp::Max, as_slice(a)))
    }

    fn dot(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<f64> {
        ensure_compatible(a, b)?;
        Ok(reduce::dot(as_slice(a), as_slice(b)))
    }
}
