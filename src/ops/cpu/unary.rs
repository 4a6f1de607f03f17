//! CPU implementation of unary operations.

use crate::error::Result;
use crate::ops::{UnaryOp, UnaryOps};
use crate::runtime::cpu::helpers::{alloc_output, as_mut_slice, as_slice};
use crate::runtime::cpu::kernels::elementwise;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::tensor::Tensor;

fn unary_impl(
    client: &CpuClient,
    op: UnaryOp,
    a: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let mut out = alloc_output(client, a.shape())?;
    elementwise::unary_op(op, as_slice(a), as_mut_slice(&mut out)?);
    Ok(out)
}

impl UnaryOps<CpuRuntime> for CpuClient {
    fn neg(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_impl(self, UnaryOp::Neg, a)
    }

    fn abs(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_impl(self, UnaryOp::Abs, a)
    }

    fn sqrt(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_impl(self, UnaryOp::Sqrt, a)
    }

    fn sign(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_impl(self, UnaryOp::Sign, a)
    }

    fn is_zero(&self, a: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        unary_impl(self, UnaryOp::IsZero, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn test_sign_and_is_zero() {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        let a = Tensor::<CpuRuntime>::from_slice(&[-2.0, 0.0, 3.0], &[3], &device);

        assert_eq!(client.sign(&a).unwrap().to_vec(), vec![-1.0, 1.0, 1.0]);
        assert_eq!(client.is_zero(&a).unwrap().to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(client.abs(&a).unwrap().to_vec(), vec![2.0, 0.0, 3.0]);
        assert_eq!(client.neg(&a).unwrap().to_vec(), vec![2.0, -0.0, -3.0]);
    }
}
