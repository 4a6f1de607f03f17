//! CPU implementation of binary operations.

use crate::error::Result;
use crate::ops::{BinaryOp, BinaryOps};
use crate::runtime::cpu::helpers::{alloc_output, as_mut_slice, as_slice};
use crate::runtime::cpu::kernels::elementwise;
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::ensure_compatible;
use crate::tensor::Tensor;

fn binary_impl(
    client: &CpuClient,
    op: BinaryOp,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    ensure_compatible(a, b)?;
    let mut out = alloc_output(client, a.shape())?;
    elementwise::binary_op(op, as_slice(a), as_slice(b), as_mut_slice(&mut out)?);
    Ok(out)
}

fn binary_assign_impl(
    op: BinaryOp,
    a: &mut Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<()> {
    ensure_compatible(a, b)?;
    elementwise::binary_op_assign(op, as_mut_slice(a)?, as_slice(b));
    Ok(())
}

impl BinaryOps<CpuRuntime> for CpuClient {
    fn add(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Add, a, b)
    }

    fn sub(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Sub, a, b)
    }

    fn mul(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Mul, a, b)
    }

    fn div(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Div, a, b)
    }

    fn pow(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Pow, a, b)
    }

    fn maximum(
        &self,
        a: &Tensor<CpuRuntime>,
        b: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Max, a, b)
    }

    fn minimum(
        &self,
        a: &Tensor<CpuRuntime>,
        b: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        binary_impl(self, BinaryOp::Min, a, b)
    }

    fn add_assign(&self, a: &mut Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(BinaryOp::Add, a, b)
    }

    fn sub_assign(&self, a: &mut Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(BinaryOp::Sub, a, b)
    }

    fn mul_assign(&self, a: &mut Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(BinaryOp::Mul, a, b)
    }

    fn div_assign(&self, a: &mut Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(BinaryOp::Div, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runtime::Runtime;

    #[test]
    fn test_binary_ops() {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0, 2.0, 3.0, 4.0], &[2, 2], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[4.0, 3.0, 2.0, 1.0], &[2, 2], &device);

        assert_eq!(client.add(&a, &b).unwrap().to_vec(), vec![5.0; 4]);
        assert_eq!(client.sub(&a, &b).unwrap().to_vec(), vec![-3.0, -1.0, 1.0, 3.0]);
        assert_eq!(client.mul(&a, &b).unwrap().to_vec(), vec![4.0, 6.0, 6.0, 4.0]);
        assert_eq!(client.maximum(&a, &b).unwrap().to_vec(), vec![4.0, 3.0, 3.0, 4.0]);
        assert_eq!(client.minimum(&a, &b).unwrap().to_vec(), vec![1.0, 2.0, 2.0, 1.0]);
        assert_eq!(client.pow(&a, &b).unwrap().to_vec(), vec![1.0, 8.0, 9.0, 4.0]);
    }

    #[test]
    fn test_assign_does_not_touch_clones() {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0, 2.0], &[2], &device);
        let mut b = a.clone();
        client.add_assign(&mut b, &a).unwrap();
        assert_eq!(a.to_vec(), vec![1.0, 2.0]);
        assert_eq!(b.to_vec(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        let a = Tensor::<CpuRuntime>::zeros(&[2, 3], &device);
        let b = Tensor::<CpuRuntime>::zeros(&[3, 2], &device);
        assert!(matches!(client.add(&a, &b), Err(Error::ShapeMismatch { .. })));
    }
}
