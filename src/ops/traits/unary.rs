//! Unary operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Element-wise unary operations on tensors.
pub trait UnaryOps<R: Runtime> {
    /// Negation: -a
    fn neg(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Absolute value: |a|
    fn abs(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Square root: sqrt(a)
    fn sqrt(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Sign: +1 where a >= 0, -1 elsewhere
    ///
    /// Zero maps to +1, matching the soft-threshold convention.
    fn sign(&self, a: &Tensor<R>) -> Result<Tensor<R>>;

    /// Zero indicator: 1 where a == 0, 0 elsewhere
    fn is_zero(&self, a: &Tensor<R>) -> Result<Tensor<R>>;
}
