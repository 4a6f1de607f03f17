//! Full-tensor reductions trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Reductions over every element of a tensor, returned to the host.
///
/// Each call is a synchronization point: queued work finishes before the
/// scalar is available. Partial sums are combined in f64 on the host.
pub trait ReduceOps<R: Runtime> {
    /// Σ a
    fn sum(&self, a: &Tensor<R>) -> Result<f64>;

    /// Σ a² (squared l2 norm)
    fn sum_sq(&self, a: &Tensor<R>) -> Result<f64>;

    /// Σ |a| (l1 norm)
    fn abs_sum(&self, a: &Tensor<R>) -> Result<f64>;

    /// Smallest element (+inf for an empty tensor)
    fn min(&self, a: &Tensor<R>) -> Result<f64>;

    /// Largest element (-inf for an empty tensor)
    fn max(&self, a: &Tensor<R>) -> Result<f64>;

    /// Σ a * b
    fn dot(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<f64>;
}
