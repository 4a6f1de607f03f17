//! Tensor-scalar operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Operations combining a tensor with a host scalar.
///
/// Scalars are passed as `f64` and applied in the device precision (f32).
pub trait ScalarOps<R: Runtime> {
    /// a + s
    fn add_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;

    /// a - s
    fn sub_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;

    /// s - a
    fn rsub_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;

    /// a * s
    fn mul_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;

    /// a / s
    fn div_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;

    /// a^s
    fn pow_scalar(&self, a: &Tensor<R>, scalar: f64) -> Result<Tensor<R>>;

    /// Fused a + alpha * b
    fn axpy(&self, a: &Tensor<R>, alpha: f64, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// In-place a *= s
    fn scale_assign(&self, a: &mut Tensor<R>, scalar: f64) -> Result<()>;

    /// In-place a += alpha * b
    fn axpy_assign(&self, a: &mut Tensor<R>, alpha: f64, b: &Tensor<R>) -> Result<()>;
}
