//! Binary operations trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Element-wise binary operations on tensors.
///
/// Both operands must live on the same device and have identical shapes;
/// otherwise `DeviceMismatch` or `ShapeMismatch` is returned. There is no
/// broadcasting.
///
/// The `*_assign` variants update `a` in place. If `a` shares its buffer
/// with another tensor handle, the buffer is copied first.
///
/// # Example
///
/// ```ignore
/// let c = client.add(&a, &b)?;
/// client.sub_assign(&mut c, &a)?; // c == b
/// ```
pub trait BinaryOps<R: Runtime> {
    /// Element-wise addition: a + b
    fn add(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise subtraction: a - b
    fn sub(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise multiplication: a * b
    fn mul(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise division: a / b
    fn div(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise power: a^b
    fn pow(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise maximum
    fn maximum(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise minimum
    fn minimum(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// In-place addition: a += b
    fn add_assign(&self, a: &mut Tensor<R>, b: &Tensor<R>) -> Result<()>;

    /// In-place subtraction: a -= b
    fn sub_assign(&self, a: &mut Tensor<R>, b: &Tensor<R>) -> Result<()>;

    /// In-place multiplication: a *= b
    fn mul_assign(&self, a: &mut Tensor<R>, b: &Tensor<R>) -> Result<()>;

    /// In-place division: a /= b
    fn div_assign(&self, a: &mut Tensor<R>, b: &Tensor<R>) -> Result<()>;
}
