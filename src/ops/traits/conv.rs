//! 2D image convolution trait.

use crate::error::Result;
use crate::ops::conv_common::{ConvStrategy, Padding};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Same-size 2D convolution of an image with a small odd kernel.
///
/// With `c = (K - 1) / 2` the output is
///
/// ```text
/// y[i, j] = Σ_{a, b} k[a, b] · x[i + a - c_h, j + b - c_w]
/// ```
///
/// where out-of-range pixels are resolved by [`Padding`]. The output always
/// has the image's shape. Under zero padding, convolving with
/// [`ConvOps::transpose2d`] of a kernel is the adjoint of convolving with the
/// kernel itself.
pub trait ConvOps<R: Runtime> {
    /// Convolve a 2D image with a 2D kernel, choosing the kernel automatically.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if either operand is not 2D or a kernel dimension is even
    /// - `DeviceMismatch` if image and kernel live on different devices
    fn convolve2d(&self, x: &Tensor<R>, kernel: &Tensor<R>, padding: Padding) -> Result<Tensor<R>> {
        self.convolve2d_with_strategy(x, kernel, padding, ConvStrategy::Auto)
    }

    /// Convolve with an explicit kernel selection.
    ///
    /// `ConvStrategy::Tiled` returns `BackendLimitation` when the tile and its
    /// halo do not fit the device's local memory or workgroup size.
    fn convolve2d_with_strategy(
        &self,
        x: &Tensor<R>,
        kernel: &Tensor<R>,
        padding: Padding,
        strategy: ConvStrategy,
    ) -> Result<Tensor<R>>;

    /// Rotate a 2D kernel by 180 degrees: `kt[a, b] = k[kh-1-a, kw-1-b]`.
    fn transpose2d(&self, kernel: &Tensor<R>) -> Result<Tensor<R>>;

    /// Spatially-varying convolution with a `[kh, kw, H, W]` kernel:
    ///
    /// ```text
    /// y[i, j] = Σ_{a, b} k[a, b, i, j] · x[i + a - c_h, j + b - c_w]
    /// ```
    fn convolve2d_sv(&self, x: &Tensor<R>, kernel: &Tensor<R>, padding: Padding) -> Result<Tensor<R>>;

    /// Adjoint kernel of a spatially-varying kernel under zero padding:
    ///
    /// ```text
    /// kt[a', b', m, n] = k[kh-1-a', kw-1-b', m + a' - c_h, n + b' - c_w]
    /// ```
    ///
    /// with zero where the source pixel is out of range.
    fn transpose2d_sv(&self, kernel: &Tensor<R>) -> Result<Tensor<R>>;
}
