//! Finite-difference stencils trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Discrete gradient and divergence on 2D images.
///
/// The gradient uses forward differences with a zero last column/row. The
/// divergence is its negative adjoint: `<grad x, p> = -<x, div p>`.
pub trait StencilOps<R: Runtime> {
    /// Forward-difference gradient.
    ///
    /// ```text
    /// gx[i, j] = x[i, j+1] - x[i, j]   (0 in the last column)
    /// gy[i, j] = x[i+1, j] - x[i, j]   (0 in the last row)
    /// ```
    fn grad2d(&self, x: &Tensor<R>) -> Result<(Tensor<R>, Tensor<R>)>;

    /// Backward-difference divergence of a vector field.
    ///
    /// ```text
    /// div[i, j] = px[i, j]·[j < W-1] - px[i, j-1]·[j > 0]
    ///           + py[i, j]·[i < H-1] - py[i-1, j]·[i > 0]
    /// ```
    fn divergence2d(&self, px: &Tensor<R>, py: &Tensor<R>) -> Result<Tensor<R>>;

    /// Pointwise magnitude `sqrt(gx² + gy²)`.
    fn norm2d(&self, gx: &Tensor<R>, gy: &Tensor<R>) -> Result<Tensor<R>>;
}
