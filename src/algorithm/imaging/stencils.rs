//! Fixed forward-difference stencils and the masked Laplacian built on them.

use crate::error::{Error, Result};
use crate::ops::{BinaryOps, ConvOps, Padding};
use crate::runtime::{Runtime, ensure_compatible};
use crate::tensor::Tensor;

/// Forward differences `dx = [0, -1, 1]`, `dy = dxᵀ` and their 180° rotations.
///
/// Convolving with `dx_t` is the adjoint of convolving with `dx` under zero
/// padding, and likewise for `dy`.
#[derive(Debug, Clone)]
pub struct DifferenceStencils<R: Runtime> {
    /// Horizontal forward difference, shape `[1, 3]`
    pub dx: Tensor<R>,
    /// Vertical forward difference, shape `[3, 1]`
    pub dy: Tensor<R>,
    /// Adjoint of `dx`, shape `[1, 3]`
    pub dx_t: Tensor<R>,
    /// Adjoint of `dy`, shape `[3, 1]`
    pub dy_t: Tensor<R>,
}

const FORWARD: [f32; 3] = [0.0, -1.0, 1.0];
const FORWARD_T: [f32; 3] = [1.0, -1.0, 0.0];

impl<R: Runtime> DifferenceStencils<R> {
    /// Upload the four stencils to `device`.
    pub fn new(device: &R::Device) -> Result<Self> {
        Ok(Self {
            dx: Tensor::try_from_slice(&FORWARD, &[1, 3], device)?,
            dy: Tensor::try_from_slice(&FORWARD, &[3, 1], device)?,
            dx_t: Tensor::try_from_slice(&FORWARD_T, &[1, 3], device)?,
            dy_t: Tensor::try_from_slice(&FORWARD_T, &[3, 1], device)?,
        })
    }
}

/// `x -> Dxᵀ(M·Dx x) + Dyᵀ(M·Dy x)` for a 0/1 mask `M`.
///
/// Symmetric positive semi-definite; the smoothness term of harmonic and TV
/// inpainting. Differences are zero-padded convolutions with the stencils.
pub struct MaskedLaplacianOperator<'a, R: Runtime, C> {
    client: &'a C,
    mask: Tensor<R>,
    stencils: DifferenceStencils<R>,
}

impl<'a, R, C> MaskedLaplacianOperator<'a, R, C>
where
    R: Runtime,
    C: BinaryOps<R> + ConvOps<R>,
{
    /// Build the operator for a 2D mask (1 where the image is unknown).
    pub fn new(client: &'a C, mask: &Tensor<R>) -> Result<Self> {
        if mask.ndim() != 2 {
            return Err(Error::invalid_argument(
                "mask",
                format!("expected a 2D mask, got shape {:?}", mask.shape()),
            ));
        }
        Ok(Self {
            client,
            mask: mask.clone(),
            stencils: DifferenceStencils::new(mask.device())?,
        })
    }

    /// The mask this operator was built with
    pub fn mask(&self) -> &Tensor<R> {
        &self.mask
    }

    /// Forward differences `(Dx x, Dy x)`.
    pub fn differences(&self, x: &Tensor<R>) -> Result<(Tensor<R>, Tensor<R>)> {
        ensure_compatible(x, &self.mask)?;
        let gx = self.client.convolve2d(x, &self.stencils.dx, Padding::Zero)?;
        let gy = self.client.convolve2d(x, &self.stencils.dy, Padding::Zero)?;
        Ok((gx, gy))
    }

    /// Masked adjoint difference `Dxᵀ(M·px) + Dyᵀ(M·py)`.
    pub fn masked_adjoint(&self, px: &Tensor<R>, py: &Tensor<R>) -> Result<Tensor<R>> {
        let mx = self.client.mul(&self.mask, px)?;
        let my = self.client.mul(&self.mask, py)?;
        let mut out = self.client.convolve2d(&mx, &self.stencils.dx_t, Padding::Zero)?;
        let ty = self.client.convolve2d(&my, &self.stencils.dy_t, Padding::Zero)?;
        self.client.add_assign(&mut out, &ty)?;
        Ok(out)
    }

    /// `Dxᵀ(M·Dx x) + Dyᵀ(M·Dy x)`
    pub fn laplacian(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        let (gx, gy) = self.differences(x)?;
        self.masked_adjoint(&gx, &gy)
    }
}
