//! Linear and proximal operator seams
//!
//! Solvers only see these two traits. A closure works anywhere an operator is
//! expected:
//!
//! ```rust,ignore
//! let ata = |x: &Tensor<CpuRuntime>| client.mul_scalar(x, 2.0);
//! let prox = SoftThreshold::new(&client);
//! let result = client.fista(&ata, &atb, None, &prox, FistaOptions::default())?;
//! ```
//!
//! The concrete operators below borrow the runtime client and own any
//! kernels they need, so building one uploads at most a few small tensors.

use crate::algorithm::imaging::stencils::MaskedLaplacianOperator;
use crate::algorithm::proximal::{TvOptions, denoise_tv};
use crate::error::{Error, Result};
use crate::ops::conv_common::{validate_kernel_2d, validate_kernel_sv};
use crate::ops::{
    BinaryOps, ConvOps, Padding, ProximalOps, ReduceOps, ScalarOps, StencilOps,
};
use crate::runtime::{Runtime, ensure_compatible};
use crate::tensor::Tensor;

/// A linear map from a tensor to a tensor of the same shape.
///
/// Implementations must be deterministic and must not mutate their input.
pub trait LinearOperator<R: Runtime> {
    /// Compute `A x`.
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>>;
}

impl<R, F> LinearOperator<R> for F
where
    R: Runtime,
    F: Fn(&Tensor<R>) -> Result<Tensor<R>>,
{
    #[inline]
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        self(x)
    }
}

/// `v -> argmin_x ½||x - v||² + θ·R(x)` for some convex regularizer `R`.
pub trait ProximalOperator<R: Runtime> {
    /// Evaluate the proximal map at `v` with weight `theta`.
    fn apply(&self, v: &Tensor<R>, theta: f64) -> Result<Tensor<R>>;
}

impl<R, F> ProximalOperator<R> for F
where
    R: Runtime,
    F: Fn(&Tensor<R>, f64) -> Result<Tensor<R>>,
{
    #[inline]
    fn apply(&self, v: &Tensor<R>, theta: f64) -> Result<Tensor<R>> {
        self(v, theta)
    }
}

// ============================================================================
// Linear operators
// ============================================================================

/// `x -> conv(x, k)`
pub struct ConvolutionOperator<'a, R: Runtime, C> {
    client: &'a C,
    kernel: Tensor<R>,
    padding: Padding,
}

impl<'a, R: Runtime, C: ConvOps<R>> ConvolutionOperator<'a, R, C> {
    /// Convolution with a fixed odd-sized 2D kernel.
    pub fn new(client: &'a C, kernel: &Tensor<R>, padding: Padding) -> Result<Self> {
        validate_kernel_2d(kernel.shape())?;
        Ok(Self {
            client,
            kernel: kernel.clone(),
            padding,
        })
    }

    /// Convolution with the rotated kernel.
    ///
    /// This is the exact adjoint under [`Padding::Zero`] only.
    pub fn adjoint(&self) -> Result<Self> {
        Ok(Self {
            client: self.client,
            kernel: self.client.transpose2d(&self.kernel)?,
            padding: self.padding,
        })
    }

    /// The convolution kernel
    pub fn kernel(&self) -> &Tensor<R> {
        &self.kernel
    }
}

impl<R: Runtime, C: ConvOps<R>> LinearOperator<R> for ConvolutionOperator<'_, R, C> {
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        self.client.convolve2d(x, &self.kernel, self.padding)
    }
}

/// `x -> conv(conv(x, kernel), psf)`, the normal operator of a blur.
///
/// `kernel` defaults to `transpose2d(psf)`.
pub struct NormalConvolutionOperator<'a, R: Runtime, C> {
    client: &'a C,
    psf: Tensor<R>,
    kernel: Tensor<R>,
    padding: Padding,
}

impl<'a, R: Runtime, C: ConvOps<R>> NormalConvolutionOperator<'a, R, C> {
    /// Build from a point spread function and an optional explicit kernel.
    pub fn new(
        client: &'a C,
        psf: &Tensor<R>,
        kernel: Option<&Tensor<R>>,
        padding: Padding,
    ) -> Result<Self> {
        validate_kernel_2d(psf.shape())?;
        let kernel = match kernel {
            Some(k) => {
                validate_kernel_2d(k.shape())?;
                k.clone()
            }
            None => client.transpose2d(psf)?,
        };
        Ok(Self {
            client,
            psf: psf.clone(),
            kernel,
            padding,
        })
    }

    /// `conv(b, psf)`, the right-hand side matching this operator.
    pub fn rhs(&self, b: &Tensor<R>) -> Result<Tensor<R>> {
        self.client.convolve2d(b, &self.psf, self.padding)
    }
}

impl<R: Runtime, C: ConvOps<R>> LinearOperator<R> for NormalConvolutionOperator<'_, R, C> {
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        let blurred = self.client.convolve2d(x, &self.kernel, self.padding)?;
        self.client.convolve2d(&blurred, &self.psf, self.padding)
    }
}

/// Spatially-varying form of [`NormalConvolutionOperator`].
///
/// `psf` and `kernel` have layout `[kh, kw, height, width]`; `kernel`
/// defaults to `transpose2d_sv(psf)`.
pub struct SvNormalConvolutionOperator<'a, R: Runtime, C> {
    client: &'a C,
    psf: Tensor<R>,
    kernel: Tensor<R>,
    padding: Padding,
}

impl<'a, R: Runtime, C: ConvOps<R>> SvNormalConvolutionOperator<'a, R, C> {
    /// Build from a 4D point spread function and an optional explicit kernel.
    pub fn new(
        client: &'a C,
        psf: &Tensor<R>,
        kernel: Option<&Tensor<R>>,
        padding: Padding,
    ) -> Result<Self> {
        let &[_, _, height, width] = psf.shape() else {
            return Err(Error::invalid_argument(
                "psf",
                format!("expected a 4D spatially-varying PSF, got shape {:?}", psf.shape()),
            ));
        };
        validate_kernel_sv(psf.shape(), height, width)?;
        let kernel = match kernel {
            Some(k) => {
                validate_kernel_sv(k.shape(), height, width)?;
                k.clone()
            }
            None => client.transpose2d_sv(psf)?,
        };
        Ok(Self {
            client,
            psf: psf.clone(),
            kernel,
            padding,
        })
    }

    /// `conv_sv(b, psf)`, the right-hand side matching this operator.
    pub fn rhs(&self, b: &Tensor<R>) -> Result<Tensor<R>> {
        self.client.convolve2d_sv(b, &self.psf, self.padding)
    }
}

impl<R: Runtime, C: ConvOps<R>> LinearOperator<R> for SvNormalConvolutionOperator<'_, R, C> {
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        let blurred = self.client.convolve2d_sv(x, &self.kernel, self.padding)?;
        self.client.convolve2d_sv(&blurred, &self.psf, self.padding)
    }
}

impl<R, C> LinearOperator<R> for MaskedLaplacianOperator<'_, R, C>
where
    R: Runtime,
    C: BinaryOps<R> + ConvOps<R>,
{
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        self.laplacian(x)
    }
}

/// `x -> (1 - mask)·x + mu·masked_laplacian(x)`
///
/// Symmetric positive definite whenever at least one pixel is known, so it
/// can be inverted with CG.
pub struct HarmonicInpaintOperator<'a, R: Runtime, C> {
    client: &'a C,
    laplacian: MaskedLaplacianOperator<'a, R, C>,
    known: Tensor<R>,
    mu: f64,
}

impl<'a, R, C> HarmonicInpaintOperator<'a, R, C>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ConvOps<R>,
{
    /// Build for a 0/1 mask (1 where the image is unknown) and smoothness weight.
    pub fn new(client: &'a C, mask: &Tensor<R>, mu: f64) -> Result<Self> {
        let laplacian = MaskedLaplacianOperator::new(client, mask)?;
        let known = client.rsub_scalar(mask, 1.0)?;
        Ok(Self {
            client,
            laplacian,
            known,
            mu,
        })
    }

    /// `1 - mask`
    pub fn known(&self) -> &Tensor<R> {
        &self.known
    }

    /// The smoothness term alone
    pub fn laplacian(&self) -> &MaskedLaplacianOperator<'a, R, C> {
        &self.laplacian
    }
}

impl<R, C> LinearOperator<R> for HarmonicInpaintOperator<'_, R, C>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ConvOps<R>,
{
    fn apply(&self, x: &Tensor<R>) -> Result<Tensor<R>> {
        ensure_compatible(x, &self.known)?;
        let smooth = self.laplacian.laplacian(x)?;
        let data = self.client.mul(&self.known, x)?;
        self.client.axpy(&data, self.mu, &smooth)
    }
}

// ============================================================================
// Proximal operators
// ============================================================================

/// Prox of `θ·||x||₁`: elementwise soft threshold.
pub struct SoftThreshold<'a, C> {
    client: &'a C,
}

impl<'a, C> SoftThreshold<'a, C> {
    /// Soft threshold on `client`.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }
}

impl<R: Runtime, C: ProximalOps<R>> ProximalOperator<R> for SoftThreshold<'_, C> {
    fn apply(&self, v: &Tensor<R>, theta: f64) -> Result<Tensor<R>> {
        self.client.soft_shrink(v, theta)
    }
}

/// Prox of `θ·TV(x)` computed by [`denoise_tv`] with `weight = θ`.
pub struct TvProx<'a, C> {
    client: &'a C,
    /// Relative energy tolerance of the inner solver
    pub eps: f64,
    /// Inner iteration cap
    pub max_iter: usize,
}

impl<'a, C> TvProx<'a, C> {
    /// TV prox with the inner-solver defaults of [`TvOptions`].
    pub fn new(client: &'a C) -> Self {
        let defaults = TvOptions::default();
        Self {
            client,
            eps: defaults.eps,
            max_iter: defaults.max_iter,
        }
    }

    /// TV prox with explicit inner-solver settings (`weight` is ignored).
    pub fn with_options(client: &'a C, options: TvOptions) -> Self {
        Self {
            client,
            eps: options.eps,
            max_iter: options.max_iter,
        }
    }
}

impl<R, C> ProximalOperator<R> for TvProx<'_, C>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ReduceOps<R> + StencilOps<R>,
{
    fn apply(&self, v: &Tensor<R>, theta: f64) -> Result<Tensor<R>> {
        let options = TvOptions {
            weight: theta,
            eps: self.eps,
            max_iter: self.max_iter,
        };
        denoise_tv(self.client, v, options)
    }
}

/// Prox of the zero regularizer: returns its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProx;

impl<R: Runtime> ProximalOperator<R> for IdentityProx {
    fn apply(&self, v: &Tensor<R>, _theta: f64) -> Result<Tensor<R>> {
        Ok(v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuClient, CpuRuntime};

    fn setup() -> (CpuClient, <CpuRuntime as Runtime>::Device) {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        (client, device)
    }

    #[test]
    fn test_closure_is_operator() {
        let (client, device) = setup();
        let double = |x: &Tensor<CpuRuntime>| client.mul_scalar(x, 2.0);
        let x = Tensor::<CpuRuntime>::from_slice(&[1.0, -2.0], &[2], &device);
        assert_eq!(LinearOperator::apply(&double, &x).unwrap().to_vec(), vec![2.0, -4.0]);
    }

    #[test]
    fn test_normal_operator_is_symmetric() {
        let (client, device) = setup();
        let psf = Tensor::<CpuRuntime>::from_slice(
            &[0.0, 0.1, 0.0, 0.2, 0.4, 0.1, 0.0, 0.2, 0.0],
            &[3, 3],
            &device,
        );
        let op = NormalConvolutionOperator::new(&client, &psf, None, Padding::Zero).unwrap();

        let x: Vec<f32> = (0..36).map(|i| ((i * 7) % 11) as f32 - 5.0).collect();
        let y: Vec<f32> = (0..36).map(|i| ((i * 5) % 13) as f32 - 6.0).collect();
        let x = Tensor::<CpuRuntime>::from_slice(&x, &[6, 6], &device);
        let y = Tensor::<CpuRuntime>::from_slice(&y, &[6, 6], &device);

        let lhs = client.dot(&op.apply(&x).unwrap(), &y).unwrap();
        let rhs = client.dot(&x, &op.apply(&y).unwrap()).unwrap();
        assert!((lhs - rhs).abs() <= 1e-4 * lhs.abs().max(1.0));
    }

    #[test]
    fn test_harmonic_operator_identity_on_known_pixels() {
        let (client, device) = setup();
        let mask = Tensor::<CpuRuntime>::zeros(&[4, 4], &device);
        let op = HarmonicInpaintOperator::new(&client, &mask, 1.0).unwrap();
        let x: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let xt = Tensor::<CpuRuntime>::from_slice(&x, &[4, 4], &device);
        // the Laplacian is masked out entirely
        assert_eq!(op.apply(&xt).unwrap().to_vec(), x);
    }

    #[test]
    fn test_identity_prox() {
        let (_, device) = setup();
        let v = Tensor::<CpuRuntime>::from_slice(&[1.0, 2.0], &[2], &device);
        let out = ProximalOperator::apply(&IdentityProx, &v, 5.0).unwrap();
        assert_eq!(out.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_sv_rejects_2d_psf() {
        let (client, device) = setup();
        let psf = Tensor::<CpuRuntime>::zeros(&[3, 3], &device);
        assert!(matches!(
            SvNormalConvolutionOperator::new(&client, &psf, None, Padding::Zero),
            Err(Error::InvalidArgument { arg: "psf", .. })
        ));
    }
}
