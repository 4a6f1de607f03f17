//! Deconvolution drivers
//!
//! All of them solve `min ½||k * x - b||² + mu·R(x)` with `Aᵀb = conv(b, psf)`
//! and `AᵀA x = conv(conv(x, kernel), psf)`, starting from the blurry image.

use crate::algorithm::iterative::{
    ConvergenceReason, FbsOptions, FistaOptions, IterativeSolvers, fbs_impl, fista_impl,
};
use crate::algorithm::operator::{
    LinearOperator, NormalConvolutionOperator, ProximalOperator, SvNormalConvolutionOperator,
    TvProx,
};
use crate::algorithm::proximal::TvOptions;
use crate::error::Result;
use crate::ops::{ConvOps, Padding, StencilOps};
use crate::runtime::{Runtime, ensure_2d};
use crate::tensor::Tensor;

/// Outer solver used by [`deconvolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeconvMethod {
    /// Forward-backward splitting
    #[default]
    Fbs,
    /// FISTA, optionally with adaptive restart
    Fista {
        /// Enable momentum restart
        restart: bool,
    },
}

/// Options for the deconvolution drivers
#[derive(Debug, Clone)]
pub struct DeconvOptions<R: Runtime> {
    /// Kernel of the forward blur; defaults to the rotated PSF
    pub kernel: Option<Tensor<R>>,
    /// Boundary handling of every convolution (default: zero)
    pub padding: Padding,
    /// Regularization weight (default: 1e-3)
    pub mu: f64,
    /// Relative tolerance on the step length (default: 1e-3)
    pub tol: f64,
    /// Step size (default: 0.9, see [`DeconvOptions::fista`])
    pub delta: f64,
    /// Maximum number of outer iterations (default: 50)
    pub max_iter: usize,
    /// Inner TV solver settings; `weight` is replaced by `delta·mu`
    pub tv: TvOptions,
}

impl<R: Runtime> Default for DeconvOptions<R> {
    fn default() -> Self {
        Self {
            kernel: None,
            padding: Padding::Zero,
            mu: 1e-3,
            tol: 1e-3,
            delta: 0.9,
            max_iter: 50,
            tv: TvOptions::default(),
        }
    }
}

impl<R: Runtime> DeconvOptions<R> {
    /// Defaults tuned for FISTA (`delta = 1.0`).
    pub fn fista() -> Self {
        Self {
            delta: 1.0,
            ..Default::default()
        }
    }
}

/// Output of a deconvolution driver
#[derive(Debug, Clone)]
pub struct DeconvResult<R: Runtime> {
    /// Deblurred image
    pub image: Tensor<R>,
    /// Outer iterations performed
    pub iterations: usize,
    /// Reason the outer solver stopped
    pub reason: ConvergenceReason,
}

/// Deconvolve with any normal operator and proximal map.
///
/// `psf` must be 2D. `options.tv` is not used; `prox` decides the regularizer.
pub fn deconvolve<R, C, P>(
    client: &C,
    blurry: &Tensor<R>,
    psf: &Tensor<R>,
    prox: &P,
    method: DeconvMethod,
    options: &DeconvOptions<R>,
) -> Result<DeconvResult<R>>
where
    R: Runtime,
    C: IterativeSolvers<R> + ConvOps<R>,
    P: ProximalOperator<R> + ?Sized,
{
    ensure_2d(blurry, "blurry")?;
    let ata = NormalConvolutionOperator::new(client, psf, options.kernel.as_ref(), options.padding)?;
    let atb = ata.rhs(blurry)?;
    solve(client, &ata, &atb, blurry, prox, method, options)
}

fn solve<R, C, A, P>(
    client: &C,
    ata: &A,
    atb: &Tensor<R>,
    x0: &Tensor<R>,
    prox: &P,
    method: DeconvMethod,
    options: &DeconvOptions<R>,
) -> Result<DeconvResult<R>>
where
    R: Runtime,
    C: IterativeSolvers<R>,
    A: LinearOperator<R> + ?Sized,
    P: ProximalOperator<R> + ?Sized,
{
    match method {
        DeconvMethod::Fbs => {
            let opts = FbsOptions {
                delta: options.delta,
                mu: options.mu,
                tol: options.tol,
                max_iter: options.max_iter,
            };
            let res = fbs_impl(client, ata, atb, Some(x0), prox, opts)?;
            Ok(DeconvResult {
                image: res.solution,
                iterations: res.iterations,
                reason: res.reason,
            })
        }
        DeconvMethod::Fista { restart } => {
            let opts = FistaOptions {
                delta: options.delta,
                mu: options.mu,
                tol: options.tol,
                restart,
                max_iter: options.max_iter,
                ..Default::default()
            };
            let res = fista_impl(client, ata, atb, Some(x0), prox, opts)?;
            Ok(DeconvResult {
                image: res.solution,
                iterations: res.iterations,
                reason: res.reason,
            })
        }
    }
}

/// FBS deconvolution with a TV prior.
pub fn deconv_fbs_tv<R, C>(
    client: &C,
    blurry: &Tensor<R>,
    psf: &Tensor<R>,
    options: &DeconvOptions<R>,
) -> Result<DeconvResult<R>>
where
    R: Runtime,
    C: IterativeSolvers<R> + ConvOps<R> + StencilOps<R>,
{
    let prox = TvProx::with_options(client, options.tv);
    deconvolve(client, blurry, psf, &prox, DeconvMethod::Fbs, options)
}

/// FISTA deconvolution with a TV prior.
pub fn deconv_fista_tv<R, C>(
    client: &C,
    blurry: &Tensor<R>,
    psf: &Tensor<R>,
    options: &DeconvOptions<R>,
) -> Result<DeconvResult<R>>
where
    R: Runtime,
    C: IterativeSolvers<R> + ConvOps<R> + StencilOps<R>,
{
    let prox = TvProx::with_options(client, options.tv);
    deconvolve(
        client,
        blurry,
        psf,
        &prox,
        DeconvMethod::Fista { restart: false },
        options,
    )
}

/// FBS deconvolution with a TV prior and a spatially-varying PSF.
///
/// `psf` (and `options.kernel` if given) have layout `[kh, kw, height, width]`.
pub fn deconv_sv_fbs_tv<R, C>(
    client: &C,
    blurry: &Tensor<R>,
    psf: &Tensor<R>,
    options: &DeconvOptions<R>,
) -> Result<DeconvResult<R>>
where
    R: Runtime,
    C: IterativeSolvers<R> + ConvOps<R> + StencilOps<R>,
{
    ensure_2d(blurry, "blurry")?;
    let ata =
        SvNormalConvolutionOperator::new(client, psf, options.kernel.as_ref(), options.padding)?;
    let atb = ata.rhs(blurry)?;
    let prox = TvProx::with_options(client, options.tv);
    solve(client, &ata, &atb, blurry, &prox, DeconvMethod::Fbs, options)
}
