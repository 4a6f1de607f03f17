//! Inpainting drivers
//!
//! `mask` is 1 where the image is missing and 0 where it is known.

use tracing::debug;

use crate::algorithm::iterative::{CgOptions, CgResult, cg_impl};
use crate::algorithm::operator::HarmonicInpaintOperator;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, ConvOps, ProximalOps, ReduceOps, ScalarOps, Threshold};
use crate::runtime::{Runtime, ensure_2d, ensure_compatible};
use crate::tensor::Tensor;

/// Options for [`inpaint_h1`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct H1InpaintOptions {
    /// Smoothness weight (default: 1.0)
    pub mu: f64,
    /// CG relative residual tolerance (default: 1e-4)
    pub tol: f64,
    /// CG iteration cap (default: 1000)
    pub max_iter: usize,
}

impl Default for H1InpaintOptions {
    fn default() -> Self {
        Self {
            mu: 1.0,
            tol: 1e-4,
            max_iter: 1000,
        }
    }
}

/// Options for [`inpaint_tv`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TvInpaintOptions {
    /// TV weight (default: 1e-2)
    pub mu: f64,
    /// Split Bregman penalty (default: 1e-1)
    pub gamma: f64,
    /// Relative change tolerance of the outer loop (default: 1e-4)
    pub tol: f64,
    /// Maximum number of outer iterations (default: 1000)
    pub max_iter: usize,
    /// CG iterations per u-subproblem (default: 10)
    pub inner_iter: usize,
}

impl Default for TvInpaintOptions {
    fn default() -> Self {
        Self {
            mu: 1e-2,
            gamma: 1e-1,
            tol: 1e-4,
            max_iter: 1000,
            inner_iter: 10,
        }
    }
}

fn validate_mask<R: Runtime>(img: &Tensor<R>, mask: &Tensor<R>) -> Result<()> {
    ensure_2d(img, "img")?;
    ensure_compatible(img, mask)
}

/// Harmonic (H1) inpainting.
///
/// Solves `(1 - mask)·x + mu·masked_laplacian(x) = (1 - mask)·img` by CG
/// starting from `img`.
pub fn inpaint_h1<R, C>(
    client: &C,
    img: &Tensor<R>,
    mask: &Tensor<R>,
    options: H1InpaintOptions,
) -> Result<CgResult<R>>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ReduceOps<R> + ConvOps<R>,
{
    validate_mask(img, mask)?;
    let a = HarmonicInpaintOperator::new(client, mask, options.mu)?;
    let b = client.mul(img, a.known())?;
    let cg = CgOptions {
        tol: options.tol,
        max_iter: Some(options.max_iter),
    };
    cg_impl(client, &a, &b, Some(img), cg)
}

/// Total-variation inpainting by split Bregman.
///
/// Alternates a few CG steps on
/// `((1 - mask) + gamma·masked_laplacian) u = (1 - mask)·img + gamma·masked_div(d - b)`
/// with an isotropic shrinkage of `grad u + b` by `mu·mask/gamma` and a
/// Bregman update of `b`. Stops once `||u_new - u||² / ||img||² < tol²`.
///
/// Returns the last iterate and the number of outer iterations.
pub fn inpaint_tv<R, C>(
    client: &C,
    img: &Tensor<R>,
    mask: &Tensor<R>,
    options: TvInpaintOptions,
) -> Result<(Tensor<R>, usize)>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ReduceOps<R> + ConvOps<R> + ProximalOps<R>,
{
    validate_mask(img, mask)?;
    if !(options.gamma.is_finite() && options.gamma > 0.0) {
        return Err(Error::invalid_argument(
            "gamma",
            format!("must be finite and positive, got {}", options.gamma),
        ));
    }

    let a = HarmonicInpaintOperator::new(client, mask, options.gamma)?;
    let laplacian = a.laplacian();
    let data = client.mul(a.known(), img)?;
    let threshold = client.mul_scalar(mask, options.mu / options.gamma)?;
    let img_norm = client.sum_sq(img)?;
    if img_norm == 0.0 {
        return Ok((img.try_zeros_like()?, 0));
    }
    let inner = CgOptions {
        max_iter: Some(options.inner_iter),
        ..Default::default()
    };

    let mut d1 = img.try_zeros_like()?;
    let mut d2 = img.try_zeros_like()?;
    let mut b1 = img.try_zeros_like()?;
    let mut b2 = img.try_zeros_like()?;
    let mut u = img.try_zeros_like()?;

    for k in 1..=options.max_iter {
        // u-subproblem
        let div = laplacian.masked_adjoint(&client.sub(&d1, &b1)?, &client.sub(&d2, &b2)?)?;
        let rhs = client.axpy(&data, options.gamma, &div)?;
        let u_new = cg_impl(client, &a, &rhs, Some(&u), inner)?.solution;

        // d-subproblem
        let (u1, u2) = laplacian.differences(&u_new)?;
        let (s1, s2) = (client.add(&u1, &b1)?, client.add(&u2, &b2)?);
        (d1, d2) = client.shrink2d(&s1, &s2, Threshold::Field(&threshold))?;

        // Bregman update: b += u' - d
        b1 = client.sub(&s1, &d1)?;
        b2 = client.sub(&s2, &d2)?;

        let gap = client.sum_sq(&client.sub(&u_new, &u)?)? / img_norm;
        debug!(iteration = k, gap, "inpaint_tv");
        u = u_new;
        if gap < options.tol * options.tol {
            return Ok((u, k));
        }
    }

    Ok((u, options.max_iter))
}
