//! Generic fast linearized Bregman implementation

use tracing::{debug, info, warn};

use crate::algorithm::operator::LinearOperator;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, ProximalOps, ReduceOps, ScalarOps, UnaryOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::super::types::{ConvergenceReason, FlbOptions, FlbResult};

/// Number of log-residuals kept for the stagnation test.
const KICK_WINDOW: usize = 5;

/// Kick steps at or below this length fall back to a plain residual update.
const MIN_KICK: f64 = 2.0;

fn apply_shaped<R, A>(op: &A, x: &Tensor<R>, shape: &[usize]) -> Result<Tensor<R>>
where
    R: Runtime,
    A: LinearOperator<R> + ?Sized,
{
    let y = op.apply(x)?;
    if y.shape() != shape {
        return Err(Error::shape_mismatch(shape, y.shape()));
    }
    Ok(y)
}

/// Generic FLB implementation
///
/// Solves `min ||x||₁ s.t. Ax = b`. `A` maps the solution space to the
/// shape of `b` and `Aᵀ` maps back; the two spaces may differ.
///
/// Algorithm:
/// ```text
/// x = v = 0
/// for k = 1, 2, ...:
///     v = v + Aᵀb - AᵀA x
///     x_new = delta·soft_shrink(v, mu)
///     push log||A x_new - b||₁ onto a 5-entry window (initially zeros)
///     if min(window) + stuck >= max(window):        kick, costs one iteration
///         r = Aᵀb - AᵀA x_new
///         s = min over zero entries of trunc((mu·sign(r) - v) / r)
///         v = v + r               if s <= 2
///         v = v + s·[x_new == 0]·r otherwise
///         x_new = delta·soft_shrink(v, mu)
///     stop if ||A x_new - b||₁ < tol·||b||₁
///     x = x_new
/// ```
pub fn flb_impl<R, C, A, AT>(
    client: &C,
    a: &A,
    at: &AT,
    b: &Tensor<R>,
    options: FlbOptions,
) -> Result<FlbResult<R>>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + UnaryOps<R> + ReduceOps<R> + ProximalOps<R>,
    A: LinearOperator<R> + ?Sized,
    AT: LinearOperator<R> + ?Sized,
{
    options.validate()?;
    let atb = at.apply(b)?;
    let x_shape = atb.shape().to_vec();
    let mut x = atb.try_zeros_like()?;
    let mut v = atb.try_zeros_like()?;

    let normb = client.abs_sum(b)?;
    if normb == 0.0 {
        return Ok(FlbResult {
            solution: x,
            iterations: 0,
            reason: ConvergenceReason::Tolerance,
            kicks: 0,
        });
    }
    if options.max_iter == 0 {
        return Ok(FlbResult {
            solution: x,
            iterations: 0,
            reason: ConvergenceReason::MaxIterations,
            kicks: 0,
        });
    }

    // Aᵀb - AᵀA x
    let residual_grad = |x: &Tensor<R>| -> Result<Tensor<R>> {
        let ax = apply_shaped(a, x, b.shape())?;
        let atax = apply_shaped(at, &ax, &x_shape)?;
        client.sub(&atb, &atax)
    };
    let shrink = |v: &Tensor<R>| -> Result<Tensor<R>> {
        client.mul_scalar(&client.soft_shrink(v, options.mu)?, options.delta)
    };
    let residual_l1 = |x: &Tensor<R>| -> Result<f64> {
        let ax = apply_shaped(a, x, b.shape())?;
        client.abs_sum(&client.sub(&ax, b)?)
    };

    let mut window = [0.0f64; KICK_WINDOW];
    let mut kicks = 0;
    let mut k = 0;
    loop {
        k += 1;
        client.add_assign(&mut v, &residual_grad(&x)?)?;
        let mut x_new = shrink(&v)?;

        let residual = residual_l1(&x_new)?;
        if residual.is_nan() || residual == f64::INFINITY {
            warn!(iteration = k, "flb: non-finite residual, check delta and mu");
            return Ok(FlbResult {
                solution: x,
                iterations: k,
                reason: ConvergenceReason::Diverged,
                kicks,
            });
        }
        let log_residual = residual.ln();
        debug!(iteration = k, log_residual, "flb");

        window.rotate_left(1);
        window[KICK_WINDOW - 1] = log_residual;
        let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if lo + options.stuck >= hi {
            k += 1;
            kicks += 1;
            let r = residual_grad(&x_new)?;
            let steps = client.bregman_kick_steps(&v, &r, &x_new, options.mu)?;
            let s_min = client.min(&steps)?;
            if s_min <= MIN_KICK {
                client.add_assign(&mut v, &r)?;
            } else {
                let zeros = client.is_zero(&x_new)?;
                client.axpy_assign(&mut v, s_min, &client.mul(&zeros, &r)?)?;
            }
            x_new = shrink(&v)?;
            info!(iteration = k, s_min, log_residual, "flb: kick");
        }

        if residual_l1(&x_new)? < normb * options.tol {
            return Ok(FlbResult {
                solution: x_new,
                iterations: k,
                reason: ConvergenceReason::Tolerance,
                kicks,
            });
        }
        if k >= options.max_iter {
            return Ok(FlbResult {
                solution: x_new,
                iterations: k,
                reason: ConvergenceReason::MaxIterations,
                kicks,
            });
        }
        x = x_new;
    }
}
