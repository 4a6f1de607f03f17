//! Generic Conjugate Gradient implementation
//!
//! Unpreconditioned CG (Hestenes-Stiefel) for symmetric positive definite
//! operators.

use tracing::{debug, warn};

use crate::algorithm::operator::LinearOperator;
use crate::error::Result;
use crate::ops::{ReduceOps, ScalarOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::super::helpers::{apply_linear, initial_point};
use super::super::types::{CgOptions, CgResult, ConvergenceReason};

/// Generic CG implementation
///
/// Algorithm:
/// ```text
/// x = x0, r = b - A*x, p = r, rs = <r,r>
/// for k in 0..min(max_iter, n):
///     Ap = A*p
///     alpha = rs / <p, Ap>
///     x = x + alpha*p
///     r = r - alpha*Ap
///     rs_new = <r,r>
///     if rs_new < tol²·||b||²: return
///     p = r + (rs_new/rs)*p
///     rs = rs_new
/// ```
///
/// A zero right-hand side returns zeros immediately. A non-finite step
/// returns the last finite iterate with [`ConvergenceReason::Diverged`].
pub fn cg_impl<R, C, A>(
    client: &C,
    a: &A,
    b: &Tensor<R>,
    x0: Option<&Tensor<R>>,
    options: CgOptions,
) -> Result<CgResult<R>>
where
    R: Runtime,
    C: ScalarOps<R> + ReduceOps<R>,
    A: LinearOperator<R> + ?Sized,
{
    options.validate()?;
    let mut x = initial_point(b, x0)?;
    let n = b.numel();

    let bnorm = client.sum_sq(b)?;
    if bnorm == 0.0 {
        return Ok(CgResult {
            solution: b.try_zeros_like()?,
            iterations: 0,
            residual_norm: 0.0,
            reason: ConvergenceReason::Tolerance,
        });
    }
    let threshold = bnorm * options.tol * options.tol;
    let max_iter = options.max_iter.map_or(n, |m| m.min(n));

    // r = b - A*x
    let ax = apply_linear(a, &x)?;
    let mut r = client.axpy(b, -1.0, &ax)?;
    let mut rs = client.sum_sq(&r)?;
    if rs < threshold {
        return Ok(CgResult {
            solution: x,
            iterations: 0,
            residual_norm: (rs / bnorm).sqrt(),
            reason: ConvergenceReason::Tolerance,
        });
    }
    let mut p = r.clone();

    for k in 0..max_iter {
        let ap = apply_linear(a, &p)?;
        let p_ap = client.dot(&p, &ap)?;
        let alpha = rs / p_ap;
        if !alpha.is_finite() {
            warn!(iteration = k, p_ap, "cg: non-finite step, operator may not be SPD");
            return Ok(CgResult {
                solution: x,
                iterations: k,
                residual_norm: (rs / bnorm).sqrt(),
                reason: ConvergenceReason::Diverged,
            });
        }

        client.axpy_assign(&mut x, alpha, &p)?;
        client.axpy_assign(&mut r, -alpha, &ap)?;
        let rs_new = client.sum_sq(&r)?;
        debug!(
            iteration = k + 1,
            residual = (rs_new / bnorm).sqrt(),
            "cg"
        );

        if rs_new < threshold {
            return Ok(CgResult {
                solution: x,
                iterations: k + 1,
                residual_norm: (rs_new / bnorm).sqrt(),
                reason: ConvergenceReason::Tolerance,
            });
        }

        // p = r + beta*p
        p = client.axpy(&r, rs_new / rs, &p)?;
        rs = rs_new;
    }

    Ok(CgResult {
        solution: x,
        iterations: max_iter,
        residual_norm: (rs / bnorm).sqrt(),
        reason: ConvergenceReason::MaxIterations,
    })
}
