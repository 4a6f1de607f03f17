//! Generic forward-backward splitting implementation

use tracing::{debug, warn};

use crate::algorithm::operator::{LinearOperator, ProximalOperator};
use crate::error::Result;
use crate::ops::{BinaryOps, ReduceOps, ScalarOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::super::helpers::{apply_linear, apply_prox, initial_point, relative};
use super::super::types::{ConvergenceReason, FbsOptions, FbsResult};

/// One proximal-gradient step `Prox_{θ}(x - delta·(AᵀA x - Aᵀb))`.
pub(crate) fn prox_grad_step<R, C, A, P>(
    client: &C,
    ata: &A,
    atb: &Tensor<R>,
    prox: &P,
    x: &Tensor<R>,
    delta: f64,
    theta: f64,
) -> Result<Tensor<R>>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R>,
    A: LinearOperator<R> + ?Sized,
    P: ProximalOperator<R> + ?Sized,
{
    let grad = client.sub(&apply_linear(ata, x)?, atb)?;
    let v = client.axpy(x, -delta, &grad)?;
    apply_prox(prox, &v, theta)
}

/// Generic FBS implementation
///
/// Minimizes `½||Ax - b||² + mu·R(x)` given `AᵀA` and `Aᵀb`:
/// ```text
/// for k = 1, 2, ...:
///     x_new = Prox_{delta·mu·R}(x - delta·(AᵀA x - Aᵀb))
///     stop if ||x - x_new||² < tol²·||Aᵀb||²
///     x = x_new
/// ```
pub fn fbs_impl<R, C, A, P>(
    client: &C,
    ata: &A,
    atb: &Tensor<R>,
    x0: Option<&Tensor<R>>,
    prox: &P,
    options: FbsOptions,
) -> Result<FbsResult<R>>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ReduceOps<R>,
    A: LinearOperator<R> + ?Sized,
    P: ProximalOperator<R> + ?Sized,
{
    options.validate()?;
    let mut x = initial_point(atb, x0)?;
    let bnorm = client.sum_sq(atb)?;
    let threshold = bnorm * options.tol * options.tol;
    let theta = options.delta * options.mu;

    for k in 1..=options.max_iter {
        let x_new = prox_grad_step(client, ata, atb, prox, &x, options.delta, theta)?;
        let seq_diff = client.sum_sq(&client.sub(&x, &x_new)?)?;

        if !seq_diff.is_finite() {
            warn!(iteration = k, "fbs: non-finite progress, check the step size");
            return Ok(FbsResult {
                solution: x,
                iterations: k,
                reason: ConvergenceReason::Diverged,
            });
        }
        debug!(iteration = k, seq_diff = relative(seq_diff, bnorm), "fbs");

        if seq_diff < threshold {
            return Ok(FbsResult {
                solution: x_new,
                iterations: k,
                reason: ConvergenceReason::Tolerance,
            });
        }
        x = x_new;
    }

    Ok(FbsResult {
        solution: x,
        iterations: options.max_iter,
        reason: ConvergenceReason::MaxIterations,
    })
}
