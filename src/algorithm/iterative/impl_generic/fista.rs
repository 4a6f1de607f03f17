//! Generic FISTA implementation with optional adaptive restart

use tracing::{debug, info, warn};

use crate::algorithm::operator::{LinearOperator, ProximalOperator};
use crate::error::Result;
use crate::ops::{BinaryOps, ReduceOps, ScalarOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::super::helpers::{initial_point, relative};
use super::super::types::{ConvergenceReason, FistaOptions, FistaResult};
use super::fbs::prox_grad_step;

/// Generic FISTA implementation
///
/// Algorithm:
/// ```text
/// y = x_old = x0, t_old = 1
/// for k = 1, 2, ...:
///     x = Prox_{delta·mu·R}(y - delta·(AᵀA y - Aᵀb))
///     t = (p + sqrt(q + r·t_old²)) / 2
///     beta = min((t_old - 1) / t, 1)
///     y_old = y
///     y = x + beta·(x - x_old)
///     if restart and <y_old - x, x - x_old> >= 0:
///         t = 1, y = x, r = r·xi
///     stop if ||x - x_old||² < tol²·||Aᵀb||²
///     x_old = x, t_old = t
/// ```
///
/// `xi = ((4 + beta) / 5)^(1/30)` is fixed at the first restart and applied
/// at every restart, so the momentum grows more slowly after each one.
pub fn fista_impl<R, C, A, P>(
    client: &C,
    ata: &A,
    atb: &Tensor<R>,
    x0: Option<&Tensor<R>>,
    prox: &P,
    options: FistaOptions,
) -> Result<FistaResult<R>>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ReduceOps<R>,
    A: LinearOperator<R> + ?Sized,
    P: ProximalOperator<R> + ?Sized,
{
    options.validate()?;
    let mut x_old = initial_point(atb, x0)?;
    let mut y = x_old.clone();
    let mut t_old = 1.0;
    let mut momentum = options.momentum;
    let mut xi: Option<f64> = None;
    let mut restarts = 0;

    let bnorm = client.sum_sq(atb)?;
    let threshold = bnorm * options.tol * options.tol;
    let theta = options.delta * options.mu;

    for k in 1..=options.max_iter {
        let x = prox_grad_step(client, ata, atb, prox, &y, options.delta, theta)?;
        let mut t = momentum.next(t_old);
        let beta = ((t_old - 1.0) / t).min(1.0);

        let step = client.sub(&x, &x_old)?;
        let y_old = std::mem::replace(&mut y, client.axpy(&x, beta, &step)?);
        let seq_diff = client.sum_sq(&step)?;

        if options.restart {
            let lag = client.sub(&y_old, &x)?;
            if client.dot(&lag, &step)? >= 0.0 {
                t = 1.0;
                y = x.clone();
                let decay = *xi.get_or_insert(((4.0 + beta) / 5.0).powf(1.0 / 30.0));
                momentum.r *= decay;
                restarts += 1;
                info!(iteration = k, r = momentum.r, "fista: momentum restart");
            }
        }

        if !seq_diff.is_finite() {
            warn!(iteration = k, "fista: non-finite progress, check the step size");
            return Ok(FistaResult {
                solution: x_old,
                iterations: k,
                reason: ConvergenceReason::Diverged,
                restarts,
            });
        }
        debug!(iteration = k, seq_diff = relative(seq_diff, bnorm), "fista");

        if seq_diff < threshold {
            return Ok(FistaResult {
                solution: x,
                iterations: k,
                reason: ConvergenceReason::Tolerance,
                restarts,
            });
        }
        x_old = x;
        t_old = t;
    }

    Ok(FistaResult {
        solution: x_old,
        iterations: options.max_iter,
        reason: ConvergenceReason::MaxIterations,
        restarts,
    })
}
