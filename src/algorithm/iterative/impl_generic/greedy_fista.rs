//! Generic greedy FISTA implementation
//!
//! Larger-than-Lipschitz steps with a fixed extrapolation `y = 2x - x_old`,
//! a restart that falls back to the previous iterate, and a safeguard that
//! shrinks the step when progress grows past the first step's.

use tracing::{debug, info, warn};

use crate::algorithm::operator::{LinearOperator, ProximalOperator};
use crate::error::Result;
use crate::ops::{BinaryOps, ReduceOps, ScalarOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::super::helpers::{initial_point, relative};
use super::super::types::{ConvergenceReason, GreedyFistaOptions, GreedyFistaResult};
use super::fbs::prox_grad_step;

/// Generic greedy FISTA implementation
///
/// Algorithm:
/// ```text
/// y = x = x0, step = delta, floor = delta·l_inv
/// for k = 1, 2, ...:
///     x_old = x, y_old = y
///     x = Prox_{step·mu·R}(y_old - step·(AᵀA y_old - Aᵀb))
///     y = 2x - x_old
///     if <y_old - x, x - x_old> >= 0: y = x_old
///     d = ||x - x_old||²
///     if k == 1: safeguard = S·d
///     elif d > safeguard: step = max(eta·step, floor)
///     stop if d < tol²·||Aᵀb||²
/// ```
pub fn greedy_fista_impl<R, C, A, P>(
    client: &C,
    ata: &A,
    atb: &Tensor<R>,
    x0: Option<&Tensor<R>>,
    prox: &P,
    options: GreedyFistaOptions,
) -> Result<GreedyFistaResult<R>>
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + ReduceOps<R>,
    A: LinearOperator<R> + ?Sized,
    P: ProximalOperator<R> + ?Sized,
{
    options.validate()?;
    let mut x = initial_point(atb, x0)?;
    let mut y = x.clone();
    let floor = options.delta * options.l_inv;
    let mut step = options.delta;
    let mut safeguard = f64::INFINITY;
    let mut restarts = 0;

    let bnorm = client.sum_sq(atb)?;
    let threshold = bnorm * options.tol * options.tol;

    for k in 1..=options.max_iter {
        let x_old = std::mem::replace(
            &mut x,
            prox_grad_step(client, ata, atb, prox, &y, step, step * options.mu)?,
        );
        let diff = client.sub(&x, &x_old)?;
        let y_old = std::mem::replace(&mut y, client.axpy(&x, 1.0, &diff)?);

        let lag = client.sub(&y_old, &x)?;
        if client.dot(&lag, &diff)? >= 0.0 {
            y = x_old.clone();
            restarts += 1;
            info!(iteration = k, "greedy fista: restart");
        }

        let seq_diff = client.sum_sq(&diff)?;
        if k == 1 {
            safeguard = options.safeguard * seq_diff;
        } else if seq_diff > safeguard {
            step = (options.eta * step).max(floor);
            info!(iteration = k, step, "greedy fista: safeguard activated");
        }

        if !seq_diff.is_finite() {
            warn!(iteration = k, "greedy fista: non-finite progress, check the step size");
            return Ok(GreedyFistaResult {
                solution: x_old,
                iterations: k,
                reason: ConvergenceReason::Diverged,
                final_step: step,
                restarts,
            });
        }
        debug!(iteration = k, seq_diff = relative(seq_diff, bnorm), "greedy fista");

        if seq_diff < threshold {
            return Ok(GreedyFistaResult {
                solution: x,
                iterations: k,
                reason: ConvergenceReason::Tolerance,
                final_step: step,
                restarts,
            });
        }
    }

    Ok(GreedyFistaResult {
        solution: x,
        iterations: options.max_iter,
        reason: ConvergenceReason::MaxIterations,
        final_step: step,
        restarts,
    })
}
