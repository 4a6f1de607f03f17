//! Shared helper functions for iterative solvers

use crate::algorithm::operator::{LinearOperator, ProximalOperator};
use crate::error::{Error, Result};
use crate::runtime::{Runtime, ensure_compatible};
use crate::tensor::Tensor;

/// Apply a linear operator and check that it preserved the shape.
#[inline]
pub(crate) fn apply_linear<R, A>(op: &A, x: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime,
    A: LinearOperator<R> + ?Sized,
{
    let y = op.apply(x)?;
    if y.shape() != x.shape() {
        return Err(Error::shape_mismatch(x.shape(), y.shape()));
    }
    Ok(y)
}

/// Apply a proximal operator and check that it preserved the shape.
#[inline]
pub(crate) fn apply_prox<R, P>(prox: &P, v: &Tensor<R>, theta: f64) -> Result<Tensor<R>>
where
    R: Runtime,
    P: ProximalOperator<R> + ?Sized,
{
    let y = prox.apply(v, theta)?;
    if y.shape() != v.shape() {
        return Err(Error::shape_mismatch(v.shape(), y.shape()));
    }
    Ok(y)
}

/// Starting point: a copy-on-write handle to `x0`, or zeros shaped like `like`.
pub(crate) fn initial_point<R: Runtime>(
    like: &Tensor<R>,
    x0: Option<&Tensor<R>>,
) -> Result<Tensor<R>> {
    match x0 {
        Some(x0) => {
            ensure_compatible(like, x0)?;
            Ok(x0.clone())
        }
        None => like.try_zeros_like(),
    }
}

/// Relative step length `sqrt(seq_diff / bnorm)` for progress logs.
#[inline]
pub(crate) fn relative(seq_diff: f64, bnorm: f64) -> f64 {
    if bnorm > 0.0 {
        (seq_diff / bnorm).sqrt()
    } else {
        seq_diff.sqrt()
    }
}
