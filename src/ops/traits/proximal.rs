//! Shrinkage operators trait.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Threshold for isotropic shrinkage: one value or one per pixel.
pub enum Threshold<'a, R: Runtime> {
    /// The same threshold everywhere
    Scalar(f64),
    /// A per-pixel threshold with the operands' shape
    Field(&'a Tensor<R>),
}

impl<R: Runtime> Clone for Threshold<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Runtime> Copy for Threshold<'_, R> {}

/// Closed-form proximal maps of the l1 norm and the isotropic group norm.
pub trait ProximalOps<R: Runtime> {
    /// Soft threshold: `sign(x) · max(|x| - mu, 0)`.
    ///
    /// `soft_shrink(x, 0) == x`, and the map is non-expansive.
    fn soft_shrink(&self, x: &Tensor<R>, mu: f64) -> Result<Tensor<R>>;

    /// Isotropic shrinkage of the vector field `(ax, ay)`.
    ///
    /// With `n = sqrt(ax² + ay²)` and `m = n - mu`, each output component is
    /// `max(m, 0) · a / (n + eps)` where `eps` is the f32 machine epsilon.
    fn shrink2d(
        &self,
        ax: &Tensor<R>,
        ay: &Tensor<R>,
        threshold: Threshold<'_, R>,
    ) -> Result<(Tensor<R>, Tensor<R>)>;

    /// Kick step lengths for the linearized Bregman iteration.
    ///
    /// For entries where `x == 0` and `r != 0` the result is
    /// `trunc((mu · sign(r) - v) / r)`, the number of plain iterations
    /// before that entry of `v` would reach the threshold. All other entries
    /// (and non-finite candidates) hold the sentinel `1e7`.
    fn bregman_kick_steps(
        &self,
        v: &Tensor<R>,
        r: &Tensor<R>,
        x: &Tensor<R>,
        mu: f64,
    ) -> Result<Tensor<R>>;
}

/// Sentinel step length for entries that cannot trigger a kick.
pub(crate) const KICK_SENTINEL: f32 = 1e7;

/// Reference semantics of [`ProximalOps::bregman_kick_steps`] for one element.
#[inline]
pub(crate) fn kick_step(v: f32, r: f32, x: f32, mu: f32) -> f32 {
    if x != 0.0 || r == 0.0 {
        return KICK_SENTINEL;
    }
    let sign = if r >= 0.0 { 1.0 } else { -1.0 };
    let s = ((mu * sign - v) / r).trunc();
    if s.is_finite() { s } else { KICK_SENTINEL }
}

/// Reference semantics of [`ProximalOps::soft_shrink`] for one element.
#[inline]
pub(crate) fn soft_shrink_scalar(x: f32, mu: f32) -> f32 {
    let m = x.abs() - mu;
    if m > 0.0 {
        let sign = if x >= 0.0 { 1.0 } else { -1.0 };
        sign * m
    } else {
        0.0
    }
}

/// Reference semantics of [`ProximalOps::shrink2d`] for one element pair.
#[inline]
pub(crate) fn shrink2d_scalar(ax: f32, ay: f32, mu: f32) -> (f32, f32) {
    let norm = (ax * ax + ay * ay).sqrt();
    let m = norm - mu;
    if m > 0.0 {
        let scale = m / (norm + f32::EPSILON);
        (ax * scale, ay * scale)
    } else {
        (0.0, 0.0)
    }
}
