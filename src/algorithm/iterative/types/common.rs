//! Common types: termination reasons and momentum parameters

/// Reason why an iterative solver terminated
///
/// Reaching the iteration cap is a normal return path, not an error. Callers
/// that need a converged answer check [`ConvergenceReason::is_converged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceReason {
    /// The relative progress metric fell below the tolerance
    Tolerance,

    /// The iteration cap was reached first
    ///
    /// **Hint**: Increase `max_iter`, loosen `tol`, or check the step size
    /// against the Lipschitz constant of the operator.
    MaxIterations,

    /// The progress metric became NaN or infinite
    ///
    /// The returned solution is the last finite iterate.
    ///
    /// **Hint**: The step size is probably too large for the operator, or
    /// the operator is not positive definite.
    Diverged,
}

impl ConvergenceReason {
    /// Returns true if the tolerance test was met
    #[inline]
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceReason::Tolerance)
    }

    /// Returns a human-readable hint for non-converged cases
    pub fn hint(&self) -> &'static str {
        match self {
            ConvergenceReason::Tolerance => "Converged successfully",
            ConvergenceReason::MaxIterations => {
                "Increase max_iter, loosen tol, or check the step size"
            }
            ConvergenceReason::Diverged => {
                "Progress became non-finite. Reduce the step size or check the operator"
            }
        }
    }
}

/// Momentum schedule `t' = (p + sqrt(q + r·t²)) / 2` used by FISTA
///
/// The classical schedule is `p = q = 1`, `r = 4`. Admissible values are
/// `0 < p <= 1`, `0 < q <= 1`, `0 < r <= 4`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Momentum {
    /// Offset (default: 1)
    pub p: f64,
    /// Constant under the root (default: 1)
    pub q: f64,
    /// Growth factor under the root (default: 4)
    pub r: f64,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            p: 1.0,
            q: 1.0,
            r: 4.0,
        }
    }
}

impl Momentum {
    /// Next momentum scalar given the current one
    #[inline]
    pub fn next(&self, t: f64) -> f64 {
        (self.p + (self.q + self.r * t * t).sqrt()) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_converged() {
        assert!(ConvergenceReason::Tolerance.is_converged());
        assert!(!ConvergenceReason::MaxIterations.is_converged());
        assert!(!ConvergenceReason::Diverged.is_converged());
    }

    #[test]
    fn test_classical_momentum() {
        let m = Momentum::default();
        // t1 = (1 + sqrt(5)) / 2
        assert!((m.next(1.0) - 1.618_033_988_749_895).abs() < 1e-12);
    }
}
