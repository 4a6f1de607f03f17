//! Options and result types for the iterative solvers

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::common::{ConvergenceReason, Momentum};

fn check_positive(arg: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(
            arg,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

fn check_non_negative(arg: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(
            arg,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

// ============================================================================
// CG
// ============================================================================

/// Configuration options for the conjugate gradient solver
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CgOptions {
    /// Relative residual tolerance: stop when `||r||² < tol²·||b||²` (default: 1e-3)
    pub tol: f64,
    /// Iteration cap (default: None, meaning `numel(b)`)
    ///
    /// The cap never exceeds `numel(b)`, the exact-arithmetic bound.
    pub max_iter: Option<usize>,
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            tol: 1e-3,
            max_iter: None,
        }
    }
}

impl CgOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        check_non_negative("tol", self.tol)
    }
}

/// Result of the conjugate gradient solver
#[derive(Debug, Clone)]
pub struct CgResult<R: Runtime> {
    /// Solution x such that Ax ≈ b
    pub solution: Tensor<R>,
    /// Number of completed iterations
    pub iterations: usize,
    /// Final relative residual `||r|| / ||b||`
    pub residual_norm: f64,
    /// Reason for termination
    pub reason: ConvergenceReason,
}

// ============================================================================
// FBS
// ============================================================================

/// Configuration options for forward-backward splitting
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FbsOptions {
    /// Step size, at most the inverse Lipschitz constant of `AᵀA` (default: 0.9)
    pub delta: f64,
    /// Regularization weight (default: 1e-3)
    pub mu: f64,
    /// Relative tolerance on the step length (default: 1e-3)
    pub tol: f64,
    /// Maximum number of iterations (default: 50)
    pub max_iter: usize,
}

impl Default for FbsOptions {
    fn default() -> Self {
        Self {
            delta: 0.9,
            mu: 1e-3,
            tol: 1e-3,
            max_iter: 50,
        }
    }
}

impl FbsOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        check_positive("delta", self.delta)?;
        check_non_negative("mu", self.mu)?;
        check_non_negative("tol", self.tol)
    }
}

/// Result of forward-backward splitting
#[derive(Debug, Clone)]
pub struct FbsResult<R: Runtime> {
    /// Final iterate
    pub solution: Tensor<R>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Reason for termination
    pub reason: ConvergenceReason,
}

// ============================================================================
// FISTA
// ============================================================================

/// Configuration options for FISTA
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FistaOptions {
    /// Step size, at most the inverse Lipschitz constant of `AᵀA` (default: 1.0)
    pub delta: f64,
    /// Regularization weight (default: 1e-3)
    pub mu: f64,
    /// Relative tolerance on the step length (default: 1e-3)
    pub tol: f64,
    /// Momentum schedule (default: classical p = q = 1, r = 4)
    pub momentum: Momentum,
    /// Adaptive restart when momentum stops pointing downhill (default: false)
    pub restart: bool,
    /// Maximum number of iterations (default: 50)
    pub max_iter: usize,
}

impl Default for FistaOptions {
    fn default() -> Self {
        Self {
            delta: 1.0,
            mu: 1e-3,
            tol: 1e-3,
            momentum: Momentum::default(),
            restart: false,
            max_iter: 50,
        }
    }
}

impl FistaOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        check_positive("delta", self.delta)?;
        check_non_negative("mu", self.mu)?;
        check_non_negative("tol", self.tol)?;
        check_positive("momentum.p", self.momentum.p)?;
        check_positive("momentum.q", self.momentum.q)?;
        check_positive("momentum.r", self.momentum.r)
    }
}

/// Result of FISTA
#[derive(Debug, Clone)]
pub struct FistaResult<R: Runtime> {
    /// Final iterate
    pub solution: Tensor<R>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Reason for termination
    pub reason: ConvergenceReason,
    /// Number of momentum restarts
    pub restarts: usize,
}

// ============================================================================
// Greedy FISTA
// ============================================================================

/// Configuration options for greedy FISTA
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreedyFistaOptions {
    /// Inverse Lipschitz constant of `AᵀA` (default: 1.0)
    pub l_inv: f64,
    /// Starting step size; the step never shrinks below `delta·l_inv` (default: 1.0)
    pub delta: f64,
    /// Step shrink factor applied when the safeguard fires (default: 0.96)
    pub eta: f64,
    /// Safeguard multiplier on the first step's squared progress (default: 1.0)
    pub safeguard: f64,
    /// Regularization weight (default: 1e-3)
    pub mu: f64,
    /// Relative tolerance on the step length (default: 1e-3)
    pub tol: f64,
    /// Maximum number of iterations (default: 50)
    pub max_iter: usize,
}

impl Default for GreedyFistaOptions {
    fn default() -> Self {
        Self {
            l_inv: 1.0,
            delta: 1.0,
            eta: 0.96,
            safeguard: 1.0,
            mu: 1e-3,
            tol: 1e-3,
            max_iter: 50,
        }
    }
}

impl GreedyFistaOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        check_positive("l_inv", self.l_inv)?;
        check_positive("delta", self.delta)?;
        check_positive("eta", self.eta)?;
        check_positive("safeguard", self.safeguard)?;
        check_non_negative("mu", self.mu)?;
        check_non_negative("tol", self.tol)
    }
}

/// Result of greedy FISTA
#[derive(Debug, Clone)]
pub struct GreedyFistaResult<R: Runtime> {
    /// Final iterate
    pub solution: Tensor<R>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Reason for termination
    pub reason: ConvergenceReason,
    /// Step size after the last safeguard adjustment
    pub final_step: f64,
    /// Number of extrapolation restarts
    pub restarts: usize,
}

// ============================================================================
// FLB
// ============================================================================

/// Configuration options for fast linearized Bregman
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlbOptions {
    /// Gradient step scale (default: 5e-4)
    pub delta: f64,
    /// Shrinkage threshold (default: 2e4)
    pub mu: f64,
    /// Relative l1 residual tolerance (default: 1e-5)
    pub tol: f64,
    /// Log-residual spread below which the iteration counts as stalled (default: 1e-2)
    pub stuck: f64,
    /// Maximum number of iterations, kicks included (default: 5000)
    pub max_iter: usize,
}

impl Default for FlbOptions {
    fn default() -> Self {
        Self {
            delta: 5e-4,
            mu: 2e4,
            tol: 1e-5,
            stuck: 1e-2,
            max_iter: 5000,
        }
    }
}

impl FlbOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        check_positive("delta", self.delta)?;
        check_non_negative("mu", self.mu)?;
        check_non_negative("tol", self.tol)?;
        check_non_negative("stuck", self.stuck)
    }
}

/// Result of fast linearized Bregman
#[derive(Debug, Clone)]
pub struct FlbResult<R: Runtime> {
    /// Final iterate
    pub solution: Tensor<R>,
    /// Number of iterations performed, one extra per kick
    pub iterations: usize,
    /// Reason for termination
    pub reason: ConvergenceReason,
    /// Number of stagnation kicks
    pub kicks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(CgOptions::default().validate().is_ok());
        assert!(FbsOptions::default().validate().is_ok());
        assert!(FistaOptions::default().validate().is_ok());
        assert!(GreedyFistaOptions::default().validate().is_ok());
        assert!(FlbOptions::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_step() {
        let opts = FbsOptions {
            delta: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidArgument { arg: "delta", .. })
        ));

        let opts = FistaOptions {
            tol: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidArgument { arg: "tol", .. })
        ));
    }
}
