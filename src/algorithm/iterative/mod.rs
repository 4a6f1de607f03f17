//! First-order iterative solvers
//!
//! # Available Solvers
//!
//! - **CG** - Conjugate Gradient for symmetric positive definite operators
//! - **FBS** - Forward-Backward Splitting (proximal gradient)
//! - **FISTA** - Nesterov-accelerated FBS with optional adaptive restart
//! - **Greedy FISTA** - FISTA with larger steps and a step-size safeguard
//! - **FLB** - Fast Linearized Bregman for l1-minimal solutions of `Ax = b`
//!
//! # Architecture
//!
//! Iterative solvers are **composite operations** that compose primitive ops:
//! - Squared norms and dot products (ReduceOps)
//! - Vector updates (BinaryOps, ScalarOps)
//! - Shrinkage and kick steps (ProximalOps)
//! - Opaque operators ([`LinearOperator`](crate::algorithm::LinearOperator),
//!   [`ProximalOperator`](crate::algorithm::ProximalOperator))
//!
//! The generic implementations in `impl_generic/` define THE algorithm,
//! ensuring identical behavior across all backends.
//!
//! # Termination
//!
//! Every result carries a [`ConvergenceReason`]. Running out of iterations
//! is not an error. A non-finite progress metric stops the loop and returns
//! the last finite iterate.

mod helpers;
mod traits;
mod types;

pub mod impl_generic;

pub use types::{
    CgOptions, CgResult, ConvergenceReason, FbsOptions, FbsResult, FistaOptions, FistaResult,
    FlbOptions, FlbResult, GreedyFistaOptions, GreedyFistaResult, Momentum,
};

pub use traits::IterativeSolvers;

pub use impl_generic::{cg_impl, fbs_impl, fista_impl, flb_impl, greedy_fista_impl};
